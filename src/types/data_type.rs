//! Scalar type system: in-slot widths, bounds, and the byte-run codec.
//!
//! Every column carries one [`DataType`]. The variant decides the on-slot
//! footprint ([`DataType::size`]), the numeric domain ([`DataType::min_max`]),
//! and how a cell converts to and from the big-endian byte run stored inside
//! a slot. Dynamic byte arrays are the one exception: their slot holds a
//! descriptor and the multi-slot payload is materialised by the storage
//! codec, so the value-level `encode`/`decode` here reject them.

use crate::errors::VmError;
use crate::types::address::ADDRESS_LEN;
use crate::types::value::{Value, to_integer};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};
use std::fmt;

/// Widest fixed scalar, in bytes; equals the slot width.
pub const MAX_WIDTH: u8 = 32;

/// Largest fixed-point scale: 10^76 is the last power of ten below 2^256.
pub const MAX_DECIMAL_SCALE: u8 = 76;

/// Closed set of scalar categories a column can hold.
///
/// Widths are byte counts. Integers are stored big-endian, right-aligned and
/// sign-extended within their window; fixed-point decimals store the
/// two's-complement mantissa `value * 10^scale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// Signed integer of `1..=32` bytes.
    Int(u8),
    /// Unsigned integer of `1..=32` bytes.
    Uint(u8),
    /// Single-byte boolean; any non-zero stored byte reads as true.
    Bool,
    /// 20-byte account address.
    Address,
    /// Fixed byte array of `1..=32` bytes, stored verbatim.
    FixedBytes(u8),
    /// Variable-length byte array behind a one-slot descriptor.
    DynamicBytes,
    /// Signed fixed-point decimal: `width`-byte mantissa, `scale` fractional
    /// digits.
    Decimal { width: u8, scale: u8 },
}

impl DataType {
    /// Validates width and scale bounds.
    pub fn validate(&self) -> Result<(), VmError> {
        match *self {
            DataType::Int(w) | DataType::Uint(w) | DataType::FixedBytes(w) => {
                if w == 0 || w > MAX_WIDTH {
                    return Err(VmError::invalid_data_type(format!(
                        "{self} width must be in 1..={MAX_WIDTH}"
                    )));
                }
            }
            DataType::Decimal { width, scale } => {
                if width == 0 || width > MAX_WIDTH {
                    return Err(VmError::invalid_data_type(format!(
                        "{self} width must be in 1..={MAX_WIDTH}"
                    )));
                }
                if scale == 0 || scale > MAX_DECIMAL_SCALE {
                    return Err(VmError::invalid_data_type(format!(
                        "{self} scale must be in 1..={MAX_DECIMAL_SCALE}"
                    )));
                }
            }
            DataType::Bool | DataType::Address | DataType::DynamicBytes => {}
        }
        Ok(())
    }

    /// On-slot footprint in bytes.
    ///
    /// For [`DataType::DynamicBytes`] this is the descriptor slot, not the
    /// payload length.
    pub fn size(&self) -> usize {
        match *self {
            DataType::Int(w) | DataType::Uint(w) | DataType::FixedBytes(w) => w as usize,
            DataType::Bool => 1,
            DataType::Address => ADDRESS_LEN,
            DataType::DynamicBytes => 32,
            DataType::Decimal { width, .. } => width as usize,
        }
    }

    /// Inclusive numeric bounds for integer and fixed-point kinds, `None`
    /// otherwise.
    pub fn min_max(&self) -> Option<(BigDecimal, BigDecimal)> {
        match *self {
            DataType::Int(w) => {
                let (lo, hi) = int_bounds(w as usize, true);
                Some((BigDecimal::from(lo), BigDecimal::from(hi)))
            }
            DataType::Uint(w) => {
                let (lo, hi) = int_bounds(w as usize, false);
                Some((BigDecimal::from(lo), BigDecimal::from(hi)))
            }
            DataType::Decimal { width, scale } => {
                let (lo, hi) = int_bounds(width as usize, true);
                Some((
                    BigDecimal::new(lo, scale as i64),
                    BigDecimal::new(hi, scale as i64),
                ))
            }
            _ => None,
        }
    }

    /// Encodes a cell into a byte run of exactly [`DataType::size`] bytes.
    ///
    /// Fails `InvalidDataType` when the payload kind does not match the type,
    /// the value is out of range, or a numeric value carries fractional
    /// digits the type cannot represent. Integer kinds reject any non-zero
    /// normalized scale rather than truncating.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, VmError> {
        match *self {
            DataType::Int(w) => encode_twos_complement(&self.exact_integer(value)?, w as usize, true),
            DataType::Uint(w) => {
                encode_twos_complement(&self.exact_integer(value)?, w as usize, false)
            }
            DataType::Bool => {
                let n = self.exact_integer(value)?;
                if n.is_zero() {
                    Ok(vec![0])
                } else if n.is_one() {
                    Ok(vec![1])
                } else {
                    Err(VmError::invalid_data_type(format!(
                        "bool accepts only 0 or 1, got {n}"
                    )))
                }
            }
            DataType::Address => self.exact_bytes(value, ADDRESS_LEN),
            DataType::FixedBytes(n) => self.exact_bytes(value, n as usize),
            DataType::DynamicBytes => Err(VmError::invalid_data_type(
                "dynamic bytes are encoded through the storage codec",
            )),
            DataType::Decimal { width, scale } => {
                let mantissa = self.scaled_mantissa(value, scale)?;
                encode_twos_complement(&mantissa, width as usize, true)
            }
        }
    }

    /// Decodes a byte run of exactly [`DataType::size`] bytes into a cell.
    ///
    /// Integer kinds produce scale-zero decimals; `Decimal` produces a value
    /// with exactly its declared scale.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, VmError> {
        if *self != DataType::DynamicBytes && bytes.len() != self.size() {
            return Err(VmError::invalid_data_type(format!(
                "{self} expects a {}-byte window, got {}",
                self.size(),
                bytes.len()
            )));
        }
        match *self {
            DataType::Int(_) => Ok(Value::from(decode_twos_complement(bytes, true))),
            DataType::Uint(_) => Ok(Value::from(decode_twos_complement(bytes, false))),
            DataType::Bool => Ok(Value::boolean(bytes.iter().any(|&b| b != 0))),
            DataType::Address | DataType::FixedBytes(_) => Ok(Value::bytes(bytes)),
            DataType::DynamicBytes => Err(VmError::invalid_data_type(
                "dynamic bytes are decoded through the storage codec",
            )),
            DataType::Decimal { scale, .. } => {
                let mantissa = decode_twos_complement(bytes, true);
                Ok(Value::Number(BigDecimal::new(mantissa, scale as i64)))
            }
        }
    }

    /// Extracts an exact scale-zero integer from a numeric cell.
    fn exact_integer(&self, value: &Value) -> Result<BigInt, VmError> {
        let number = value.as_number().ok_or_else(|| {
            VmError::invalid_data_type(format!("{self} expects a numeric cell"))
        })?;
        to_integer(number).ok_or_else(|| {
            VmError::invalid_data_type(format!(
                "{self} cannot represent non-integer value {number}"
            ))
        })
    }

    /// Extracts a byte payload of exactly `len` bytes.
    fn exact_bytes(&self, value: &Value, len: usize) -> Result<Vec<u8>, VmError> {
        let bytes = value
            .as_bytes()
            .ok_or_else(|| VmError::invalid_data_type(format!("{self} expects a byte cell")))?;
        if bytes.len() != len {
            return Err(VmError::invalid_data_type(format!(
                "{self} expects {len} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(bytes.to_vec())
    }

    /// Computes the integer mantissa `value * 10^scale`, rejecting values
    /// with more than `scale` fractional digits.
    fn scaled_mantissa(&self, value: &Value, scale: u8) -> Result<BigInt, VmError> {
        let number = value.as_number().ok_or_else(|| {
            VmError::invalid_data_type(format!("{self} expects a numeric cell"))
        })?;
        let (digits, exponent) = number.normalized().as_bigint_and_exponent();
        if exponent > scale as i64 {
            return Err(VmError::invalid_data_type(format!(
                "{self} cannot represent {number} without truncation"
            )));
        }
        let shift = scale as i64 - exponent;
        let shift = u32::try_from(shift)
            .ok()
            .filter(|&s| s <= crate::types::value::MAX_BASE_TEN_SHIFT)
            .ok_or_else(|| {
                VmError::invalid_data_type(format!("{self} cannot represent {number}"))
            })?;
        Ok(digits * BigInt::from(10u8).pow(shift))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DataType::Int(w) => write!(f, "int({w})"),
            DataType::Uint(w) => write!(f, "uint({w})"),
            DataType::Bool => write!(f, "bool"),
            DataType::Address => write!(f, "address"),
            DataType::FixedBytes(n) => write!(f, "bytes({n})"),
            DataType::DynamicBytes => write!(f, "dynamic bytes"),
            DataType::Decimal { width, scale } => write!(f, "decimal({width},{scale})"),
        }
    }
}

/// Inclusive integer bounds for a `width`-byte value.
fn int_bounds(width: usize, signed: bool) -> (BigInt, BigInt) {
    if signed {
        let half = BigInt::one() << (8 * width - 1);
        (-half.clone(), half - 1)
    } else {
        (BigInt::zero(), (BigInt::one() << (8 * width)) - 1)
    }
}

/// Encodes a bounds-checked integer as big-endian two's complement.
fn encode_twos_complement(value: &BigInt, width: usize, signed: bool) -> Result<Vec<u8>, VmError> {
    let (lo, hi) = int_bounds(width, signed);
    if *value < lo || *value > hi {
        return Err(VmError::invalid_data_type(format!(
            "value {value} out of range [{lo}, {hi}]"
        )));
    }
    let modulus = BigInt::one() << (8 * width);
    let wrapped = ((value % &modulus) + &modulus) % &modulus;
    let (_, magnitude) = wrapped.to_bytes_be();
    let mut out = vec![0u8; width];
    out[width - magnitude.len()..].copy_from_slice(&magnitude);
    Ok(out)
}

/// Decodes a big-endian byte run as two's complement (`signed`) or an
/// unsigned integer.
fn decode_twos_complement(bytes: &[u8], signed: bool) -> BigInt {
    let mut value = BigInt::from_bytes_be(Sign::Plus, bytes);
    if signed && bytes.first().is_some_and(|b| b & 0x80 != 0) {
        value -= BigInt::one() << (8 * bytes.len());
    }
    value
}
