//! Cell values flowing between slot storage and operands.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// A single typed cell inside an operand tuple.
///
/// Numeric kinds (integers, booleans, fixed-point decimals) are carried as an
/// arbitrary-precision decimal; byte kinds (addresses, fixed and dynamic byte
/// arrays) as an owned payload. The matching [`DataType`](crate::types::DataType)
/// in the operand metadata decides which variant a well-formed cell uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Numeric value with an explicit scale.
    Number(BigDecimal),
    /// Raw byte payload.
    Bytes(Vec<u8>),
}

impl Value {
    /// Numeric cell from any integer-like source.
    pub fn number(value: impl Into<BigDecimal>) -> Value {
        Value::Number(value.into())
    }

    /// Byte cell from any byte-like source.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Value {
        Value::Bytes(value.into())
    }

    /// Numeric cell for a boolean: `0` for false, `1` for true.
    pub fn boolean(value: bool) -> Value {
        Value::Number(BigDecimal::from(u8::from(value)))
    }

    /// Returns the numeric payload, or `None` for byte cells.
    pub fn as_number(&self) -> Option<&BigDecimal> {
        match self {
            Value::Number(d) => Some(d),
            Value::Bytes(_) => None,
        }
    }

    /// Returns the byte payload, or `None` for numeric cells.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Number(_) => None,
            Value::Bytes(b) => Some(b),
        }
    }

    /// Converts an exact non-negative integer cell to `u64`.
    ///
    /// Returns `None` for byte cells, fractional values, negatives, and
    /// values above `u64::MAX`. Used to read row ids and references out of
    /// operands without truncation.
    pub fn to_u64(&self) -> Option<u64> {
        self.as_number().and_then(to_integer)?.to_u64()
    }

    /// Converts an exact integer cell to `u8`, with the same exactness rules
    /// as [`Value::to_u64`].
    pub fn to_u8(&self) -> Option<u8> {
        self.as_number().and_then(to_integer)?.to_u8()
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(BigDecimal::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(BigDecimal::from(value))
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Number(BigDecimal::from(value))
    }
}

/// Largest base-ten shift the integer helpers expand; 10^77 already exceeds
/// every 256-bit value this crate can store.
pub(crate) const MAX_BASE_TEN_SHIFT: u32 = 100;

/// Extracts the exact integer behind a decimal, or `None` if the value has a
/// fractional part after normalization or sits far outside the storable
/// range.
pub(crate) fn to_integer(value: &BigDecimal) -> Option<BigInt> {
    let (digits, exponent) = value.normalized().as_bigint_and_exponent();
    if exponent > 0 {
        return None;
    }
    let shift = u32::try_from(-exponent).ok()?;
    if shift > MAX_BASE_TEN_SHIFT {
        return None;
    }
    Some(digits * BigInt::from(10u8).pow(shift))
}
