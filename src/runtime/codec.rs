//! Cell-level translation between operands and slot bytes.
//!
//! The loader and the insertion path go through these functions rather than
//! touching slots directly: fixed scalars live in a byte window inside their
//! column's slot, while dynamic byte arrays indirect through the descriptor
//! handled by [`Storage`].

use crate::errors::VmError;
use crate::schema::Column;
use crate::storage::Storage;
use crate::types::{Address, DataType, Hash, Value};

/// Decodes one cell from its slot window.
///
/// For fixed scalars `window` must span exactly `dtype.size()` bytes of the
/// column's slot. For dynamic bytes the window is ignored and the payload is
/// materialised from the descriptor at `slot_key`.
pub fn decode_window(
    storage: &Storage<'_>,
    address: Address,
    dtype: DataType,
    slot_key: Hash,
    window: &[u8],
) -> Result<Value, VmError> {
    match dtype {
        DataType::DynamicBytes => storage
            .read_dynamic_bytes(address, slot_key)
            .map(Value::Bytes),
        _ => dtype.decode(window),
    }
}

/// Reads the cell of `column` from the row anchored at `head`.
pub fn read_column(
    storage: &Storage<'_>,
    address: Address,
    head: Hash,
    column: &Column,
) -> Result<Value, VmError> {
    let slot_key = Storage::shift_key(head, u64::from(column.slot_shift()));
    let slot = storage.get_state(address, slot_key);
    let start = column.byte_shift() as usize;
    let window = &slot[start..start + column.dtype.size()];
    decode_window(storage, address, column.dtype, slot_key, window)
}

/// Writes the cell of `column` into the row anchored at `head`.
///
/// Fixed scalars are patched into their window, preserving the rest of the
/// slot; dynamic bytes rewrite the descriptor and payload slots.
pub fn write_column(
    storage: &mut Storage<'_>,
    address: Address,
    head: Hash,
    column: &Column,
    value: &Value,
) -> Result<(), VmError> {
    let slot_key = Storage::shift_key(head, u64::from(column.slot_shift()));
    match column.dtype {
        DataType::DynamicBytes => {
            let bytes = value.as_bytes().ok_or_else(|| {
                VmError::invalid_data_type("dynamic bytes expects a byte cell")
            })?;
            storage.write_dynamic_bytes(address, slot_key, bytes)
        }
        _ => {
            let encoded = column.dtype.encode(value)?;
            let mut slot = storage.get_state(address, slot_key);
            let start = column.byte_shift() as usize;
            slot[start..start + encoded.len()].copy_from_slice(&encoded);
            storage.set_state(address, slot_key, slot);
            Ok(())
        }
    }
}
