//! Deterministic slot addressing and multi-slot payload I/O.
//!
//! [`Storage`] binds the frozen schema to the host's slot backend and owns
//! every key derivation the VM performs. All keys are Keccak-256 digests
//! over domain-separated preimages; the layouts below are an interface
//! contract and must stay stable for stored data to remain addressable.
//!
//! - row path: `keccak256("sqlvm/row" || table_ref || row_id_be8)`
//! - sequence path: `keccak256("sqlvm/seq" || table_ref || seq_idx)`
//! - dynamic-bytes payload path: `keccak256(descriptor_slot_key)`
//!
//! `table_ref` and `seq_idx` are single bytes; `row_id_be8` is the row id as
//! eight big-endian bytes.

use crate::errors::VmError;
use crate::schema::{Schema, SequenceRef, TableRef};
use crate::storage::state::{AccountState, SLOT_LEN, SlotValue, ZERO_SLOT};
use crate::types::{Address, Hash};
use primitive_types::U256;
use tracing::{debug, trace};

/// Domain tag for row data keys.
const ROW_PATH_TAG: &[u8] = b"sqlvm/row";
/// Domain tag for auto-increment sequence keys.
const SEQ_PATH_TAG: &[u8] = b"sqlvm/seq";

/// Payload bytes an inline (short-form) dynamic-bytes descriptor can carry.
pub const MAX_INLINE_BYTES: usize = SLOT_LEN - 1;

/// Schema-aware view over the host's slot backend.
///
/// Owned by one VM invocation; the schema is frozen before the first read.
pub struct Storage<'a> {
    state: &'a mut dyn AccountState,
    pub schema: Schema,
}

impl<'a> Storage<'a> {
    pub fn new(state: &'a mut dyn AccountState, schema: Schema) -> Self {
        Self { state, schema }
    }

    /// Reads the slot at `key`; unset slots read as zero.
    pub fn get_state(&self, address: Address, key: Hash) -> SlotValue {
        self.state.get_state(address, key)
    }

    /// Stores a slot value.
    pub fn set_state(&mut self, address: Address, key: Hash, value: SlotValue) {
        self.state.set_state(address, key, value);
    }

    /// Key anchoring the packed columns of row `row_id` in `table`.
    pub fn row_path_hash(&self, table: TableRef, row_id: u64) -> Hash {
        Hash::keccak()
            .chain(ROW_PATH_TAG)
            .chain(&[table])
            .chain(&row_id.to_be_bytes())
            .finalize()
    }

    /// Key of the persistent counter for sequence `sequence` in `table`.
    pub fn sequence_path_hash(&self, table: TableRef, sequence: SequenceRef) -> Hash {
        Hash::keccak()
            .chain(SEQ_PATH_TAG)
            .chain(&[table])
            .chain(&[sequence])
            .finalize()
    }

    /// Key of the first payload slot behind a dynamic-bytes descriptor.
    pub fn payload_path_hash(head: Hash) -> Hash {
        Hash::keccak().chain(head.as_slice()).finalize()
    }

    /// Returns the key `n` slots after `key`: the key interpreted as a
    /// big-endian unsigned 256-bit integer, plus `n`, with wrap-around.
    pub fn shift_key(key: Hash, n: u64) -> Hash {
        let (shifted, _) = U256::from_big_endian(key.as_slice()).overflowing_add(U256::from(n));
        let mut out = [0u8; SLOT_LEN];
        shifted.to_big_endian(&mut out);
        Hash(out)
    }

    /// Materialises the dynamic-bytes payload behind the descriptor at
    /// `head`.
    ///
    /// The low bit of the descriptor's last byte selects the form: clear
    /// means the payload sits inline (`length = last_byte >> 1`, at most
    /// [`MAX_INLINE_BYTES`]); set means the whole descriptor, shifted right
    /// once, is the payload length and the payload occupies consecutive
    /// slots starting at [`Storage::payload_path_hash`]. A descriptor
    /// violating either shape fails `InvalidDataType`.
    pub fn read_dynamic_bytes(&self, address: Address, head: Hash) -> Result<Vec<u8>, VmError> {
        let descriptor = self.get_state(address, head);
        let marker = descriptor[SLOT_LEN - 1];
        if marker & 1 == 0 {
            let length = (marker >> 1) as usize;
            if length > MAX_INLINE_BYTES {
                return Err(VmError::invalid_data_type(format!(
                    "inline dynamic bytes length {length} exceeds {MAX_INLINE_BYTES}"
                )));
            }
            return Ok(descriptor[..length].to_vec());
        }

        let length = U256::from_big_endian(&descriptor) >> 1usize;
        if length > U256::from(usize::MAX as u64) {
            return Err(VmError::invalid_data_type(
                "dynamic bytes descriptor length exceeds the platform word",
            ));
        }
        let length = length.as_u64() as usize;
        debug!(slot = %head, length, "reading long-form dynamic bytes");

        let base = Self::payload_path_hash(head);
        let mut out = Vec::with_capacity(length.div_ceil(SLOT_LEN) * SLOT_LEN);
        for i in 0..length.div_ceil(SLOT_LEN) {
            let slot = self.get_state(address, Self::shift_key(base, i as u64));
            out.extend_from_slice(&slot);
        }
        out.truncate(length);
        Ok(out)
    }

    /// Stores a dynamic-bytes payload behind the descriptor at `head`,
    /// choosing the inline or multi-slot form from the length.
    pub fn write_dynamic_bytes(
        &mut self,
        address: Address,
        head: Hash,
        bytes: &[u8],
    ) -> Result<(), VmError> {
        trace!(slot = %head, length = bytes.len(), "writing dynamic bytes");
        if bytes.len() <= MAX_INLINE_BYTES {
            let mut descriptor = ZERO_SLOT;
            descriptor[..bytes.len()].copy_from_slice(bytes);
            descriptor[SLOT_LEN - 1] = (bytes.len() as u8) << 1;
            self.set_state(address, head, descriptor);
            return Ok(());
        }

        let encoded = (U256::from(bytes.len() as u64) << 1usize) | U256::one();
        let mut descriptor = ZERO_SLOT;
        encoded.to_big_endian(&mut descriptor);
        self.set_state(address, head, descriptor);

        let base = Self::payload_path_hash(head);
        for (i, chunk) in bytes.chunks(SLOT_LEN).enumerate() {
            let mut slot = ZERO_SLOT;
            slot[..chunk.len()].copy_from_slice(chunk);
            self.set_state(address, Self::shift_key(base, i as u64), slot);
        }
        Ok(())
    }
}
