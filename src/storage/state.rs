//! Slot backend interface and the in-memory implementation.
//!
//! The VM consumes a content-addressed mapping from `(account, 32-byte key)`
//! to 32-byte values. Missing keys read as all-zero slots, so reads are
//! total; the only write ordering guarantee is last-writer-wins per key
//! within one VM invocation.

use crate::types::{Address, Hash};
use std::collections::BTreeMap;

/// Width of one storage slot in bytes.
pub const SLOT_LEN: usize = 32;

/// Contents of one storage slot.
pub type SlotValue = [u8; SLOT_LEN];

/// The value every unset slot reads as.
pub const ZERO_SLOT: SlotValue = [0u8; SLOT_LEN];

/// Per-account slot storage consumed by the VM.
///
/// Implementations sit in front of the host chain's state database. The VM
/// accesses them synchronously from a single thread; a multi-threaded host
/// must serialise access per account.
pub trait AccountState {
    /// Reads the slot at `key` in `address`'s key space; unset slots read as
    /// [`ZERO_SLOT`].
    fn get_state(&self, address: Address, key: Hash) -> SlotValue;

    /// Stores a slot value, overwriting any existing value.
    fn set_state(&mut self, address: Address, key: Hash, value: SlotValue);
}

/// In-memory slot storage backing the test suites and standalone runs.
#[derive(Debug, Default)]
pub struct MemStateDb {
    slots: BTreeMap<(Address, Hash), SlotValue>,
}

impl MemStateDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of explicitly written slots, across all accounts.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl AccountState for MemStateDb {
    fn get_state(&self, address: Address, key: Hash) -> SlotValue {
        self.slots.get(&(address, key)).copied().unwrap_or(ZERO_SLOT)
    }

    fn set_state(&mut self, address: Address, key: Hash, value: SlotValue) {
        self.slots.insert((address, key), value);
    }
}
