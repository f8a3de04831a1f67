//! Slot storage subsystem.
//!
//! This module provides the two layers between the VM and the host chain's
//! state database:
//!
//! - [`state`]: the raw per-account slot backend ([`AccountState`](state::AccountState))
//!   plus an in-memory implementation for tests and standalone runs
//! - [`slots`]: the schema-aware [`Storage`](slots::Storage) view that owns
//!   path hashing, key shifting, and multi-slot dynamic-bytes I/O
//!
//! Slot contents are the only durable state the VM touches.

pub mod slots;
pub mod state;

pub use slots::Storage;
pub use state::{AccountState, MemStateDb, SLOT_LEN, SlotValue, ZERO_SLOT};
