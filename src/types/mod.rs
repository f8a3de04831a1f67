//! Core type definitions for the SQL VM.
//!
//! This module provides the fundamental types used throughout the crate:
//! - `Hash`: fixed-size 32-byte Keccak-256 digests used as slot keys
//! - `Address`: 20-byte account addresses scoping slot key spaces
//! - `DataType`: the closed scalar type system with its byte-run codec
//! - `Value`: a single typed cell (numeric decimal or byte payload)
//!
//! All types are optimized for the loader's access patterns: keys and
//! addresses are `Copy`, cells own their payloads.

pub mod address;
pub mod data_type;
pub mod hash;
pub mod value;

pub use address::{ADDRESS_LEN, Address};
pub use data_type::{DataType, MAX_DECIMAL_SCALE, MAX_WIDTH};
pub use hash::{HASH_LEN, Hash, HashBuilder};
pub use value::Value;
