//! Execution core of an embedded SQL virtual machine.
//!
//! Tables, rows, and auto-increment sequences are materialised as packed
//! byte layouts inside 32-byte storage slots addressed by deterministic
//! Keccak-256 hashes, in the per-account key/value space of a blockchain
//! state database. This crate provides the row I/O core of that machine:
//! slot addressing, the scalar type codec, schema layout, operand
//! materialisation (`LOAD` and the shape ops around it), and the insertion
//! helpers for defaults and auto-increment sequences.
//!
//! The SQL front end (parser, planner) and the surrounding contract harness
//! (gas metering, call frames, arithmetic opcodes) are external
//! collaborators; the only host interface consumed here is the per-account
//! slot backend, [`storage::AccountState`].

pub mod errors;
pub mod runtime;
pub mod schema;
pub mod storage;
pub mod types;
