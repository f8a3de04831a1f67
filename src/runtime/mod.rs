//! Instruction execution core.
//!
//! This module provides the register-based execution surface of the SQL VM:
//!
//! - [`operand`]: the rectangular typed values instructions exchange
//! - [`registers`]: the register file owned by the dispatcher
//! - [`codec`]: cell-level translation between operands and slot windows
//! - [`instructions`]: opcodes, the dispatcher, row loading, and the
//!   insertion helpers (fill-default, fill-auto-increment)
//!
//! # Execution model
//!
//! Single-threaded and cooperative: each instruction runs to completion on
//! the calling thread, reading resolved input operands and writing exactly
//! one output register. On error the dispatcher leaves the target register
//! in its pre-call state and surfaces the error kind to the host.

pub mod codec;
pub mod instructions;
pub mod operand;
pub mod registers;

pub use instructions::{Instruction, OpCode, execute};
pub use operand::{InputOperand, Operand, Tuple};
pub use registers::RegisterFile;

use crate::storage::Storage;
use crate::types::Address;

/// Per-invocation execution context threaded through every instruction.
///
/// Bundles the schema-aware storage view with the account whose slot space
/// the invocation reads and writes.
pub struct Context<'a> {
    pub storage: Storage<'a>,
    pub address: Address,
}

impl<'a> Context<'a> {
    pub fn new(storage: Storage<'a>, address: Address) -> Self {
        Self { storage, address }
    }
}

#[cfg(test)]
mod tests;
