//! Register file holding operands between instructions.

use crate::errors::VmError;
use crate::runtime::operand::Operand;

/// Fixed-size register file owned by the instruction dispatcher.
///
/// Registers start empty and hold one operand each. Overwriting a register
/// releases the previous operand; reading an empty register is an error
/// rather than a zero value, since no operand shape is a sensible default.
pub struct RegisterFile {
    regs: Vec<Option<Operand>>,
}

impl RegisterFile {
    /// Creates a register file with `count` empty registers.
    pub fn new(count: usize) -> Self {
        Self {
            regs: vec![None; count],
        }
    }

    pub fn len(&self) -> usize {
        self.regs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    /// Returns the operand in register `idx`.
    pub fn get(&self, idx: u8) -> Result<&Operand, VmError> {
        self.regs
            .get(idx as usize)
            .ok_or(VmError::InvalidRegisterIndex {
                index: idx,
                available: self.regs.len(),
            })?
            .as_ref()
            .ok_or(VmError::EmptyRegister(idx))
    }

    /// Stores an operand into register `idx`, releasing any previous one.
    pub fn set(&mut self, idx: u8, operand: Operand) -> Result<(), VmError> {
        let available = self.regs.len();
        let slot = self
            .regs
            .get_mut(idx as usize)
            .ok_or(VmError::InvalidRegisterIndex {
                index: idx,
                available,
            })?;
        *slot = Some(operand);
        Ok(())
    }
}
