//! Opcodes, the instruction dispatcher, and the insertion helpers.
//!
//! Instructions read resolved input operands and produce exactly one output
//! operand, written to the target register only when the op succeeds; a
//! failing instruction leaves the register file untouched. Arithmetic and
//! comparison opcodes live in the surrounding VM, not here - this module
//! covers row materialisation and the operand-shape ops around it.

use crate::errors::VmError;
use crate::runtime::Context;
use crate::runtime::codec;
use crate::runtime::operand::{InputOperand, Operand};
use crate::runtime::registers::RegisterFile;
use crate::schema::{ColumnRef, TableRef};
use crate::storage::state::{SLOT_LEN, ZERO_SLOT};
use crate::types::Value;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use tracing::debug;

/// Opcodes of the row I/O core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpCode {
    /// Materialise rows: `inputs = [table, ids, fields]`.
    Load,
    /// Project columns: `inputs = [src, fields]`.
    Field,
    /// Slice rows: `inputs = [src, offset, count]`.
    Range,
    /// Concatenate operands column-wise: `inputs = [a, b, ...]`.
    Zip,
}

impl OpCode {
    /// Human-readable mnemonic for diagnostics.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Load => "LOAD",
            OpCode::Field => "FIELD",
            OpCode::Range => "RANGE",
            OpCode::Zip => "ZIP",
        }
    }
}

/// One decoded instruction: opcode, input operands, output register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub op: OpCode,
    pub input: Vec<InputOperand>,
    pub output: u8,
}

/// Resolves inputs, runs the opcode, and writes the output register.
///
/// The target register keeps its pre-call contents when the op fails.
pub fn execute(
    ctx: &mut Context<'_>,
    registers: &mut RegisterFile,
    instruction: &Instruction,
) -> Result<(), VmError> {
    let inputs = resolve_inputs(registers, &instruction.input)?;
    debug!(
        op = instruction.op.mnemonic(),
        output = instruction.output,
        "executing instruction"
    );
    let result = match instruction.op {
        OpCode::Load => op_load(ctx, &inputs)?,
        OpCode::Field => op_field(&inputs)?,
        OpCode::Range => op_range(&inputs)?,
        OpCode::Zip => op_zip(&inputs)?,
    };
    registers.set(instruction.output, result)
}

/// Replaces register references with clones of the referenced operands.
fn resolve_inputs(
    registers: &RegisterFile,
    inputs: &[InputOperand],
) -> Result<Vec<Operand>, VmError> {
    inputs
        .iter()
        .map(|input| match input {
            InputOperand::Immediate(operand) => Ok(operand.clone()),
            InputOperand::Register(idx) => registers.get(*idx).cloned(),
        })
        .collect()
}

fn expect_arity(inputs: &[Operand], expected: usize) -> Result<(), VmError> {
    if inputs.len() != expected {
        return Err(VmError::ArityMismatch {
            expected,
            actual: inputs.len(),
        });
    }
    Ok(())
}

/// `LOAD`: materialises the cross product of `ids` and `fields` from slot
/// storage.
///
/// Rows follow the order of `ids`, columns the order of `fields`; neither is
/// deduplicated. An empty id or field list yields an operand with the
/// matching column arity and no rows.
fn op_load(ctx: &Context<'_>, inputs: &[Operand]) -> Result<Operand, VmError> {
    expect_arity(inputs, 3)?;
    let table_ref: TableRef = inputs[0].scalar_u8("table")?;
    let table = ctx.storage.schema.table(table_ref)?;
    let ids = inputs[1].row_ids()?;
    let fields = inputs[2].field_indices()?;

    let mut meta = Vec::with_capacity(fields.len());
    for &field in &fields {
        meta.push(table.column(field)?.dtype);
    }
    if ids.is_empty() || fields.is_empty() {
        return Ok(Operand::empty(meta));
    }

    let mut data = Vec::with_capacity(ids.len());
    for &id in &ids {
        let head = ctx.storage.row_path_hash(table_ref, id);
        let mut tuple = Vec::with_capacity(fields.len());
        for &field in &fields {
            let column = table.column(field)?;
            tuple.push(codec::read_column(&ctx.storage, ctx.address, head, column)?);
        }
        data.push(tuple);
    }
    Ok(Operand::new(meta, data))
}

/// `FIELD`: projects the listed columns of `src`, in list order.
fn op_field(inputs: &[Operand]) -> Result<Operand, VmError> {
    expect_arity(inputs, 2)?;
    let src = &inputs[0];
    let fields = inputs[1].field_indices()?;

    let mut meta = Vec::with_capacity(fields.len());
    for &field in &fields {
        let dtype = src.meta.get(field as usize).ok_or(VmError::IndexOutOfRange {
            what: "field",
            index: u64::from(field),
            limit: src.column_count() as u64,
        })?;
        meta.push(*dtype);
    }
    let mut data = Vec::with_capacity(src.row_count());
    for row in &src.data {
        let mut tuple = Vec::with_capacity(fields.len());
        for &field in &fields {
            let cell = row.get(field as usize).ok_or(VmError::IndexOutOfRange {
                what: "field",
                index: u64::from(field),
                limit: row.len() as u64,
            })?;
            tuple.push(cell.clone());
        }
        data.push(tuple);
    }
    Ok(Operand::new(meta, data))
}

/// `RANGE`: rows `[offset, offset + count)` of `src`, clamped to the row
/// count.
fn op_range(inputs: &[Operand]) -> Result<Operand, VmError> {
    expect_arity(inputs, 3)?;
    let src = &inputs[0];
    let offset = inputs[1].scalar_u64("offset")?;
    let count = inputs[2].scalar_u64("count")?;

    let rows = src.row_count() as u64;
    let start = offset.min(rows) as usize;
    let end = offset.saturating_add(count).min(rows) as usize;
    Ok(Operand::new(src.meta.clone(), src.data[start..end].to_vec()))
}

/// `ZIP`: column-wise concatenation of operands sharing a row count.
fn op_zip(inputs: &[Operand]) -> Result<Operand, VmError> {
    let first = inputs.first().ok_or(VmError::ArityMismatch {
        expected: 1,
        actual: 0,
    })?;
    let rows = first.row_count();

    let mut meta = Vec::new();
    let mut data = vec![Vec::new(); rows];
    for operand in inputs {
        if operand.row_count() != rows {
            return Err(VmError::IndexOutOfRange {
                what: "zip row",
                index: operand.row_count() as u64,
                limit: rows as u64,
            });
        }
        meta.extend_from_slice(&operand.meta);
        for (row, tuple) in data.iter_mut().zip(&operand.data) {
            row.extend_from_slice(tuple);
        }
    }
    Ok(Operand::new(meta, data))
}

/// Marks the columns listed in a field-list operand, validating that every
/// index is in range and unique.
fn supplied_fields(fields: &Operand, column_count: usize) -> Result<Vec<bool>, VmError> {
    let mut supplied = vec![false; column_count];
    for index in fields.field_indices()? {
        let slot = supplied
            .get_mut(index as usize)
            .ok_or(VmError::IndexOutOfRange {
                what: "field",
                index: u64::from(index),
                limit: column_count as u64,
            })?;
        if *slot {
            return Err(VmError::IndexOutOfRange {
                what: "duplicate field",
                index: u64::from(index),
                limit: column_count as u64,
            });
        }
        *slot = true;
    }
    Ok(supplied)
}

impl Operand {
    /// Synthesises cells for every defaulted column absent from this field
    /// list.
    ///
    /// `self` lists the columns an insertion already supplies. Returns the
    /// field list of newly covered columns (ascending) and one 1x1 operand
    /// per column carrying the schema default. Columns already supplied are
    /// skipped; columns without [`ATTR_HAS_DEFAULT`](crate::schema::ATTR_HAS_DEFAULT)
    /// are left to the auto-increment pass.
    pub fn fill_default(
        &self,
        ctx: &Context<'_>,
        table_ref: TableRef,
    ) -> Result<(Operand, Vec<Operand>), VmError> {
        let table = ctx.storage.schema.table(table_ref)?;
        let supplied = supplied_fields(self, table.columns.len())?;

        let mut indices: Vec<ColumnRef> = Vec::new();
        let mut outputs = Vec::new();
        for (i, column) in table.columns.iter().enumerate() {
            if supplied[i] || !column.has_default() {
                continue;
            }
            let value = column.default_value.clone().ok_or_else(|| {
                VmError::invalid_data_type(format!(
                    "column {i} of table {table_ref} marked default without a value"
                ))
            })?;
            indices.push(i as ColumnRef);
            outputs.push(Operand::single(column.dtype, value));
        }
        Ok((Operand::from_field_indices(&indices), outputs))
    }

    /// Draws values from persistent sequences for every auto-increment
    /// column absent from this field list.
    ///
    /// For each such column, reads the sequence slot as a big-endian integer
    /// `n`, emits a 1x1 operand carrying `n`, and stores `n + 1` re-encoded
    /// for the column type, right-aligned in the 32-byte slot. When `n + 1`
    /// would exceed the column type's maximum the call fails `Overflow` and
    /// that sequence slot keeps its value. Unset slots read as zero, so a
    /// fresh sequence allocates 0 first. Designed to run after
    /// [`Operand::fill_default`], whose columns are already in the field
    /// list and therefore skipped.
    pub fn fill_auto_inc(
        &self,
        ctx: &mut Context<'_>,
        table_ref: TableRef,
    ) -> Result<(Operand, Vec<Operand>), VmError> {
        let table = ctx.storage.schema.table(table_ref)?.clone();
        let supplied = supplied_fields(self, table.columns.len())?;

        let mut indices: Vec<ColumnRef> = Vec::new();
        let mut outputs = Vec::new();
        for (i, column) in table.columns.iter().enumerate() {
            if supplied[i] || !column.has_sequence() {
                continue;
            }
            let (_, max) = column.dtype.min_max().ok_or_else(|| {
                VmError::invalid_data_type(format!(
                    "sequence column {i} of table {table_ref} must be numeric"
                ))
            })?;

            let path = ctx.storage.sequence_path_hash(table_ref, column.sequence);
            let slot = ctx.storage.get_state(ctx.address, path);
            let current = BigInt::from_bytes_be(Sign::Plus, &slot);
            let next = &current + 1u32;
            if BigDecimal::from(next.clone()) > max {
                return Err(VmError::Overflow {
                    table: table_ref,
                    column: i as u8,
                });
            }

            let encoded = column.dtype.encode(&Value::from(next))?;
            let mut updated = ZERO_SLOT;
            updated[SLOT_LEN - encoded.len()..].copy_from_slice(&encoded);
            ctx.storage.set_state(ctx.address, path, updated);
            debug!(
                table = table_ref,
                sequence = column.sequence,
                value = %current,
                "advanced auto-increment sequence"
            );

            indices.push(i as ColumnRef);
            outputs.push(Operand::single(column.dtype, Value::from(current)));
        }
        Ok((Operand::from_field_indices(&indices), outputs))
    }
}
