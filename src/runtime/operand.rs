//! Rectangular typed values exchanged between instructions.

use crate::errors::VmError;
use crate::schema::ColumnRef;
use crate::types::{DataType, Value};

/// One row of an operand: a tuple of cells, one per metadata entry.
pub type Tuple = Vec<Value>;

/// A rectangular typed table fragment.
///
/// Invariant: every tuple in `data` has exactly `meta.len()` cells, and cell
/// `j` matches `meta[j]`. An operand with no rows is legal and carries its
/// column arity in `meta` alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Operand {
    pub meta: Vec<DataType>,
    pub data: Vec<Tuple>,
}

impl Operand {
    pub fn new(meta: Vec<DataType>, data: Vec<Tuple>) -> Self {
        Self { meta, data }
    }

    /// Operand with the given arity and no rows.
    pub fn empty(meta: Vec<DataType>) -> Self {
        Self { meta, data: Vec::new() }
    }

    /// 1x1 operand carrying a single cell.
    pub fn single(dtype: DataType, value: Value) -> Self {
        Self {
            meta: vec![dtype],
            data: vec![vec![value]],
        }
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn column_count(&self) -> usize {
        self.meta.len()
    }

    /// Checks the rectangular invariant.
    pub fn is_rectangular(&self) -> bool {
        self.data.iter().all(|row| row.len() == self.meta.len())
    }

    /// Builds a field-list operand: a single `uint(1)` column whose rows are
    /// the given column indices, in order.
    pub fn from_field_indices(indices: &[ColumnRef]) -> Self {
        Self {
            meta: vec![DataType::Uint(1)],
            data: indices
                .iter()
                .map(|&i| vec![Value::from(u64::from(i))])
                .collect(),
        }
    }

    /// Reads this operand as a field list: one column index per row.
    ///
    /// Fails `IndexOutOfRange` when a cell is missing, non-integral, or
    /// does not fit a column reference.
    pub fn field_indices(&self) -> Result<Vec<ColumnRef>, VmError> {
        let mut indices = Vec::with_capacity(self.data.len());
        for (i, row) in self.data.iter().enumerate() {
            let value = row.first().and_then(Value::to_u64).ok_or(
                VmError::IndexOutOfRange {
                    what: "field",
                    index: i as u64,
                    limit: self.data.len() as u64,
                },
            )?;
            let index = ColumnRef::try_from(value).map_err(|_| VmError::IndexOutOfRange {
                what: "field",
                index: value,
                limit: 256,
            })?;
            indices.push(index);
        }
        Ok(indices)
    }

    /// Reads this operand as a row-id list: one id per row.
    pub fn row_ids(&self) -> Result<Vec<u64>, VmError> {
        let mut ids = Vec::with_capacity(self.data.len());
        for (i, row) in self.data.iter().enumerate() {
            let id = row.first().and_then(Value::to_u64).ok_or(
                VmError::IndexOutOfRange {
                    what: "row id",
                    index: i as u64,
                    limit: self.data.len() as u64,
                },
            )?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Reads the single cell of a 1x1 operand as `u64`.
    pub fn scalar_u64(&self, what: &'static str) -> Result<u64, VmError> {
        self.data
            .first()
            .and_then(|row| row.first())
            .and_then(Value::to_u64)
            .ok_or(VmError::IndexOutOfRange {
                what,
                index: 0,
                limit: 0,
            })
    }

    /// Reads the single cell of a 1x1 operand as `u8`.
    pub fn scalar_u8(&self, what: &'static str) -> Result<u8, VmError> {
        let value = self.scalar_u64(what)?;
        u8::try_from(value).map_err(|_| VmError::IndexOutOfRange {
            what,
            index: value,
            limit: 256,
        })
    }
}

/// An instruction input: either a literal operand embedded in the
/// instruction or a reference resolved through the register file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputOperand {
    Immediate(Operand),
    Register(u8),
}
