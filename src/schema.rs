//! Table and column registry with the packed slot layout.
//!
//! A [`Schema`] is built once per VM invocation and frozen after
//! [`Schema::setup_column_offset`] assigns every column its byte-level
//! position inside the row: the zero-based slot index (`slot_shift`) and the
//! byte offset within that slot (`byte_shift`). Columns are packed
//! left-to-right in declaration order; a field never straddles a slot
//! boundary.

use crate::errors::VmError;
use crate::storage::state::SLOT_LEN;
use crate::types::{DataType, Value};

/// Zero-based table index inside a schema.
pub type TableRef = u8;
/// Zero-based column index inside a table.
pub type ColumnRef = u8;
/// Index of an auto-increment sequence within its table.
pub type SequenceRef = u8;

/// Column attribute bitflags.
pub type ColumnAttr = u16;
/// Column carries a schema default value, applied by fill-default.
pub const ATTR_HAS_DEFAULT: ColumnAttr = 1 << 0;
/// Column draws values from a persistent auto-increment sequence.
pub const ATTR_HAS_SEQUENCE: ColumnAttr = 1 << 1;

/// Upper bound on columns per table, imposed by `u8` column references.
pub const MAX_COLUMNS: usize = 256;

/// A single column: identity, type, attributes, and (after setup) its packed
/// position inside the row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: Vec<u8>,
    pub dtype: DataType,
    pub attr: ColumnAttr,
    /// Sequence index for [`ATTR_HAS_SEQUENCE`] columns.
    pub sequence: SequenceRef,
    /// Default cell for [`ATTR_HAS_DEFAULT`] columns.
    pub default_value: Option<Value>,
    slot_shift: u8,
    byte_shift: u8,
}

impl Column {
    /// Creates a column with unassigned offsets.
    pub fn new(
        name: impl Into<Vec<u8>>,
        dtype: DataType,
        attr: ColumnAttr,
        sequence: SequenceRef,
        default_value: Option<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            dtype,
            attr,
            sequence,
            default_value,
            slot_shift: 0,
            byte_shift: 0,
        }
    }

    pub fn has_default(&self) -> bool {
        self.attr & ATTR_HAS_DEFAULT != 0
    }

    pub fn has_sequence(&self) -> bool {
        self.attr & ATTR_HAS_SEQUENCE != 0
    }

    /// Zero-based slot index of this column inside its row.
    pub fn slot_shift(&self) -> u8 {
        self.slot_shift
    }

    /// Byte offset of this column inside its slot.
    pub fn byte_shift(&self) -> u8 {
        self.byte_shift
    }
}

/// A table: display name plus ordered columns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub name: Vec<u8>,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<Vec<u8>>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Looks up a column by reference, failing `IndexOutOfRange` past the end.
    pub fn column(&self, column: ColumnRef) -> Result<&Column, VmError> {
        self.columns
            .get(column as usize)
            .ok_or(VmError::IndexOutOfRange {
                what: "field",
                index: column as u64,
                limit: self.columns.len() as u64,
            })
    }
}

/// Ordered collection of tables, indexed by [`TableRef`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema(pub Vec<Table>);

impl Schema {
    /// Looks up a table by reference, failing `IndexOutOfRange` past the end.
    pub fn table(&self, table: TableRef) -> Result<&Table, VmError> {
        self.0.get(table as usize).ok_or(VmError::IndexOutOfRange {
            what: "table",
            index: table as u64,
            limit: self.0.len() as u64,
        })
    }

    /// Assigns every column its packed `(slot_shift, byte_shift)` position.
    ///
    /// Walks columns left-to-right keeping a `(slot, byte)` frontier: a
    /// column whose width no longer fits the current slot starts the next
    /// one. Dynamic byte columns occupy a whole descriptor slot, which the
    /// same rule produces since their 32-byte footprint only ever fits a
    /// fresh slot. Validates each column type and the per-table column
    /// count. Must be called exactly once, before any load.
    pub fn setup_column_offset(&mut self) -> Result<(), VmError> {
        for table in &mut self.0 {
            if table.columns.len() > MAX_COLUMNS {
                return Err(VmError::IndexOutOfRange {
                    what: "column count",
                    index: table.columns.len() as u64,
                    limit: MAX_COLUMNS as u64,
                });
            }
            let mut slot: usize = 0;
            let mut byte: usize = 0;
            for column in &mut table.columns {
                column.dtype.validate()?;
                let width = column.dtype.size();
                if byte + width > SLOT_LEN {
                    slot += 1;
                    byte = 0;
                }
                column.slot_shift = slot as u8;
                column.byte_shift = byte as u8;
                byte += width;
            }
        }
        Ok(())
    }
}
