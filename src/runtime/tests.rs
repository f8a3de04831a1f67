//! Integration tests for the instruction surface: row loading, insertion
//! helpers, and operand-shape ops over an in-memory slot backend.

use super::codec;
use super::*;
use crate::errors::VmError;
use crate::schema::{
    ATTR_HAS_DEFAULT, ATTR_HAS_SEQUENCE, Column, ColumnAttr, Schema, SequenceRef, Table,
};
use crate::storage::state::ZERO_SLOT;
use crate::storage::{MemStateDb, SLOT_LEN, Storage};
use crate::types::{Address, DataType, Hash, Value};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::One;

const ACCOUNT: Address = Address([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x66, 0x55,
]);

fn plain(dtype: DataType) -> Column {
    Column::new(Vec::new(), dtype, 0, 0, None)
}

fn with_attr(
    name: &str,
    dtype: DataType,
    attr: ColumnAttr,
    sequence: SequenceRef,
    default_value: Option<Value>,
) -> Column {
    Column::new(name.as_bytes().to_vec(), dtype, attr, sequence, default_value)
}

/// Schema used by the load tests: the target table sits at index 1 between
/// two empty tables, with one column per supported packing shape.
fn load_schema() -> Schema {
    let mut schema = Schema(vec![
        Table::new("Table_A", Vec::new()),
        Table::new("Table_B", vec![
            plain(DataType::Uint(2)),
            plain(DataType::Uint(8)),
            plain(DataType::Bool),
            plain(DataType::DynamicBytes),
            plain(DataType::FixedBytes(9)),
            plain(DataType::DynamicBytes),
            plain(DataType::DynamicBytes),
            plain(DataType::Uint(31)),
        ]),
        Table::new("Table_C", Vec::new()),
    ]);
    schema.setup_column_offset().unwrap();
    schema
}

/// Raw slot images of one row of `Table_B`. Slot 1 and 3 are short-form
/// dynamic-bytes descriptors; slot 4 is a long-form descriptor whose 32-byte
/// payload lives behind the payload path.
const ROW_SLOTS: [&str; 6] = [
    "0123112233445566778800000000000000000000000000000000000000000000",
    "48656c6c6f2c20776f726c64210000000000000000000000000000000000001a",
    "3132333435363738393000000000000000000000000000000000000000000000",
    "53514c564d2069732075736566756c2100000000000000000000000000000020",
    "0000000000000000000000000000000000000000000000000000000000000041",
    "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
];

const LONG_PAYLOAD: &[u8] = b"Hello world. Hello DEXON, SQLVM.";

fn seed_row(storage: &mut Storage<'_>, head: Hash) {
    for (i, image) in ROW_SLOTS.iter().enumerate() {
        let bytes = hex::decode(image).unwrap();
        let mut slot = ZERO_SLOT;
        slot.copy_from_slice(&bytes);
        storage.set_state(ACCOUNT, Storage::shift_key(head, i as u64), slot);
    }
    let descriptor_key = Storage::shift_key(head, 4);
    let mut payload_slot = ZERO_SLOT;
    payload_slot.copy_from_slice(LONG_PAYLOAD);
    storage.set_state(ACCOUNT, Storage::payload_path_hash(descriptor_key), payload_slot);
}

/// Cells the seeded row decodes to, in column order.
fn expected_cells() -> Vec<Value> {
    vec![
        Value::from(0x0123u64),
        Value::from(0x1122334455667788u64),
        Value::boolean(false),
        Value::bytes(&b"Hello, world!"[..]),
        Value::bytes(hex::decode("313233343536373839").unwrap()),
        Value::bytes(&b"SQLVM is useful!"[..]),
        Value::bytes(LONG_PAYLOAD),
        Value::Number(BigDecimal::from((BigInt::one() << 248) - 1)),
    ]
}

fn table_operand(table: u8) -> Operand {
    Operand::single(DataType::Uint(1), Value::from(u64::from(table)))
}

fn ids_operand(ids: &[u64]) -> Operand {
    Operand::new(
        vec![DataType::Uint(8)],
        ids.iter().map(|&id| vec![Value::from(id)]).collect(),
    )
}

fn load_instruction(table: u8, ids: &[u64], fields: &[u8], output: u8) -> Instruction {
    Instruction {
        op: OpCode::Load,
        input: vec![
            InputOperand::Immediate(table_operand(table)),
            InputOperand::Immediate(ids_operand(ids)),
            InputOperand::Immediate(Operand::from_field_indices(fields)),
        ],
        output,
    }
}

#[test]
fn decode_materialises_each_column() {
    let mut db = MemStateDb::new();
    let mut storage = Storage::new(&mut db, load_schema());
    let head = storage.row_path_hash(1, 123_456);
    seed_row(&mut storage, head);

    let table = storage.schema.table(1).unwrap();
    let expected = expected_cells();
    for (column, want) in table.columns.iter().zip(&expected) {
        let slot_key = Storage::shift_key(head, u64::from(column.slot_shift()));
        let slot = storage.get_state(ACCOUNT, slot_key);
        let start = column.byte_shift() as usize;
        let window = &slot[start..start + column.dtype.size()];
        let cell = codec::decode_window(&storage, ACCOUNT, column.dtype, slot_key, window)
            .unwrap();
        assert_eq!(&cell, want, "column {}", column.dtype);
    }
}

#[test]
fn op_load_with_empty_lists_yields_empty_operand() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, load_schema()), ACCOUNT);
    let mut registers = RegisterFile::new(4);

    execute(&mut ctx, &mut registers, &load_instruction(0, &[], &[], 0)).unwrap();
    let result = registers.get(0).unwrap();
    assert!(result.meta.is_empty());
    assert!(result.data.is_empty());
}

#[test]
fn op_load_missing_table_fails_and_preserves_register() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, load_schema()), ACCOUNT);
    let mut registers = RegisterFile::new(4);
    let sentinel = Operand::single(DataType::Bool, Value::boolean(true));
    registers.set(0, sentinel.clone()).unwrap();

    let err = execute(&mut ctx, &mut registers, &load_instruction(13, &[], &[], 0))
        .unwrap_err();
    assert_eq!(
        err,
        VmError::IndexOutOfRange {
            what: "table",
            index: 13,
            limit: 3
        }
    );
    assert_eq!(registers.get(0).unwrap(), &sentinel);
}

#[test]
fn op_load_materialises_full_rows() {
    let mut db = MemStateDb::new();
    let mut storage = Storage::new(&mut db, load_schema());
    for id in [123_456u64, 654_321] {
        let head = storage.row_path_hash(1, id);
        seed_row(&mut storage, head);
    }
    let mut ctx = Context::new(storage, ACCOUNT);
    let mut registers = RegisterFile::new(4);

    let fields: Vec<u8> = (0..8).collect();
    execute(
        &mut ctx,
        &mut registers,
        &load_instruction(1, &[123_456, 654_321], &fields, 0),
    )
    .unwrap();

    let result = registers.get(0).unwrap();
    let table = ctx.storage.schema.table(1).unwrap();
    let meta: Vec<DataType> = table.columns.iter().map(|c| c.dtype).collect();
    assert_eq!(result.meta, meta);
    assert_eq!(result.row_count(), 2);
    let expected = expected_cells();
    for row in &result.data {
        assert_eq!(row, &expected);
    }
}

#[test]
fn op_load_resolves_register_inputs() {
    let mut db = MemStateDb::new();
    let mut storage = Storage::new(&mut db, load_schema());
    let head = storage.row_path_hash(1, 7);
    seed_row(&mut storage, head);
    let mut ctx = Context::new(storage, ACCOUNT);

    let mut registers = RegisterFile::new(4);
    registers.set(1, table_operand(1)).unwrap();
    registers.set(2, ids_operand(&[7])).unwrap();
    registers.set(3, Operand::from_field_indices(&[0, 2])).unwrap();

    let instruction = Instruction {
        op: OpCode::Load,
        input: vec![
            InputOperand::Register(1),
            InputOperand::Register(2),
            InputOperand::Register(3),
        ],
        output: 0,
    };
    execute(&mut ctx, &mut registers, &instruction).unwrap();

    let result = registers.get(0).unwrap();
    assert_eq!(result.meta, vec![DataType::Uint(2), DataType::Bool]);
    assert_eq!(result.data, vec![vec![
        Value::from(0x0123u64),
        Value::boolean(false)
    ]]);
}

#[test]
fn op_load_bad_field_index_fails() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, load_schema()), ACCOUNT);
    let mut registers = RegisterFile::new(4);

    let err = execute(
        &mut ctx,
        &mut registers,
        &load_instruction(1, &[1], &[8], 0),
    )
    .unwrap_err();
    assert_eq!(
        err,
        VmError::IndexOutOfRange {
            what: "field",
            index: 8,
            limit: 8
        }
    );
}

#[test]
fn reading_an_unwritten_register_fails() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, load_schema()), ACCOUNT);
    let mut registers = RegisterFile::new(4);

    let instruction = Instruction {
        op: OpCode::Load,
        input: vec![
            InputOperand::Register(1),
            InputOperand::Register(2),
            InputOperand::Register(3),
        ],
        output: 0,
    };
    let err = execute(&mut ctx, &mut registers, &instruction).unwrap_err();
    assert_eq!(err, VmError::EmptyRegister(1));
}

/// Schema for the auto-increment tests: the first table has two sequence
/// columns around a plain one; the rest exist to pre-seed overflow.
fn auto_inc_schema() -> Schema {
    let mut schema = Schema(vec![
        Table::new("normal_case", vec![
            with_attr("c1", DataType::Int(1), ATTR_HAS_SEQUENCE, 0, None),
            with_attr("c2", DataType::DynamicBytes, 0, 0, None),
            with_attr("c3", DataType::Uint(1), ATTR_HAS_SEQUENCE, 1, None),
        ]),
        Table::new("overflow_int_case", vec![with_attr(
            "c1",
            DataType::Int(32),
            ATTR_HAS_SEQUENCE,
            0,
            None,
        )]),
        Table::new("overflow_uint_case", vec![with_attr(
            "c1",
            DataType::Uint(32),
            ATTR_HAS_SEQUENCE,
            0,
            None,
        )]),
        Table::new("overflow_narrow_case", vec![with_attr(
            "c1",
            DataType::Int(1),
            ATTR_HAS_SEQUENCE,
            0,
            None,
        )]),
    ]);
    schema.setup_column_offset().unwrap();
    schema
}

/// Pre-seeds a sequence slot with the column type's maximum value.
fn seed_sequence_to_max(ctx: &mut Context<'_>, table: u8, sequence: u8, dtype: DataType) {
    let (_, max) = dtype.min_max().unwrap();
    let encoded = dtype.encode(&Value::Number(max)).unwrap();
    let mut slot = ZERO_SLOT;
    slot[SLOT_LEN - encoded.len()..].copy_from_slice(&encoded);
    let path = ctx.storage.sequence_path_hash(table, sequence);
    ctx.storage.set_state(ctx.address, path, slot);
}

#[test]
fn fill_auto_inc_allocates_from_fresh_sequences() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, auto_inc_schema()), ACCOUNT);

    let input = Operand::from_field_indices(&[1]);
    let (fields, outputs) = input.fill_auto_inc(&mut ctx, 0).unwrap();

    assert_eq!(fields, Operand::from_field_indices(&[0, 2]));
    assert_eq!(outputs, vec![
        Operand::single(DataType::Int(1), Value::from(0u64)),
        Operand::single(DataType::Uint(1), Value::from(0u64)),
    ]);

    // Both sequence slots now hold 1, right-aligned.
    for sequence in [0u8, 1] {
        let path = ctx.storage.sequence_path_hash(0, sequence);
        let slot = ctx.storage.get_state(ACCOUNT, path);
        let mut expected = ZERO_SLOT;
        expected[SLOT_LEN - 1] = 1;
        assert_eq!(slot, expected);
    }

    // The next insertion draws the next value.
    let (fields, outputs) = input.fill_auto_inc(&mut ctx, 0).unwrap();
    assert_eq!(fields, Operand::from_field_indices(&[0, 2]));
    assert_eq!(outputs[0], Operand::single(DataType::Int(1), Value::from(1u64)));
    assert_eq!(outputs[1], Operand::single(DataType::Uint(1), Value::from(1u64)));
}

#[test]
fn fill_auto_inc_skips_columns_already_supplied() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, auto_inc_schema()), ACCOUNT);

    let input = Operand::from_field_indices(&[0, 1, 2]);
    let (fields, outputs) = input.fill_auto_inc(&mut ctx, 0).unwrap();
    assert_eq!(fields, Operand::from_field_indices(&[]));
    assert!(outputs.is_empty());

    // No sequence slot was touched.
    let path = ctx.storage.sequence_path_hash(0, 0);
    assert_eq!(ctx.storage.get_state(ACCOUNT, path), ZERO_SLOT);
}

#[test]
fn fill_auto_inc_overflow_leaves_sequence_untouched() {
    for (table, dtype) in [
        (1u8, DataType::Int(32)),
        (2u8, DataType::Uint(32)),
        (3u8, DataType::Int(1)),
    ] {
        let mut db = MemStateDb::new();
        let mut ctx = Context::new(Storage::new(&mut db, auto_inc_schema()), ACCOUNT);
        seed_sequence_to_max(&mut ctx, table, 0, dtype);
        let path = ctx.storage.sequence_path_hash(table, 0);
        let before = ctx.storage.get_state(ACCOUNT, path);

        let input = Operand::from_field_indices(&[]);
        let err = input.fill_auto_inc(&mut ctx, table).unwrap_err();
        assert_eq!(err, VmError::Overflow { table, column: 0 });
        assert_eq!(ctx.storage.get_state(ACCOUNT, path), before);
    }
}

/// Schema for the fill-default tests: every column defaulted, none, and one.
fn default_schema() -> Schema {
    let all = vec![
        with_attr(
            "c1",
            DataType::Int(1),
            ATTR_HAS_DEFAULT,
            0,
            Some(Value::from(127u64)),
        ),
        with_attr(
            "c2",
            DataType::DynamicBytes,
            ATTR_HAS_DEFAULT,
            0,
            Some(Value::bytes(vec![1, 2, 3, 4])),
        ),
        with_attr(
            "c3",
            DataType::Uint(1),
            ATTR_HAS_DEFAULT,
            1,
            Some(Value::from(255u64)),
        ),
        with_attr(
            "c4",
            DataType::Address,
            ATTR_HAS_DEFAULT,
            1,
            Some(Value::bytes(ACCOUNT.as_slice().to_vec())),
        ),
    ];
    let none = vec![
        with_attr("c1", DataType::Int(1), 0, 0, None),
        with_attr("c2", DataType::DynamicBytes, 0, 0, None),
        with_attr("c3", DataType::Uint(1), 0, 1, None),
        with_attr("c4", DataType::Address, 0, 1, None),
    ];
    let one = vec![
        with_attr("c1", DataType::Int(1), 0, 0, None),
        with_attr("c2", DataType::DynamicBytes, 0, 0, None),
        with_attr("c3", DataType::Uint(1), 0, 1, None),
        with_attr(
            "c4",
            DataType::Address,
            ATTR_HAS_DEFAULT,
            1,
            Some(Value::bytes(ACCOUNT.as_slice().to_vec())),
        ),
    ];
    let mut schema = Schema(vec![
        Table::new("all default case", all),
        Table::new("no default case", none),
        Table::new("one default case", one),
    ]);
    schema.setup_column_offset().unwrap();
    schema
}

#[test]
fn fill_default_covers_every_missing_column() {
    let mut db = MemStateDb::new();
    let ctx = Context::new(Storage::new(&mut db, default_schema()), ACCOUNT);

    let input = Operand::from_field_indices(&[]);
    let (fields, outputs) = input.fill_default(&ctx, 0).unwrap();
    assert_eq!(fields, Operand::from_field_indices(&[0, 1, 2, 3]));
    assert_eq!(outputs, vec![
        Operand::single(DataType::Int(1), Value::from(127u64)),
        Operand::single(DataType::DynamicBytes, Value::bytes(vec![1, 2, 3, 4])),
        Operand::single(DataType::Uint(1), Value::from(255u64)),
        Operand::single(DataType::Address, Value::bytes(ACCOUNT.as_slice().to_vec())),
    ]);
}

#[test]
fn fill_default_without_defaults_is_empty() {
    let mut db = MemStateDb::new();
    let ctx = Context::new(Storage::new(&mut db, default_schema()), ACCOUNT);

    let input = Operand::from_field_indices(&[]);
    let (fields, outputs) = input.fill_default(&ctx, 1).unwrap();
    assert_eq!(fields, Operand::from_field_indices(&[]));
    assert!(outputs.is_empty());
}

#[test]
fn fill_default_single_column() {
    let mut db = MemStateDb::new();
    let ctx = Context::new(Storage::new(&mut db, default_schema()), ACCOUNT);

    let input = Operand::from_field_indices(&[]);
    let (fields, outputs) = input.fill_default(&ctx, 2).unwrap();
    assert_eq!(fields, Operand::from_field_indices(&[3]));
    assert_eq!(outputs, vec![Operand::single(
        DataType::Address,
        Value::bytes(ACCOUNT.as_slice().to_vec())
    )]);
}

#[test]
fn fill_default_skips_supplied_column() {
    let mut db = MemStateDb::new();
    let ctx = Context::new(Storage::new(&mut db, default_schema()), ACCOUNT);

    let input = Operand::from_field_indices(&[3]);
    let (fields, outputs) = input.fill_default(&ctx, 2).unwrap();
    assert_eq!(fields, Operand::from_field_indices(&[]));
    assert!(outputs.is_empty());
}

#[test]
fn fill_helpers_reject_duplicate_field_indices() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, default_schema()), ACCOUNT);

    let input = Operand::from_field_indices(&[3, 3]);
    assert_eq!(
        input.fill_default(&ctx, 2).unwrap_err(),
        VmError::IndexOutOfRange {
            what: "duplicate field",
            index: 3,
            limit: 4
        }
    );
    assert!(matches!(
        input.fill_auto_inc(&mut ctx, 2).unwrap_err(),
        VmError::IndexOutOfRange {
            what: "duplicate field",
            ..
        }
    ));
}

#[test]
fn fill_helpers_reject_out_of_range_field_indices() {
    let mut db = MemStateDb::new();
    let ctx = Context::new(Storage::new(&mut db, default_schema()), ACCOUNT);

    let input = Operand::from_field_indices(&[9]);
    assert_eq!(
        input.fill_default(&ctx, 2).unwrap_err(),
        VmError::IndexOutOfRange {
            what: "field",
            index: 9,
            limit: 4
        }
    );
}

#[test]
fn default_then_auto_inc_compose() {
    // A table mixing a defaulted column with a sequence column: after
    // fill_default covers the former, fill_auto_inc only touches the latter.
    let mut schema = Schema(vec![Table::new("mixed", vec![
        with_attr(
            "c1",
            DataType::Uint(2),
            ATTR_HAS_DEFAULT,
            0,
            Some(Value::from(7u64)),
        ),
        with_attr("c2", DataType::Uint(8), ATTR_HAS_SEQUENCE, 0, None),
        with_attr("c3", DataType::Bool, 0, 0, None),
    ])]);
    schema.setup_column_offset().unwrap();
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, schema), ACCOUNT);

    let supplied = Operand::from_field_indices(&[2]);
    let (default_fields, defaults) = supplied.fill_default(&ctx, 0).unwrap();
    assert_eq!(default_fields, Operand::from_field_indices(&[0]));
    assert_eq!(defaults.len(), 1);

    let after_defaults = Operand::new(
        supplied.meta.clone(),
        supplied
            .data
            .iter()
            .chain(&default_fields.data)
            .cloned()
            .collect(),
    );
    let (seq_fields, values) = after_defaults.fill_auto_inc(&mut ctx, 0).unwrap();
    assert_eq!(seq_fields, Operand::from_field_indices(&[1]));
    assert_eq!(values, vec![Operand::single(
        DataType::Uint(8),
        Value::from(0u64)
    )]);
}

#[test]
fn op_field_projects_columns() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, load_schema()), ACCOUNT);
    let mut registers = RegisterFile::new(4);

    let src = Operand::new(
        vec![DataType::Uint(1), DataType::Bool],
        vec![
            vec![Value::from(1u64), Value::boolean(true)],
            vec![Value::from(2u64), Value::boolean(false)],
        ],
    );
    let instruction = Instruction {
        op: OpCode::Field,
        input: vec![
            InputOperand::Immediate(src),
            InputOperand::Immediate(Operand::from_field_indices(&[1, 0])),
        ],
        output: 0,
    };
    execute(&mut ctx, &mut registers, &instruction).unwrap();

    let result = registers.get(0).unwrap();
    assert_eq!(result.meta, vec![DataType::Bool, DataType::Uint(1)]);
    assert_eq!(result.data, vec![
        vec![Value::boolean(true), Value::from(1u64)],
        vec![Value::boolean(false), Value::from(2u64)],
    ]);
}

#[test]
fn op_field_rejects_bad_projection() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, load_schema()), ACCOUNT);
    let mut registers = RegisterFile::new(4);

    let src = Operand::new(vec![DataType::Bool], vec![vec![Value::boolean(true)]]);
    let instruction = Instruction {
        op: OpCode::Field,
        input: vec![
            InputOperand::Immediate(src),
            InputOperand::Immediate(Operand::from_field_indices(&[1])),
        ],
        output: 0,
    };
    assert!(matches!(
        execute(&mut ctx, &mut registers, &instruction).unwrap_err(),
        VmError::IndexOutOfRange { what: "field", .. }
    ));
}

#[test]
fn op_range_slices_and_clamps() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, load_schema()), ACCOUNT);
    let mut registers = RegisterFile::new(4);

    let src = Operand::new(
        vec![DataType::Uint(1)],
        (0..5u64).map(|i| vec![Value::from(i)]).collect(),
    );
    let range = |offset: u64, count: u64| Instruction {
        op: OpCode::Range,
        input: vec![
            InputOperand::Immediate(src.clone()),
            InputOperand::Immediate(Operand::single(DataType::Uint(8), Value::from(offset))),
            InputOperand::Immediate(Operand::single(DataType::Uint(8), Value::from(count))),
        ],
        output: 0,
    };

    execute(&mut ctx, &mut registers, &range(1, 2)).unwrap();
    assert_eq!(registers.get(0).unwrap().data, vec![
        vec![Value::from(1u64)],
        vec![Value::from(2u64)],
    ]);

    // Clamped past the end; offset beyond the rows yields no rows.
    execute(&mut ctx, &mut registers, &range(3, 10)).unwrap();
    assert_eq!(registers.get(0).unwrap().row_count(), 2);
    execute(&mut ctx, &mut registers, &range(9, 1)).unwrap();
    assert_eq!(registers.get(0).unwrap().row_count(), 0);
}

#[test]
fn op_zip_concatenates_columns() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, load_schema()), ACCOUNT);
    let mut registers = RegisterFile::new(4);

    let a = Operand::new(vec![DataType::Uint(1)], vec![
        vec![Value::from(1u64)],
        vec![Value::from(2u64)],
    ]);
    let b = Operand::new(vec![DataType::Bool], vec![
        vec![Value::boolean(true)],
        vec![Value::boolean(false)],
    ]);
    let instruction = Instruction {
        op: OpCode::Zip,
        input: vec![InputOperand::Immediate(a), InputOperand::Immediate(b)],
        output: 0,
    };
    execute(&mut ctx, &mut registers, &instruction).unwrap();

    let result = registers.get(0).unwrap();
    assert_eq!(result.meta, vec![DataType::Uint(1), DataType::Bool]);
    assert_eq!(result.data, vec![
        vec![Value::from(1u64), Value::boolean(true)],
        vec![Value::from(2u64), Value::boolean(false)],
    ]);
}

#[test]
fn op_zip_rejects_mismatched_row_counts() {
    let mut db = MemStateDb::new();
    let mut ctx = Context::new(Storage::new(&mut db, load_schema()), ACCOUNT);
    let mut registers = RegisterFile::new(4);

    let a = Operand::new(vec![DataType::Uint(1)], vec![vec![Value::from(1u64)]]);
    let b = Operand::empty(vec![DataType::Bool]);
    let instruction = Instruction {
        op: OpCode::Zip,
        input: vec![InputOperand::Immediate(a), InputOperand::Immediate(b)],
        output: 0,
    };
    assert!(matches!(
        execute(&mut ctx, &mut registers, &instruction).unwrap_err(),
        VmError::IndexOutOfRange { what: "zip row", .. }
    ));
}

#[test]
fn loaded_rows_survive_a_write_read_cycle() {
    // Seed a row through the codec instead of raw slot images, then load it
    // back: the public write path and the loader agree on the layout.
    let mut db = MemStateDb::new();
    let mut storage = Storage::new(&mut db, load_schema());
    let head = storage.row_path_hash(1, 77);
    let table = storage.schema.table(1).unwrap().clone();
    let cells = expected_cells();
    for (column, cell) in table.columns.iter().zip(&cells) {
        codec::write_column(&mut storage, ACCOUNT, head, column, cell).unwrap();
    }

    let mut ctx = Context::new(storage, ACCOUNT);
    let mut registers = RegisterFile::new(4);
    let fields: Vec<u8> = (0..8).collect();
    execute(&mut ctx, &mut registers, &load_instruction(1, &[77], &fields, 0)).unwrap();
    assert_eq!(registers.get(0).unwrap().data, vec![cells]);
}
