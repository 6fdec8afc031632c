//! The packed instruction encoding.
//!
//! Every instruction is one 32-bit word:
//!
//! ```text
//! [ 8-bit operation | 2-bit operand count | 22-bit data ]
//! ```
//!
//! The operation byte is itself `(kind << 3) | variant`, where the kind
//! selects the value family and variant 7 is reserved for that family's
//! typed null, so `operation & 7 == 7` tests null-ness for free. Operand
//! count 0..2 is the number of extra operand words that follow; 3 means the
//! data field holds the number of trailing bytecode words (containers).
//!
//! Data that cannot fit the 22-bit field goes to operand words (32/64-bit
//! immediates, absolute source offsets) or to the constant pool.

mod info;
mod render;

pub use info::{describe, DataFormat, OperandFormat, OpInfo};
pub use render::{render_instruction, render_stream};

pub const OPERATION_OFFSET: u32 = 24;
pub const OPERAND_COUNT_OFFSET: u32 = 22;
pub const DATA_MASK: i32 = 0x3F_FFFF;
pub const NULL_VARIANT: u8 = 7;

/// Largest payload length a reference instruction can carry inline.
pub const MAX_REFERENCE_LENGTH: u32 = DATA_MASK as u32;

/// Operation kinds, as seen by the downstream evaluator. The typed-null
/// opcode's payload byte doubles as the kind number for value kinds.
pub mod kind {
    pub const NULL: u8 = 0;
    pub const BOOL: u8 = 1;
    pub const INT: u8 = 2;
    pub const FLOAT: u8 = 3;
    pub const DECIMAL: u8 = 4;
    pub const TIMESTAMP: u8 = 5;
    pub const STRING: u8 = 6;
    pub const SYMBOL: u8 = 7;
    pub const BLOB: u8 = 8;
    pub const CLOB: u8 = 9;
    pub const LIST: u8 = 10;
    pub const SEXP: u8 = 11;
    pub const STRUCT: u8 = 12;
    pub const FIELD_NAME: u8 = 13;
    pub const ANNOTATION: u8 = 14;
    pub const ARGUMENT: u8 = 15;
    pub const IVM: u8 = 16;
    pub const DIRECTIVE: u8 = 17;
    pub const INVOKE: u8 = 18;
    pub const REFILL: u8 = 19;
    pub const END: u8 = 20;
    pub const METADATA: u8 = 21;
}

/// Operation bytes: `(kind << 3) | variant`.
pub mod op {
    use super::kind;
    use super::NULL_VARIANT;

    const fn variant(kind: u8, variant: u8) -> u8 {
        (kind << 3) | variant
    }

    pub const NULL_NULL: u8 = variant(kind::NULL, NULL_VARIANT);

    pub const BOOL: u8 = variant(kind::BOOL, 0);
    pub const NULL_BOOL: u8 = variant(kind::BOOL, NULL_VARIANT);

    pub const INT_I16: u8 = variant(kind::INT, 0);
    pub const INT_I32: u8 = variant(kind::INT, 1);
    pub const INT_I64: u8 = variant(kind::INT, 2);
    pub const INT_CP: u8 = variant(kind::INT, 3);
    pub const INT_REF: u8 = variant(kind::INT, 4);
    pub const NULL_INT: u8 = variant(kind::INT, NULL_VARIANT);

    pub const FLOAT_F32: u8 = variant(kind::FLOAT, 0);
    pub const FLOAT_F64: u8 = variant(kind::FLOAT, 1);
    pub const NULL_FLOAT: u8 = variant(kind::FLOAT, NULL_VARIANT);

    pub const DECIMAL_CP: u8 = variant(kind::DECIMAL, 0);
    pub const DECIMAL_REF: u8 = variant(kind::DECIMAL, 1);
    pub const NULL_DECIMAL: u8 = variant(kind::DECIMAL, NULL_VARIANT);

    pub const TIMESTAMP_CP: u8 = variant(kind::TIMESTAMP, 0);
    pub const SHORT_TIMESTAMP_REF: u8 = variant(kind::TIMESTAMP, 1);
    pub const TIMESTAMP_REF: u8 = variant(kind::TIMESTAMP, 2);
    pub const NULL_TIMESTAMP: u8 = variant(kind::TIMESTAMP, NULL_VARIANT);

    pub const STRING_CP: u8 = variant(kind::STRING, 0);
    pub const STRING_REF: u8 = variant(kind::STRING, 1);
    pub const NULL_STRING: u8 = variant(kind::STRING, NULL_VARIANT);

    pub const SYMBOL_CP: u8 = variant(kind::SYMBOL, 0);
    pub const SYMBOL_REF: u8 = variant(kind::SYMBOL, 1);
    pub const SYMBOL_SID: u8 = variant(kind::SYMBOL, 2);
    pub const SYMBOL_CHAR: u8 = variant(kind::SYMBOL, 3);
    pub const NULL_SYMBOL: u8 = variant(kind::SYMBOL, NULL_VARIANT);

    pub const BLOB_CP: u8 = variant(kind::BLOB, 0);
    pub const BLOB_REF: u8 = variant(kind::BLOB, 1);
    pub const NULL_BLOB: u8 = variant(kind::BLOB, NULL_VARIANT);

    pub const CLOB_CP: u8 = variant(kind::CLOB, 0);
    pub const CLOB_REF: u8 = variant(kind::CLOB, 1);
    pub const NULL_CLOB: u8 = variant(kind::CLOB, NULL_VARIANT);

    pub const LIST_START: u8 = variant(kind::LIST, 0);
    pub const NULL_LIST: u8 = variant(kind::LIST, NULL_VARIANT);

    pub const SEXP_START: u8 = variant(kind::SEXP, 0);
    pub const NULL_SEXP: u8 = variant(kind::SEXP, NULL_VARIANT);

    pub const STRUCT_START: u8 = variant(kind::STRUCT, 0);
    pub const NULL_STRUCT: u8 = variant(kind::STRUCT, NULL_VARIANT);

    pub const FIELD_NAME_CP: u8 = variant(kind::FIELD_NAME, 0);
    pub const FIELD_NAME_REF: u8 = variant(kind::FIELD_NAME, 1);
    pub const FIELD_NAME_SID: u8 = variant(kind::FIELD_NAME, 2);

    pub const ANNOTATION_CP: u8 = variant(kind::ANNOTATION, 0);
    pub const ANNOTATION_REF: u8 = variant(kind::ANNOTATION, 1);
    pub const ANNOTATION_SID: u8 = variant(kind::ANNOTATION, 2);

    pub const PLACEHOLDER: u8 = variant(kind::ARGUMENT, 0);
    pub const PLACEHOLDER_OPT: u8 = variant(kind::ARGUMENT, 1);
    pub const PLACEHOLDER_TAGLESS: u8 = variant(kind::ARGUMENT, 2);
    pub const ARGUMENT_NONE: u8 = variant(kind::ARGUMENT, 3);

    pub const IVM: u8 = variant(kind::IVM, 0);

    pub const DIRECTIVE_SET_SYMBOLS: u8 = variant(kind::DIRECTIVE, 0);
    pub const DIRECTIVE_ADD_SYMBOLS: u8 = variant(kind::DIRECTIVE, 1);
    pub const DIRECTIVE_SET_MACROS: u8 = variant(kind::DIRECTIVE, 2);
    pub const DIRECTIVE_ADD_MACROS: u8 = variant(kind::DIRECTIVE, 3);
    pub const DIRECTIVE_USE: u8 = variant(kind::DIRECTIVE, 4);
    pub const DIRECTIVE_MODULE: u8 = variant(kind::DIRECTIVE, 5);
    pub const DIRECTIVE_ENCODING: u8 = variant(kind::DIRECTIVE, 6);

    pub const INVOKE: u8 = variant(kind::INVOKE, 0);

    pub const REFILL: u8 = variant(kind::REFILL, 0);

    pub const END_OF_INPUT: u8 = variant(kind::END, 0);
    pub const END_CONTAINER: u8 = variant(kind::END, 1);
    pub const END_TEMPLATE: u8 = variant(kind::END, 2);

    pub const META_OFFSET: u8 = variant(kind::METADATA, 0);
    pub const META_ROWCOL: u8 = variant(kind::METADATA, 1);
    pub const META_COMMENT: u8 = variant(kind::METADATA, 2);
}

/// Trailing operand word counts.
pub const ZERO_OPERANDS: u8 = 0;
pub const ONE_OPERAND: u8 = 1;
pub const TWO_OPERANDS: u8 = 2;
/// The data field counts trailing bytecode words instead.
pub const VARIABLE_OPERANDS: u8 = 3;

const fn instruction(operation: u8, operands: u8) -> i32 {
    (((operation as u32) << OPERATION_OFFSET) | ((operands as u32) << OPERAND_COUNT_OFFSET)) as i32
}

// Pre-combined instruction words; handlers pack their data field on top.
pub const I_NULL_NULL: i32 = instruction(op::NULL_NULL, ZERO_OPERANDS);
pub const I_BOOL: i32 = instruction(op::BOOL, ZERO_OPERANDS);
pub const I_NULL_BOOL: i32 = instruction(op::NULL_BOOL, ZERO_OPERANDS);
pub const I_INT_I16: i32 = instruction(op::INT_I16, ZERO_OPERANDS);
pub const I_INT_I32: i32 = instruction(op::INT_I32, ONE_OPERAND);
pub const I_INT_I64: i32 = instruction(op::INT_I64, TWO_OPERANDS);
pub const I_INT_CP: i32 = instruction(op::INT_CP, ZERO_OPERANDS);
pub const I_INT_REF: i32 = instruction(op::INT_REF, ONE_OPERAND);
pub const I_NULL_INT: i32 = instruction(op::NULL_INT, ZERO_OPERANDS);
pub const I_FLOAT_F32: i32 = instruction(op::FLOAT_F32, ONE_OPERAND);
pub const I_FLOAT_F64: i32 = instruction(op::FLOAT_F64, TWO_OPERANDS);
pub const I_NULL_FLOAT: i32 = instruction(op::NULL_FLOAT, ZERO_OPERANDS);
pub const I_DECIMAL_CP: i32 = instruction(op::DECIMAL_CP, ZERO_OPERANDS);
pub const I_DECIMAL_REF: i32 = instruction(op::DECIMAL_REF, ONE_OPERAND);
pub const I_NULL_DECIMAL: i32 = instruction(op::NULL_DECIMAL, ZERO_OPERANDS);
pub const I_TIMESTAMP_CP: i32 = instruction(op::TIMESTAMP_CP, ZERO_OPERANDS);
pub const I_SHORT_TIMESTAMP_REF: i32 = instruction(op::SHORT_TIMESTAMP_REF, ONE_OPERAND);
pub const I_TIMESTAMP_REF: i32 = instruction(op::TIMESTAMP_REF, ONE_OPERAND);
pub const I_NULL_TIMESTAMP: i32 = instruction(op::NULL_TIMESTAMP, ZERO_OPERANDS);
pub const I_STRING_CP: i32 = instruction(op::STRING_CP, ZERO_OPERANDS);
pub const I_STRING_REF: i32 = instruction(op::STRING_REF, ONE_OPERAND);
pub const I_NULL_STRING: i32 = instruction(op::NULL_STRING, ZERO_OPERANDS);
pub const I_SYMBOL_CP: i32 = instruction(op::SYMBOL_CP, ZERO_OPERANDS);
pub const I_SYMBOL_REF: i32 = instruction(op::SYMBOL_REF, ONE_OPERAND);
pub const I_SYMBOL_SID: i32 = instruction(op::SYMBOL_SID, ZERO_OPERANDS);
pub const I_SYMBOL_CHAR: i32 = instruction(op::SYMBOL_CHAR, ZERO_OPERANDS);
pub const I_NULL_SYMBOL: i32 = instruction(op::NULL_SYMBOL, ZERO_OPERANDS);
pub const I_BLOB_CP: i32 = instruction(op::BLOB_CP, ZERO_OPERANDS);
pub const I_BLOB_REF: i32 = instruction(op::BLOB_REF, ONE_OPERAND);
pub const I_NULL_BLOB: i32 = instruction(op::NULL_BLOB, ZERO_OPERANDS);
pub const I_CLOB_CP: i32 = instruction(op::CLOB_CP, ZERO_OPERANDS);
pub const I_CLOB_REF: i32 = instruction(op::CLOB_REF, ONE_OPERAND);
pub const I_NULL_CLOB: i32 = instruction(op::NULL_CLOB, ZERO_OPERANDS);
pub const I_LIST_START: i32 = instruction(op::LIST_START, VARIABLE_OPERANDS);
pub const I_NULL_LIST: i32 = instruction(op::NULL_LIST, ZERO_OPERANDS);
pub const I_SEXP_START: i32 = instruction(op::SEXP_START, VARIABLE_OPERANDS);
pub const I_NULL_SEXP: i32 = instruction(op::NULL_SEXP, ZERO_OPERANDS);
pub const I_STRUCT_START: i32 = instruction(op::STRUCT_START, VARIABLE_OPERANDS);
pub const I_NULL_STRUCT: i32 = instruction(op::NULL_STRUCT, ZERO_OPERANDS);
pub const I_FIELD_NAME_CP: i32 = instruction(op::FIELD_NAME_CP, ZERO_OPERANDS);
pub const I_FIELD_NAME_REF: i32 = instruction(op::FIELD_NAME_REF, ONE_OPERAND);
pub const I_FIELD_NAME_SID: i32 = instruction(op::FIELD_NAME_SID, ZERO_OPERANDS);
pub const I_ANNOTATION_CP: i32 = instruction(op::ANNOTATION_CP, ZERO_OPERANDS);
pub const I_ANNOTATION_REF: i32 = instruction(op::ANNOTATION_REF, ONE_OPERAND);
pub const I_ANNOTATION_SID: i32 = instruction(op::ANNOTATION_SID, ZERO_OPERANDS);
pub const I_PLACEHOLDER: i32 = instruction(op::PLACEHOLDER, ZERO_OPERANDS);
pub const I_PLACEHOLDER_OPT: i32 = instruction(op::PLACEHOLDER_OPT, VARIABLE_OPERANDS);
pub const I_PLACEHOLDER_TAGLESS: i32 = instruction(op::PLACEHOLDER_TAGLESS, ZERO_OPERANDS);
pub const I_ARGUMENT_NONE: i32 = instruction(op::ARGUMENT_NONE, ZERO_OPERANDS);
pub const I_IVM: i32 = instruction(op::IVM, ZERO_OPERANDS);
pub const I_DIRECTIVE_SET_SYMBOLS: i32 = instruction(op::DIRECTIVE_SET_SYMBOLS, ZERO_OPERANDS);
pub const I_DIRECTIVE_ADD_SYMBOLS: i32 = instruction(op::DIRECTIVE_ADD_SYMBOLS, ZERO_OPERANDS);
pub const I_DIRECTIVE_SET_MACROS: i32 = instruction(op::DIRECTIVE_SET_MACROS, ZERO_OPERANDS);
pub const I_DIRECTIVE_ADD_MACROS: i32 = instruction(op::DIRECTIVE_ADD_MACROS, ZERO_OPERANDS);
pub const I_DIRECTIVE_USE: i32 = instruction(op::DIRECTIVE_USE, ZERO_OPERANDS);
pub const I_DIRECTIVE_MODULE: i32 = instruction(op::DIRECTIVE_MODULE, ZERO_OPERANDS);
pub const I_DIRECTIVE_ENCODING: i32 = instruction(op::DIRECTIVE_ENCODING, ZERO_OPERANDS);
pub const I_INVOKE: i32 = instruction(op::INVOKE, ZERO_OPERANDS);
pub const I_REFILL: i32 = instruction(op::REFILL, ZERO_OPERANDS);
pub const I_END_OF_INPUT: i32 = instruction(op::END_OF_INPUT, ZERO_OPERANDS);
pub const I_END_CONTAINER: i32 = instruction(op::END_CONTAINER, ZERO_OPERANDS);
pub const I_END_TEMPLATE: i32 = instruction(op::END_TEMPLATE, ZERO_OPERANDS);
pub const I_META_OFFSET: i32 = instruction(op::META_OFFSET, ONE_OPERAND);
pub const I_META_ROWCOL: i32 = instruction(op::META_ROWCOL, ONE_OPERAND);
pub const I_META_COMMENT: i32 = instruction(op::META_COMMENT, ONE_OPERAND);

/// Extracts the operation byte.
#[inline]
pub fn operation(instruction: i32) -> u8 {
    ((instruction as u32) >> OPERATION_OFFSET) as u8
}

/// The operation kind of an operation byte.
#[inline]
pub fn operation_kind(operation: u8) -> u8 {
    operation >> 3
}

/// The operation kind of a packed instruction.
#[inline]
pub fn kind_of(instruction: i32) -> u8 {
    operation_kind(operation(instruction))
}

/// Number of trailing operand words: 0..=2, or 3 meaning the data field
/// counts trailing bytecode words.
#[inline]
pub fn operand_count_bits(instruction: i32) -> u8 {
    (((instruction as u32) >> OPERAND_COUNT_OFFSET) & 0b11) as u8
}

/// The 22-bit data field, zero-extended.
#[inline]
pub fn data(instruction: i32) -> i32 {
    instruction & DATA_MASK
}

/// The data field truncated to a signed 16-bit immediate.
#[inline]
pub fn data_as_i16(instruction: i32) -> i16 {
    (instruction & DATA_MASK) as u16 as i16
}

/// Replaces the data field of an instruction word.
#[inline]
pub fn pack_data(instruction: i32, data: i32) -> i32 {
    (instruction & !DATA_MASK) | (data & DATA_MASK)
}

/// The typed-null instruction for a value kind.
#[inline]
pub fn typed_null(kind: u8) -> i32 {
    instruction((kind << 3) | NULL_VARIANT, ZERO_OPERANDS)
}

/// True for every null instruction, typed or untyped.
#[inline]
pub fn is_null(instruction: i32) -> bool {
    operation(instruction) & NULL_VARIANT == NULL_VARIANT
}
