use super::op;

/// How the 22-bit data field of an instruction should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    None,
    /// Constant pool index.
    CpIndex,
    /// Symbol ID.
    Sid,
    /// Sign-extended 16-bit integer immediate.
    I16,
    /// Single character code point.
    Char,
    /// 1 = true, 0 = false.
    Boolean,
    /// Number of trailing bytecode words.
    BytecodeLength,
    /// Byte length of a referenced payload.
    RefLength,
    /// A raw opcode byte (short timestamp mode and tagless shapes).
    Opcode,
    /// Macro table index.
    MacroId,
    /// Ion version, major in the high byte, minor in the low byte.
    Ivm,
}

/// Shape of an instruction's trailing operand words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandFormat {
    None,
    I32,
    /// Two words, most significant first.
    I64,
    F32,
    /// Two words, most significant first.
    F64,
    /// Absolute offset into the source buffer.
    Offset,
    Row,
}

/// Static metadata for one operation: mnemonic plus data/operand formats.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub name: &'static str,
    pub data: DataFormat,
    pub operands: OperandFormat,
}

const fn info(name: &'static str, data: DataFormat, operands: OperandFormat) -> OpInfo {
    OpInfo {
        name,
        data,
        operands,
    }
}

/// Looks up the metadata for an operation byte.
pub fn describe(operation: u8) -> Option<OpInfo> {
    use DataFormat as D;
    use OperandFormat as O;
    let described = match operation {
        op::NULL_NULL => info("null_null", D::None, O::None),
        op::BOOL => info("bool", D::Boolean, O::None),
        op::NULL_BOOL => info("null_bool", D::None, O::None),
        op::INT_I16 => info("int_i16", D::I16, O::None),
        op::INT_I32 => info("int_i32", D::None, O::I32),
        op::INT_I64 => info("int_i64", D::None, O::I64),
        op::INT_CP => info("int_cp", D::CpIndex, O::None),
        op::INT_REF => info("int_ref", D::RefLength, O::Offset),
        op::NULL_INT => info("null_int", D::None, O::None),
        op::FLOAT_F32 => info("float_f32", D::None, O::F32),
        op::FLOAT_F64 => info("float_f64", D::None, O::F64),
        op::NULL_FLOAT => info("null_float", D::None, O::None),
        op::DECIMAL_CP => info("decimal_cp", D::CpIndex, O::None),
        op::DECIMAL_REF => info("decimal_ref", D::RefLength, O::Offset),
        op::NULL_DECIMAL => info("null_decimal", D::None, O::None),
        op::TIMESTAMP_CP => info("timestamp_cp", D::CpIndex, O::None),
        op::SHORT_TIMESTAMP_REF => info("short_timestamp_ref", D::Opcode, O::Offset),
        op::TIMESTAMP_REF => info("timestamp_ref", D::RefLength, O::Offset),
        op::NULL_TIMESTAMP => info("null_timestamp", D::None, O::None),
        op::STRING_CP => info("string_cp", D::CpIndex, O::None),
        op::STRING_REF => info("string_ref", D::RefLength, O::Offset),
        op::NULL_STRING => info("null_string", D::None, O::None),
        op::SYMBOL_CP => info("symbol_cp", D::CpIndex, O::None),
        op::SYMBOL_REF => info("symbol_ref", D::RefLength, O::Offset),
        op::SYMBOL_SID => info("symbol_sid", D::Sid, O::None),
        op::SYMBOL_CHAR => info("symbol_char", D::Char, O::None),
        op::NULL_SYMBOL => info("null_symbol", D::None, O::None),
        op::BLOB_CP => info("blob_cp", D::CpIndex, O::None),
        op::BLOB_REF => info("blob_ref", D::RefLength, O::Offset),
        op::NULL_BLOB => info("null_blob", D::None, O::None),
        op::CLOB_CP => info("clob_cp", D::CpIndex, O::None),
        op::CLOB_REF => info("clob_ref", D::RefLength, O::Offset),
        op::NULL_CLOB => info("null_clob", D::None, O::None),
        op::LIST_START => info("list_start", D::BytecodeLength, O::None),
        op::NULL_LIST => info("null_list", D::None, O::None),
        op::SEXP_START => info("sexp_start", D::BytecodeLength, O::None),
        op::NULL_SEXP => info("null_sexp", D::None, O::None),
        op::STRUCT_START => info("struct_start", D::BytecodeLength, O::None),
        op::NULL_STRUCT => info("null_struct", D::None, O::None),
        op::FIELD_NAME_CP => info("field_name_cp", D::CpIndex, O::None),
        op::FIELD_NAME_REF => info("field_name_ref", D::RefLength, O::Offset),
        op::FIELD_NAME_SID => info("field_name_sid", D::Sid, O::None),
        op::ANNOTATION_CP => info("annotation_cp", D::CpIndex, O::None),
        op::ANNOTATION_REF => info("annotation_ref", D::RefLength, O::Offset),
        op::ANNOTATION_SID => info("annotation_sid", D::Sid, O::None),
        op::PLACEHOLDER => info("placeholder", D::None, O::None),
        op::PLACEHOLDER_OPT => info("placeholder_opt", D::BytecodeLength, O::None),
        op::PLACEHOLDER_TAGLESS => info("placeholder_tagless", D::Opcode, O::None),
        op::ARGUMENT_NONE => info("argument_none", D::None, O::None),
        op::IVM => info("ivm", D::Ivm, O::None),
        op::DIRECTIVE_SET_SYMBOLS => info("directive_set_symbols", D::None, O::None),
        op::DIRECTIVE_ADD_SYMBOLS => info("directive_add_symbols", D::None, O::None),
        op::DIRECTIVE_SET_MACROS => info("directive_set_macros", D::None, O::None),
        op::DIRECTIVE_ADD_MACROS => info("directive_add_macros", D::None, O::None),
        op::DIRECTIVE_USE => info("directive_use", D::None, O::None),
        op::DIRECTIVE_MODULE => info("directive_module", D::None, O::None),
        op::DIRECTIVE_ENCODING => info("directive_encoding", D::None, O::None),
        op::INVOKE => info("invoke", D::MacroId, O::None),
        op::REFILL => info("refill", D::None, O::None),
        op::END_OF_INPUT => info("end_of_input", D::None, O::None),
        op::END_CONTAINER => info("end_container", D::None, O::None),
        op::END_TEMPLATE => info("end_template", D::None, O::None),
        op::META_OFFSET => info("meta_offset", D::None, O::Offset),
        op::META_ROWCOL => info("meta_rowcol", D::None, O::Row),
        op::META_COMMENT => info("meta_comment", D::RefLength, O::Offset),
        _ => return None,
    };
    Some(described)
}
