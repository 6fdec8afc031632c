//! Per-opcode handlers.
//!
//! Every handler has the same shape: it receives the opcode byte, the
//! source buffer, the position of the first byte *after* the opcode, and
//! the compile context, and returns how many bytes beyond the opcode it
//! consumed. Handlers whose payload is entirely inside the opcode byte
//! consume zero.

use crate::bin11::{float, opcode, primitive, timestamp, CompileContext};
use crate::error::{require, DecodeError, Result};
use crate::ir;

pub(crate) type OpcodeHandler =
    fn(opcode: u8, source: &[u8], position: usize, ctx: &mut CompileContext<'_, '_>) -> Result<usize>;

/// Default entry for every unmapped opcode.
pub(crate) fn unsupported(
    opcode: u8,
    _source: &[u8],
    position: usize,
    _ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    Err(DecodeError::Unsupported {
        opcode,
        position: position - 1,
    })
}

pub(crate) fn untyped_null(
    _opcode: u8,
    _source: &[u8],
    _position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    ctx.bytecode.add(ir::I_NULL_NULL);
    Ok(0)
}

/// `0x8F tt`: the payload byte names the value kind being nulled.
pub(crate) fn typed_null(
    _opcode: u8,
    source: &[u8],
    position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    require(source, position, 1)?;
    let type_code = source[position];
    if !(ir::kind::BOOL..=ir::kind::STRUCT).contains(&type_code) {
        return Err(DecodeError::malformed(
            position,
            format!("invalid typed null type code 0x{type_code:02X}"),
        ));
    }
    ctx.bytecode.add(ir::typed_null(type_code));
    Ok(1)
}

pub(crate) fn boolean(
    opcode: u8,
    _source: &[u8],
    _position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    let value = (opcode == opcode::BOOLEAN_TRUE) as i32;
    ctx.bytecode.add(ir::pack_data(ir::I_BOOL, value));
    Ok(0)
}

/// `0x60..=0x68`: the low nibble is the FixedInt byte count; the decoded
/// value is emitted at the narrowest width that holds it.
pub(crate) fn fixed_int(
    opcode: u8,
    source: &[u8],
    position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    let length = (opcode & 0x0F) as usize;
    match length {
        0 => ctx.bytecode.add(ir::pack_data(ir::I_INT_I16, 0)),
        1..=2 => {
            let value = primitive::read_fixed_int_as_i16(source, position, length)?;
            ctx.bytecode.add(ir::pack_data(ir::I_INT_I16, value as i32));
        }
        3..=4 => {
            let value = primitive::read_fixed_int_as_i32(source, position, length)?;
            ctx.bytecode.add2(ir::I_INT_I32, value);
        }
        _ => {
            let value = primitive::read_fixed_int_as_i64(source, position, length)?;
            ctx.bytecode
                .add3(ir::I_INT_I64, (value >> 32) as i32, value as i32);
        }
    }
    Ok(length)
}

/// `0x6A`: the zero-length float fast path.
pub(crate) fn float_zero(
    _opcode: u8,
    _source: &[u8],
    _position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    ctx.bytecode.add2(ir::I_FLOAT_F32, 0);
    Ok(0)
}

pub(crate) fn float_half(
    _opcode: u8,
    source: &[u8],
    position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    let bits = float::read_half_as_f32_bits(source, position)?;
    ctx.bytecode.add2(ir::I_FLOAT_F32, bits as i32);
    Ok(2)
}

pub(crate) fn float_single(
    _opcode: u8,
    source: &[u8],
    position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    let bits = float::read_f32_bits(source, position)?;
    ctx.bytecode.add2(ir::I_FLOAT_F32, bits as i32);
    Ok(4)
}

pub(crate) fn float_double(
    _opcode: u8,
    source: &[u8],
    position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    let bits = float::read_f64_bits(source, position)?;
    ctx.bytecode
        .add3(ir::I_FLOAT_F64, (bits >> 32) as i32, bits as i32);
    Ok(8)
}

/// `0x80..=0x8C`: the payload width is implied by the mode nibble and the
/// value is decoded lazily; only a reference to it is emitted here.
pub(crate) fn short_timestamp(
    opcode: u8,
    source: &[u8],
    position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    let mode = opcode & 0x0F;
    let width = timestamp::encoded_width(mode).expect("mode nibble bounded by table registration");
    require(source, position, width)?;
    ctx.bytecode.add2(
        ir::pack_data(ir::I_SHORT_TIMESTAMP_REF, mode as i32),
        position as i32,
    );
    Ok(width)
}

/// All length-prefixed reference opcodes: a FlexUInt payload length, then
/// the payload itself, which is *not* copied; the emitted instruction
/// records `(length, absolute payload offset)`.
pub(crate) fn reference(
    opcode: u8,
    source: &[u8],
    position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    let instruction = match opcode {
        opcode::ANNOTATION_TEXT => ir::I_ANNOTATION_REF,
        opcode::VARIABLE_LENGTH_INT => ir::I_INT_REF,
        opcode::VARIABLE_LENGTH_DECIMAL => ir::I_DECIMAL_REF,
        opcode::VARIABLE_LENGTH_TIMESTAMP => ir::I_TIMESTAMP_REF,
        opcode::VARIABLE_LENGTH_STRING => ir::I_STRING_REF,
        opcode::VARIABLE_LENGTH_SYMBOL => ir::I_SYMBOL_REF,
        opcode::VARIABLE_LENGTH_BLOB => ir::I_BLOB_REF,
        opcode::VARIABLE_LENGTH_CLOB => ir::I_CLOB_REF,
        _ => unreachable!("reference handler registered for a non-reference opcode"),
    };
    let (length, prefix_length) = primitive::read_flex_uint(source, position)?;
    if length > ir::MAX_REFERENCE_LENGTH {
        return Err(DecodeError::overflow("FlexUInt", "a 22-bit reference length"));
    }
    let payload_position = position + prefix_length;
    require(source, payload_position, length as usize)?;
    ctx.bytecode.add2(
        ir::pack_data(instruction, length as i32),
        payload_position as i32,
    );
    Ok(prefix_length + length as usize)
}

/// `0xE0 mm nn 0xEA`: the Ion version marker.
pub(crate) fn version_marker(
    _opcode: u8,
    source: &[u8],
    position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    require(source, position, 3)?;
    let major = source[position] as i32;
    let minor = source[position + 1] as i32;
    if source[position + 2] != 0xEA {
        return Err(DecodeError::malformed(
            position - 1,
            "version marker does not end with 0xEA",
        ));
    }
    ctx.bytecode
        .add(ir::pack_data(ir::I_IVM, (major << 8) | minor));
    Ok(3)
}

/// `0xE1`/`0xE2`/`0xE3`: symbol addresses at increasing widths, each
/// biased past the previous width's range.
pub(crate) fn symbol_address(
    opcode: u8,
    source: &[u8],
    position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    let (sid, consumed) = match opcode {
        opcode::SYMBOL_ADDRESS_1_BYTE => {
            (primitive::read_fixed_uint_as_u64(source, position, 1)?, 1)
        }
        opcode::SYMBOL_ADDRESS_2_BYTES => {
            let raw = primitive::read_fixed_uint_as_u64(source, position, 2)?;
            (raw + opcode::FIRST_2_BYTE_SYMBOL_ADDRESS, 2)
        }
        opcode::SYMBOL_ADDRESS_FLEX => {
            let (raw, prefix) = primitive::read_flex_uint(source, position)?;
            (raw as u64 + opcode::FIRST_MANY_BYTE_SYMBOL_ADDRESS, prefix)
        }
        _ => unreachable!("symbol address handler registered for a non-address opcode"),
    };
    if sid > ir::DATA_MASK as u64 {
        return Err(DecodeError::overflow("FixedUInt", "a symbol address"));
    }
    ctx.bytecode.add(ir::pack_data(ir::I_SYMBOL_SID, sid as i32));
    Ok(consumed)
}
