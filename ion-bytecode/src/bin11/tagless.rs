//! Tagless unsigned-integer decoding.
//!
//! Inside an already-typed context (a macro argument slot whose shape is
//! declared by the signature) values appear without an opcode byte. These
//! handlers share the table handlers' contract of decoding at `position`,
//! emitting, and returning bytes consumed, but are invoked directly by the
//! caller that knows the declared shape.

use num_bigint::BigInt;

use crate::bin11::{primitive, CompileContext};
use crate::error::{DecodeError, Result};
use crate::ir;
use crate::util::PoolValue;

/// Emits the narrowest integer instruction that holds `value`; values
/// beyond i64 range are boxed into the constant pool.
fn emit_unsigned(value: u64, ctx: &mut CompileContext<'_, '_>) {
    if value <= i16::MAX as u64 {
        ctx.bytecode.add(ir::pack_data(ir::I_INT_I16, value as i32));
    } else if value <= i32::MAX as u64 {
        ctx.bytecode.add2(ir::I_INT_I32, value as i32);
    } else if value <= i64::MAX as u64 {
        ctx.bytecode
            .add3(ir::I_INT_I64, (value >> 32) as i32, value as i32);
    } else {
        let index = ctx.constants.add(PoolValue::Int(BigInt::from(value)));
        ctx.bytecode.add(ir::pack_data(ir::I_INT_CP, index as i32));
    }
}

/// A tagless FlexUInt of any size.
pub fn flex_uint(
    source: &[u8],
    position: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    match primitive::read_flex_uint_as_u64(source, position) {
        Ok((value, length)) => {
            emit_unsigned(value, ctx);
            Ok(length)
        }
        Err(DecodeError::Overflow { .. }) => {
            let length = primitive::flex_len_at(source, position)?;
            let value = primitive::read_flex_uint_as_big(source, position)?;
            let index = ctx.constants.add(PoolValue::Int(value));
            ctx.bytecode.add(ir::pack_data(ir::I_INT_CP, index as i32));
            Ok(length)
        }
        Err(error) => Err(error),
    }
}

fn fixed_uint(
    source: &[u8],
    position: usize,
    width: usize,
    ctx: &mut CompileContext<'_, '_>,
) -> Result<usize> {
    let value = primitive::read_fixed_uint_as_u64(source, position, width)?;
    emit_unsigned(value, ctx);
    Ok(width)
}

/// A tagless 8-bit FixedUInt.
pub fn fixed_uint8(source: &[u8], position: usize, ctx: &mut CompileContext<'_, '_>) -> Result<usize> {
    fixed_uint(source, position, 1, ctx)
}

/// A tagless 16-bit FixedUInt.
pub fn fixed_uint16(source: &[u8], position: usize, ctx: &mut CompileContext<'_, '_>) -> Result<usize> {
    fixed_uint(source, position, 2, ctx)
}

/// A tagless 32-bit FixedUInt.
pub fn fixed_uint32(source: &[u8], position: usize, ctx: &mut CompileContext<'_, '_>) -> Result<usize> {
    fixed_uint(source, position, 4, ctx)
}

/// A tagless 64-bit FixedUInt.
pub fn fixed_uint64(source: &[u8], position: usize, ctx: &mut CompileContext<'_, '_>) -> Result<usize> {
    fixed_uint(source, position, 8, ctx)
}
