//! The binary Ion 1.1 compile path: opcode dispatch and the bytecode
//! generator.
//!
//! The generator owns a cursor over a borrowed source buffer and walks it
//! one encoded value at a time: read the opcode byte, look up its handler
//! in a 256-entry table, let the handler append instructions, and advance
//! by `1 + extraBytesConsumed`. Reference instructions record coordinates
//! into the source buffer instead of copying payloads, so the produced
//! bytecode borrows the buffer's lifetime through [`Generator`]'s lazy
//! materialization methods.

mod handlers;
pub mod primitive;
pub mod tagless;

pub mod float;
pub mod timestamp;

use num_bigint::BigInt;
use once_cell::sync::Lazy;

use crate::bin10;
use crate::error::{require, DecodeError, Result};
use crate::ir;
use crate::util::{ByteSlice, BytecodeBuffer, ConstantPool};
use crate::value::{Decimal, Timestamp};

use handlers::OpcodeHandler;

/// Opcode bytes of the binary encoding, plus the symbol address biases.
pub mod opcode {
    /// `0x60 + n` encodes a FixedInt of n bytes, 0 being the literal zero.
    pub const INTEGER_ZERO: u8 = 0x60;
    pub const FLOAT_ZERO: u8 = 0x6A;
    pub const FLOAT_16: u8 = 0x6B;
    pub const FLOAT_32: u8 = 0x6C;
    pub const FLOAT_64: u8 = 0x6D;
    pub const BOOLEAN_TRUE: u8 = 0x6E;
    pub const BOOLEAN_FALSE: u8 = 0x6F;
    /// `0x80 + mode` for the 13 short timestamp precision/offset modes.
    pub const SHORT_TIMESTAMP_BASE: u8 = 0x80;
    pub const NULL: u8 = 0x8E;
    pub const TYPED_NULL: u8 = 0x8F;
    pub const ANNOTATION_TEXT: u8 = 0x59;
    pub const VERSION_MARKER: u8 = 0xE0;
    pub const SYMBOL_ADDRESS_1_BYTE: u8 = 0xE1;
    pub const SYMBOL_ADDRESS_2_BYTES: u8 = 0xE2;
    pub const SYMBOL_ADDRESS_FLEX: u8 = 0xE3;
    pub const VARIABLE_LENGTH_INT: u8 = 0xF5;
    pub const VARIABLE_LENGTH_DECIMAL: u8 = 0xF6;
    pub const VARIABLE_LENGTH_TIMESTAMP: u8 = 0xF7;
    pub const VARIABLE_LENGTH_STRING: u8 = 0xF8;
    pub const VARIABLE_LENGTH_SYMBOL: u8 = 0xF9;
    pub const VARIABLE_LENGTH_BLOB: u8 = 0xFE;
    pub const VARIABLE_LENGTH_CLOB: u8 = 0xFF;

    /// Two-byte symbol addresses start where one-byte addresses end.
    pub const FIRST_2_BYTE_SYMBOL_ADDRESS: u64 = 256;
    /// FlexUInt symbol addresses start where two-byte addresses end.
    pub const FIRST_MANY_BYTE_SYMBOL_ADDRESS: u64 = 65792;
}

/// The compiled macro table a compile pass can resolve invocations
/// against. Template compilation happens elsewhere; the compile pass only
/// carries the table through to handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroContext<'a> {
    /// Bytecode of every compiled template body, concatenated.
    pub bytecode: &'a [i32],
    /// Start index of each template body in `bytecode`.
    pub offsets: &'a [i32],
}

/// Everything a handler may write to or consult while compiling one value.
pub struct CompileContext<'out, 'data> {
    pub bytecode: &'out mut BytecodeBuffer,
    pub constants: &'out mut ConstantPool,
    pub macros: MacroContext<'data>,
    pub symbols: &'data [Option<&'data str>],
}

/// Opcode dispatch table, built once and shared read-only across threads.
static HANDLER_TABLE: Lazy<[OpcodeHandler; 256]> = Lazy::new(|| {
    let mut table: [OpcodeHandler; 256] = [handlers::unsupported; 256];
    for width in 0..=8u8 {
        table[(opcode::INTEGER_ZERO + width) as usize] = handlers::fixed_int;
    }
    table[opcode::FLOAT_ZERO as usize] = handlers::float_zero;
    table[opcode::FLOAT_16 as usize] = handlers::float_half;
    table[opcode::FLOAT_32 as usize] = handlers::float_single;
    table[opcode::FLOAT_64 as usize] = handlers::float_double;
    table[opcode::BOOLEAN_TRUE as usize] = handlers::boolean;
    table[opcode::BOOLEAN_FALSE as usize] = handlers::boolean;
    for mode in 0..=0x0Cu8 {
        table[(opcode::SHORT_TIMESTAMP_BASE + mode) as usize] = handlers::short_timestamp;
    }
    table[opcode::NULL as usize] = handlers::untyped_null;
    table[opcode::TYPED_NULL as usize] = handlers::typed_null;
    table[opcode::ANNOTATION_TEXT as usize] = handlers::reference;
    table[opcode::VERSION_MARKER as usize] = handlers::version_marker;
    table[opcode::SYMBOL_ADDRESS_1_BYTE as usize] = handlers::symbol_address;
    table[opcode::SYMBOL_ADDRESS_2_BYTES as usize] = handlers::symbol_address;
    table[opcode::SYMBOL_ADDRESS_FLEX as usize] = handlers::symbol_address;
    for reference_opcode in [
        opcode::VARIABLE_LENGTH_INT,
        opcode::VARIABLE_LENGTH_DECIMAL,
        opcode::VARIABLE_LENGTH_TIMESTAMP,
        opcode::VARIABLE_LENGTH_STRING,
        opcode::VARIABLE_LENGTH_SYMBOL,
        opcode::VARIABLE_LENGTH_BLOB,
        opcode::VARIABLE_LENGTH_CLOB,
    ] {
        table[reference_opcode as usize] = handlers::reference;
    }
    table
});

/// The compile driver: owns a cursor over a borrowed source buffer,
/// dispatches each opcode through the handler table, and serves the lazy
/// half of the reference contract.
///
/// Bytecode produced by [`refill`](Self::refill) holds `(offset, length)`
/// coordinates into the borrowed buffer; the generator's lifetime parameter
/// is what guarantees those references cannot outlive the buffer.
pub struct Generator<'a> {
    source: &'a [u8],
    position: usize,
}

impl<'a> Generator<'a> {
    pub fn new(source: &'a [u8], position: usize) -> Self {
        Self { source, position }
    }

    /// The cursor's current byte offset.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Compiles values from the cursor until the input is exhausted, then
    /// appends `end_of_input`. On error the cursor and output buffers are
    /// left mid-value and must not be reused.
    pub fn refill(
        &mut self,
        bytecode: &mut BytecodeBuffer,
        constants: &mut ConstantPool,
        macros: MacroContext<'_>,
        symbols: &[Option<&str>],
    ) -> Result<()> {
        let start = self.position;
        let mut ctx = CompileContext {
            bytecode,
            constants,
            macros,
            symbols,
        };
        while self.position < self.source.len() {
            let opcode = self.source[self.position];
            let handler = HANDLER_TABLE[opcode as usize];
            let consumed = handler(opcode, self.source, self.position + 1, &mut ctx)?;
            self.position += 1 + consumed;
        }
        ctx.bytecode.add(ir::I_END_OF_INPUT);
        log::trace!(
            "compiled {} source bytes into {} instruction words",
            self.position - start,
            ctx.bytecode.len()
        );
        Ok(())
    }

    /// Materializes the UTF-8 text a reference instruction points at.
    pub fn read_text_reference(&self, position: u32, length: u32) -> Result<&'a str> {
        let start = position as usize;
        let length = length as usize;
        require(self.source, start, length)?;
        std::str::from_utf8(&self.source[start..start + length])
            .map_err(|error| DecodeError::malformed(start, format!("invalid UTF-8: {error}")))
    }

    /// Returns the raw bytes a blob/clob reference points at, without
    /// copying them.
    pub fn read_bytes_reference(&self, position: u32, length: u32) -> Result<ByteSlice<'a>> {
        let start = position as usize;
        let length = length as usize;
        require(self.source, start, length)?;
        Ok(ByteSlice::new(self.source, start, start + length))
    }

    /// Decodes the short-form timestamp a reference instruction points at;
    /// `mode` is the precision/offset nibble stored in the instruction's
    /// data field.
    pub fn read_short_timestamp_reference(&self, position: u32, mode: u8) -> Result<Timestamp> {
        timestamp::read_timestamp(self.source, position as usize, mode)
    }

    /// Decodes the variable-length timestamp a reference instruction
    /// points at.
    pub fn read_timestamp_reference(&self, position: u32, length: u32) -> Result<Timestamp> {
        let start = position as usize;
        require(self.source, start, length as usize)?;
        bin10::read_timestamp(self.source, start, start + length as usize)
    }

    /// Materializes the integer a variable-length int reference points at.
    pub fn read_big_integer_reference(&self, position: u32, length: u32) -> Result<BigInt> {
        primitive::read_fixed_int_as_big(self.source, position as usize, length as usize)
    }

    /// Materializes the decimal a reference instruction points at.
    pub fn read_decimal_reference(&self, position: u32, length: u32) -> Result<Decimal> {
        let start = position as usize;
        require(self.source, start, length as usize)?;
        bin10::read_decimal(self.source, start, start + length as usize)
    }
}
