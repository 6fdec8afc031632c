//! ion-bytecode
//!
//! A decoder for the binary Ion serialization format that compiles raw
//! octets into a compact internal instruction stream ("bytecode") instead
//! of re-parsing variable-length primitives on every access.
//!
//! The compile pass is a single forward scan: one opcode byte selects a
//! handler from a 256-entry table, the handler decodes at most one value
//! and appends packed 32-bit instruction words, and the driver advances.
//! Small scalars are inlined into the words; variable-length payloads
//! (strings, lobs, big decimals and timestamps) are recorded as
//! `(offset, length)` references into the source buffer and materialized
//! lazily on demand. Values too wide for any inline form land in a side
//! constant pool.
//!
//! ```
//! use ion_bytecode::bin11::{Generator, MacroContext};
//! use ion_bytecode::util::{BytecodeBuffer, ConstantPool};
//! use ion_bytecode::ir;
//!
//! let source = [0x61, 0x97]; // a one-byte integer, -105
//! let mut generator = Generator::new(&source, 0);
//! let mut bytecode = BytecodeBuffer::new();
//! let mut constants = ConstantPool::new();
//! generator
//!     .refill(&mut bytecode, &mut constants, MacroContext::default(), &[])
//!     .unwrap();
//! assert_eq!(ir::data_as_i16(bytecode.get(0)), -105);
//! ```

pub mod bin10;
pub mod bin11;
pub mod error;
pub mod ir;
pub mod util;
pub mod value;

pub use error::{DecodeError, Result};
