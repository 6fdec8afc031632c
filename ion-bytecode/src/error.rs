use thiserror::Error;

/// Errors raised while decoding binary Ion or compiling it into bytecode.
///
/// Decoders never retry or recover internally; every variant carries enough
/// position information for the caller to produce a precise diagnostic. Once
/// a compile pass fails, its output buffers must be discarded.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
    /// Not enough bytes remain in the source buffer for the requested read.
    #[error("incomplete data: start={start}, length={length}, limit={limit}")]
    Truncated {
        start: usize,
        length: usize,
        limit: usize,
    },

    /// Structurally invalid input.
    #[error("malformed encoding at offset {position}: {message}")]
    Malformed { position: usize, message: String },

    /// A decoded value does not fit the numeric width the caller asked for.
    /// The caller may retry through the arbitrary-precision path.
    #[error("{encoding} value too large to fit in {target}")]
    Overflow {
        encoding: &'static str,
        target: &'static str,
    },

    /// A recognized but not-yet-implemented opcode.
    #[error("opcode 0x{opcode:02X} at offset {position} is not supported")]
    Unsupported { opcode: u8, position: usize },
}

impl DecodeError {
    pub(crate) fn malformed(position: usize, message: impl Into<String>) -> Self {
        DecodeError::Malformed {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn overflow(encoding: &'static str, target: &'static str) -> Self {
        DecodeError::Overflow { encoding, target }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Bounds check shared by every fixed-length read in the crate.
#[inline]
pub(crate) fn require(source: &[u8], start: usize, length: usize) -> Result<()> {
    if source.len() < start + length {
        return Err(DecodeError::Truncated {
            start,
            length,
            limit: source.len(),
        });
    }
    Ok(())
}
