//! The legacy binary format's decoding path.
//!
//! This sibling subsystem predates the bytecode compiler: values are
//! materialized directly rather than compiled into instructions, and its
//! variable-width integers use a different continuation convention than
//! the current format's (see [`primitive`]). The compile path reaches into
//! it for variable-length decimal and timestamp payloads, which still use
//! these field encodings.

pub mod primitive;
mod timestamp;

pub use primitive::{read_var_int, read_var_uint, VAR_INT_NEGATIVE_ZERO};
pub use timestamp::{read_decimal, read_timestamp};
