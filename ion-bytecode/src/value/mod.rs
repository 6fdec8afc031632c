//! Decoded scalar value types. These are immutable values with no identity;
//! equality is by value, with negative-zero decimals and timestamp precision
//! kept distinguishable.

mod decimal;
mod timestamp;

pub use decimal::Decimal;
pub use timestamp::{InvalidTimestamp, Precision, Timestamp, EPOCH_YEAR};
