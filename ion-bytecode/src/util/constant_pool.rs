use num_bigint::BigInt;

use crate::value::{Decimal, Timestamp};

/// A value that was too wide or too structured to inline into an instruction
/// word, boxed into the side pool and referenced by index.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolValue {
    Int(BigInt),
    Decimal(Decimal),
    Timestamp(Timestamp),
    Text(String),
    Bytes(Vec<u8>),
}

impl PoolValue {
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            PoolValue::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            PoolValue::Decimal(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            PoolValue::Timestamp(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PoolValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PoolValue::Bytes(value) => Some(value),
            _ => None,
        }
    }
}

/// Side table of boxed values referenced by `*_CP` instructions.
///
/// Indices are assigned monotonically during one compile pass and stay
/// stable for the lifetime of the produced bytecode. A reader that reuses
/// the pool across refills truncates back to its first local constant
/// instead of clearing, so retained indices keep resolving.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    values: Vec<PoolValue>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends a value and returns its index.
    pub fn add(&mut self, value: PoolValue) -> usize {
        let index = self.values.len();
        self.values.push(value);
        index
    }

    /// Returns the value at `index`. Panics on an out-of-range index; a
    /// dangling pool reference in bytecode is a compiler bug.
    pub fn get(&self, index: usize) -> &PoolValue {
        match self.values.get(index) {
            Some(value) => value,
            None => panic!(
                "invalid index {index} requested from ConstantPool with {} values",
                self.values.len()
            ),
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Shrinks back to `len` entries. Panics if `len` exceeds the current
    /// length.
    pub fn truncate(&mut self, len: usize) {
        assert!(
            len <= self.values.len(),
            "truncate length {len} exceeds {} values",
            self.values.len()
        );
        self.values.truncate(len);
    }
}
