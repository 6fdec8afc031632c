use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

/// An arbitrary-precision decimal: `coefficient * 10^(-scale)`.
///
/// Unlike a plain big-decimal, this type can represent a negative zero,
/// because the wire format encodes the coefficient as sign-and-magnitude and
/// `0d0` and `-0d0` are distinct values. Equality is exact over
/// (coefficient, scale, sign-of-zero); `0.4` and `0.40` are different
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    coefficient: BigInt,
    scale: i32,
    negative_zero: bool,
}

impl Decimal {
    pub fn new(coefficient: BigInt, scale: i32) -> Self {
        Self {
            coefficient,
            scale,
            negative_zero: false,
        }
    }

    pub fn negative_zero(scale: i32) -> Self {
        Self {
            coefficient: BigInt::zero(),
            scale,
            negative_zero: true,
        }
    }

    pub fn from_i64(coefficient: i64, scale: i32) -> Self {
        Self::new(BigInt::from(coefficient), scale)
    }

    #[inline]
    pub fn coefficient(&self) -> &BigInt {
        &self.coefficient
    }

    /// Digits after the decimal point; the exponent is `-scale`.
    #[inline]
    pub fn scale(&self) -> i32 {
        self.scale
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    #[inline]
    pub fn is_negative_zero(&self) -> bool {
        self.negative_zero
    }

    pub fn is_negative(&self) -> bool {
        self.negative_zero || self.coefficient.is_negative()
    }

    /// Re-expresses a negative-scale (i.e. positive-exponent) value at scale
    /// 0 by multiplying the trailing zeros into the coefficient. Values with
    /// scale >= 0 are returned unchanged.
    pub fn with_scale_at_least_zero(self) -> Self {
        if self.scale >= 0 {
            return self;
        }
        let shifted = &self.coefficient * BigInt::from(10u32).pow(-self.scale as u32);
        Self {
            coefficient: shifted,
            scale: 0,
            negative_zero: self.negative_zero,
        }
    }

    /// The coefficient as u64, if the value is a non-negative integer-scaled
    /// fraction coefficient that fits. Used by timestamp rendering.
    pub(crate) fn coefficient_u64(&self) -> Option<u64> {
        self.coefficient.to_u64()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.is_negative();
        let digits = self.coefficient.magnitude().to_string();
        if negative {
            write!(f, "-")?;
        }
        if self.scale <= 0 {
            write!(f, "{digits}")?;
            if self.scale < 0 {
                write!(f, "d{}", -self.scale)?;
            }
            return Ok(());
        }
        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{frac_part}")
        } else {
            write!(f, "0.{digits:0>scale$}")
        }
    }
}
