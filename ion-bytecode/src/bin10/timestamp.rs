//! Legacy decimal and timestamp materialization.
//!
//! Both are bounded by a declared `[start, end)` region of the source
//! buffer. A decimal is a VarInt exponent followed by a sign/magnitude
//! coefficient filling the rest of the region; a timestamp is a VarInt
//! offset followed by VarUInt calendar fields, with precision implied by
//! how many fields are present before the region ends.

use num_bigint::{BigInt, Sign};
use num_traits::Zero;

use super::primitive::{read_var_int, read_var_uint, VAR_INT_NEGATIVE_ZERO};
use crate::error::{require, DecodeError, Result};
use crate::value::{Decimal, Precision, Timestamp};

const COEFFICIENT_SIGN_BIT: u8 = 0x80;

/// Reconstructs the sign/magnitude coefficient occupying
/// `[position, end)`. Returns the signed value plus whether a negative
/// sign was paired with a zero magnitude.
fn read_coefficient(source: &[u8], position: usize, end: usize) -> (BigInt, bool) {
    if position >= end {
        return (BigInt::zero(), false);
    }
    let negative = source[position] & COEFFICIENT_SIGN_BIT != 0;
    let mut magnitude_bytes = source[position..end].to_vec();
    magnitude_bytes[0] &= !COEFFICIENT_SIGN_BIT;
    let magnitude = BigInt::from_bytes_be(Sign::Plus, &magnitude_bytes);
    if magnitude.is_zero() {
        return (magnitude, negative);
    }
    if negative {
        (-magnitude, false)
    } else {
        (magnitude, false)
    }
}

/// Decodes the decimal occupying `[start, end)`. A zero magnitude with a
/// negative sign produces a distinguishable negative-zero decimal.
pub fn read_decimal(source: &[u8], start: usize, end: usize) -> Result<Decimal> {
    require(source, start, end - start)?;
    let mut position = start;
    let scale = if position < end {
        -read_var_int(source, &mut position, end)?
    } else {
        0
    };
    let (coefficient, negative_zero) = read_coefficient(source, position, end);
    if negative_zero {
        Ok(Decimal::negative_zero(scale))
    } else {
        Ok(Decimal::new(coefficient, scale))
    }
}

/// Like [`read_decimal`] but for a timestamp's fractional seconds, where a
/// negatively-signed zero coefficient is just zero.
fn read_fraction(source: &[u8], start: usize, end: usize) -> Result<Decimal> {
    let mut position = start;
    let scale = -read_var_int(source, &mut position, end)?;
    let (coefficient, _) = read_coefficient(source, position, end);
    Ok(Decimal::new(coefficient, scale))
}

fn field_as_u8(value: u32, position: usize, what: &str) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| DecodeError::malformed(position, format!("{what} {value} is out of range")))
}

/// Decodes the timestamp occupying `[start, end)`.
///
/// The encoding stores UTC fields; the result re-expresses them in the
/// local time of the decoded offset. Missing trailing fields reduce the
/// declared precision; an hour with no minute is malformed.
pub fn read_timestamp(source: &[u8], start: usize, end: usize) -> Result<Timestamp> {
    require(source, start, end - start)?;
    let mut position = start;

    require(source, position, 1)?;
    let offset = if source[position] == VAR_INT_NEGATIVE_ZERO {
        position += 1;
        None
    } else {
        Some(read_var_int(source, &mut position, end)?)
    };

    let year = read_var_uint(source, &mut position, end)?;
    let mut month = 1u8;
    let mut day = 1u8;
    let mut hour = 0u8;
    let mut minute = 0u8;
    let mut second = 0u8;
    let mut fraction = None;
    let mut precision = Precision::Year;

    if position < end {
        month = field_as_u8(read_var_uint(source, &mut position, end)?, position, "month")?;
        precision = Precision::Month;
        if position < end {
            day = field_as_u8(read_var_uint(source, &mut position, end)?, position, "day")?;
            precision = Precision::Day;
            if position < end {
                hour = field_as_u8(read_var_uint(source, &mut position, end)?, position, "hour")?;
                if position >= end {
                    return Err(DecodeError::malformed(
                        position,
                        "timestamps may not specify hour without specifying minute",
                    ));
                }
                minute =
                    field_as_u8(read_var_uint(source, &mut position, end)?, position, "minute")?;
                precision = Precision::Minute;
                if position < end {
                    second = field_as_u8(
                        read_var_uint(source, &mut position, end)?,
                        position,
                        "second",
                    )?;
                    precision = Precision::Second;
                    if position < end {
                        fraction = Some(read_fraction(source, position, end)?);
                    }
                }
            }
        }
    }

    let year = i32::try_from(year)
        .map_err(|_| DecodeError::malformed(start, format!("year {year} is out of range")))?;
    Timestamp::from_utc_fields(
        precision, year, month, day, hour, minute, second, fraction, offset,
    )
    .map_err(|error| DecodeError::malformed(start, error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bytes(hex: &str) -> Vec<u8> {
        hex::decode(hex.replace(' ', "")).unwrap()
    }

    fn decimal(hex: &str) -> Decimal {
        let data = bytes(hex);
        read_decimal(&data, 0, data.len()).unwrap()
    }

    fn timestamp(hex: &str) -> Timestamp {
        let data = bytes(hex);
        read_timestamp(&data, 0, data.len()).unwrap()
    }

    #[test]
    fn decimal_sign_and_magnitude() {
        assert_eq!(decimal("C1 07"), Decimal::from_i64(7, 1)); // 0.7
        assert_eq!(decimal("C1 87"), Decimal::from_i64(-7, 1)); // -0.7
        assert_eq!(decimal("C3 01 BC"), Decimal::from_i64(444, 3)); // 0.444
        assert_eq!(decimal("81 07"), Decimal::from_i64(7, -1)); // 70
        // an empty region is zero; an empty coefficient keeps the scale
        assert_eq!(decimal(""), Decimal::from_i64(0, 0));
        assert_eq!(decimal("C2"), Decimal::from_i64(0, 2));
    }

    #[test]
    fn decimal_negative_zero_is_preserved() {
        let value = decimal("C1 80");
        assert!(value.is_negative_zero());
        assert_eq!(value.scale(), 1);
        assert_ne!(value, Decimal::from_i64(0, 1));
    }

    #[test]
    fn decimal_wide_coefficients_take_the_big_path() {
        // 9 coefficient bytes, high bit of the first carries the sign
        let value = decimal("C0 80 FF FF FF FF FF FF FF FF");
        assert_eq!(value, Decimal::new(-BigInt::from(u64::MAX), 0));
    }

    #[test]
    fn timestamp_precision_follows_field_count() {
        assert_eq!(timestamp("C0 0F E7").to_string(), "2023T");
        assert_eq!(timestamp("C0 0F E7 8A").to_string(), "2023-10T");
        assert_eq!(timestamp("C0 0F E7 8A 8F").to_string(), "2023-10-15");
        assert_eq!(
            timestamp("80 0F E7 8A 8F 8B 96").to_string(),
            "2023-10-15T11:22Z"
        );
        assert_eq!(
            timestamp("80 0F E7 8A 8F 8B 96 A1").to_string(),
            "2023-10-15T11:22:33Z"
        );
        assert_eq!(
            timestamp("80 0F E7 8A 8F 8B 96 A1 C3 01 BC").to_string(),
            "2023-10-15T11:22:33.444Z"
        );
    }

    #[test]
    fn unknown_offset_uses_the_negative_zero_sentinel() {
        let value = timestamp("C0 0F E7 8A 8F 8B 96");
        assert_eq!(value.offset_minutes(), None);
        assert_eq!(value.to_string(), "2023-10-15T11:22-00:00");
    }

    #[test]
    fn known_offset_reexpresses_utc_fields_in_local_time() {
        // UTC 10:07 at +75 minutes is local 11:22
        let value = timestamp("00 CB 0F E7 8A 8F 8A 87");
        assert_eq!(value.to_string(), "2023-10-15T11:22+01:15");
        // UTC 12:37 at -75 minutes is local 11:22
        let value = timestamp("40 CB 0F E7 8A 8F 8C A5");
        assert_eq!(value.to_string(), "2023-10-15T11:22-01:15");
    }

    #[test]
    fn hour_without_minute_is_malformed() {
        let data = bytes("C0 0F E7 8A 8F 8B");
        let error = read_timestamp(&data, 0, data.len()).unwrap_err();
        assert!(matches!(error, DecodeError::Malformed { .. }));
    }

    #[test]
    fn negative_fraction_scale_normalizes_to_zero() {
        // exponent +2 (VarInt 0x82) with zero coefficient
        let value = timestamp("80 0F E7 8A 8F 8B 96 A1 82");
        assert_eq!(value.fraction().unwrap().scale(), 0);
    }

    #[test]
    fn truncated_region_is_reported() {
        let data = bytes("C0 0F");
        assert!(matches!(
            read_timestamp(&data, 0, data.len()).unwrap_err(),
            DecodeError::Truncated { .. }
        ));
    }
}
