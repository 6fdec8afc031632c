//! Short-form packed timestamp decoding.
//!
//! The opcode's low nibble selects one of 13 precision/offset variants.
//! Each variant is a fixed-width little-endian integer whose bit-fields
//! hold the calendar values:
//!
//! ```text
//! bits  0..7   year (offset from 1970)
//! bits  7..11  month
//! bits 11..16  day
//! bits 16..21  hour
//! bits 21..27  minute
//! bit  27      UTC flag            (UTC-or-unknown variants)
//! bits 27..34  offset, 15-minute increments biased by 56  (offset variants)
//! then seconds and a 10/20/30-bit fraction, variant-dependent
//! ```

use crate::bin11::primitive::read_fixed_uint_as_u64;
use crate::error::{DecodeError, Result};
use crate::value::{Decimal, Timestamp, EPOCH_YEAR};

const MASK_4: u64 = 0b1111;
const MASK_5: u64 = 0b11111;
const MASK_6: u64 = 0b111111;
const MASK_7: u64 = 0b1111111;
const MASK_10: u64 = 0x3FF;
const MASK_20: u64 = 0xF_FFFF;
const MASK_30: u64 = 0x3FFF_FFFF;

const MONTH_SHIFT: u32 = 7;
const DAY_SHIFT: u32 = 11;
const HOUR_SHIFT: u32 = 16;
const MINUTE_SHIFT: u32 = 21;
const UTC_FLAG: u64 = 1 << 27;
const U_SECOND_SHIFT: u32 = 28;
const U_FRACTION_SHIFT: u32 = 34;
const OFFSET_SHIFT: u32 = 27;
const O_SECOND_SHIFT: u32 = 34;
const O_FRACTION_SHIFT: u32 = 40;

/// Explicit offsets count in 15-minute increments from -14:00.
const OFFSET_BIAS: i32 = 56;
const OFFSET_INCREMENT: i32 = 15;

type ModeDecoder = fn(&[u8], usize) -> Result<Timestamp>;

/// One decoder per precision/offset mode nibble.
static MODE_TABLE: [ModeDecoder; 13] = [
    read_to_year,
    read_to_month,
    read_to_day,
    read_to_minute_utc_or_unknown,
    read_to_second_utc_or_unknown,
    read_to_millisecond_utc_or_unknown,
    read_to_microsecond_utc_or_unknown,
    read_to_nanosecond_utc_or_unknown,
    read_to_minute_with_offset,
    read_to_second_with_offset,
    read_to_millisecond_with_offset,
    read_to_microsecond_with_offset,
    read_to_nanosecond_with_offset,
];

/// Encoded payload width in bytes for each mode nibble.
static MODE_WIDTH: [usize; 13] = [1, 2, 2, 4, 5, 6, 7, 8, 5, 5, 7, 8, 9];

/// The number of bytes the payload of `mode` occupies, or None for an
/// unassigned nibble.
pub fn encoded_width(mode: u8) -> Option<usize> {
    MODE_WIDTH.get(mode as usize).copied()
}

/// Decodes the short-form timestamp payload at `position` using the
/// precision/offset `mode` from the opcode's low nibble.
pub fn read_timestamp(source: &[u8], position: usize, mode: u8) -> Result<Timestamp> {
    let decoder = MODE_TABLE.get(mode as usize).ok_or_else(|| {
        DecodeError::malformed(position, format!("unrecognized short timestamp mode 0x{mode:X}"))
    })?;
    decoder(source, position)
}

fn invalid(position: usize) -> impl FnOnce(crate::value::InvalidTimestamp) -> DecodeError {
    move |error| DecodeError::malformed(position, error.to_string())
}

#[inline]
fn year_of(data: u64) -> i32 {
    (data & MASK_7) as i32 + EPOCH_YEAR
}

#[inline]
fn month_of(data: u64) -> u8 {
    ((data >> MONTH_SHIFT) & MASK_4) as u8
}

#[inline]
fn day_of(data: u64) -> u8 {
    ((data >> DAY_SHIFT) & MASK_5) as u8
}

#[inline]
fn hour_of(data: u64) -> u8 {
    ((data >> HOUR_SHIFT) & MASK_5) as u8
}

#[inline]
fn minute_of(data: u64) -> u8 {
    ((data >> MINUTE_SHIFT) & MASK_6) as u8
}

/// `Some(0)` when the UTC flag is set, otherwise the offset is unknown.
#[inline]
fn utc_or_unknown(data: u64) -> Option<i32> {
    if data & UTC_FLAG != 0 {
        Some(0)
    } else {
        None
    }
}

#[inline]
fn explicit_offset(data: u64) -> i32 {
    let increments = ((data >> OFFSET_SHIFT) & MASK_7) as i32;
    (increments - OFFSET_BIAS) * OFFSET_INCREMENT
}

fn read_to_year(source: &[u8], position: usize) -> Result<Timestamp> {
    let data = read_fixed_uint_as_u64(source, position, 1)?;
    Timestamp::for_year(year_of(data)).map_err(invalid(position))
}

fn read_to_month(source: &[u8], position: usize) -> Result<Timestamp> {
    let data = read_fixed_uint_as_u64(source, position, 2)?;
    Timestamp::for_month(year_of(data), month_of(data)).map_err(invalid(position))
}

fn read_to_day(source: &[u8], position: usize) -> Result<Timestamp> {
    let data = read_fixed_uint_as_u64(source, position, 2)?;
    Timestamp::for_day(year_of(data), month_of(data), day_of(data)).map_err(invalid(position))
}

fn read_to_minute_utc_or_unknown(source: &[u8], position: usize) -> Result<Timestamp> {
    let data = read_fixed_uint_as_u64(source, position, 4)?;
    Timestamp::for_minute(
        year_of(data),
        month_of(data),
        day_of(data),
        hour_of(data),
        minute_of(data),
        utc_or_unknown(data),
    )
    .map_err(invalid(position))
}

fn read_to_second_utc_or_unknown(source: &[u8], position: usize) -> Result<Timestamp> {
    let data = read_fixed_uint_as_u64(source, position, 5)?;
    let second = ((data >> U_SECOND_SHIFT) & MASK_6) as u8;
    Timestamp::for_second(
        year_of(data),
        month_of(data),
        day_of(data),
        hour_of(data),
        minute_of(data),
        second,
        utc_or_unknown(data),
    )
    .map_err(invalid(position))
}

fn read_fraction_utc(
    source: &[u8],
    position: usize,
    width: usize,
    mask: u64,
    scale: i32,
) -> Result<Timestamp> {
    let data = read_fixed_uint_as_u64(source, position, width)?;
    let second = ((data >> U_SECOND_SHIFT) & MASK_6) as u8;
    let fraction = Decimal::from_i64(((data >> U_FRACTION_SHIFT) & mask) as i64, scale);
    Timestamp::for_fractional_second(
        year_of(data),
        month_of(data),
        day_of(data),
        hour_of(data),
        minute_of(data),
        second,
        fraction,
        utc_or_unknown(data),
    )
    .map_err(invalid(position))
}

fn read_to_millisecond_utc_or_unknown(source: &[u8], position: usize) -> Result<Timestamp> {
    read_fraction_utc(source, position, 6, MASK_10, 3)
}

fn read_to_microsecond_utc_or_unknown(source: &[u8], position: usize) -> Result<Timestamp> {
    read_fraction_utc(source, position, 7, MASK_20, 6)
}

fn read_to_nanosecond_utc_or_unknown(source: &[u8], position: usize) -> Result<Timestamp> {
    read_fraction_utc(source, position, 8, MASK_30, 9)
}

fn read_to_minute_with_offset(source: &[u8], position: usize) -> Result<Timestamp> {
    let data = read_fixed_uint_as_u64(source, position, 5)?;
    Timestamp::for_minute(
        year_of(data),
        month_of(data),
        day_of(data),
        hour_of(data),
        minute_of(data),
        Some(explicit_offset(data)),
    )
    .map_err(invalid(position))
}

fn read_to_second_with_offset(source: &[u8], position: usize) -> Result<Timestamp> {
    let data = read_fixed_uint_as_u64(source, position, 5)?;
    let second = ((data >> O_SECOND_SHIFT) & MASK_6) as u8;
    Timestamp::for_second(
        year_of(data),
        month_of(data),
        day_of(data),
        hour_of(data),
        minute_of(data),
        second,
        Some(explicit_offset(data)),
    )
    .map_err(invalid(position))
}

fn read_fraction_with_offset(
    source: &[u8],
    position: usize,
    width: usize,
    mask: u64,
    scale: i32,
) -> Result<Timestamp> {
    let data = read_fixed_uint_as_u64(source, position, width)?;
    let second = ((data >> O_SECOND_SHIFT) & MASK_6) as u8;
    let fraction = Decimal::from_i64(((data >> O_FRACTION_SHIFT) & mask) as i64, scale);
    Timestamp::for_fractional_second(
        year_of(data),
        month_of(data),
        day_of(data),
        hour_of(data),
        minute_of(data),
        second,
        fraction,
        Some(explicit_offset(data)),
    )
    .map_err(invalid(position))
}

fn read_to_millisecond_with_offset(source: &[u8], position: usize) -> Result<Timestamp> {
    read_fraction_with_offset(source, position, 7, MASK_10, 3)
}

fn read_to_microsecond_with_offset(source: &[u8], position: usize) -> Result<Timestamp> {
    read_fraction_with_offset(source, position, 8, MASK_20, 6)
}

/// Nanosecond-with-offset is the only 9-byte variant: the low 24 bits of
/// the fraction live in the 8-byte word, the high 6 bits in a ninth byte.
fn read_to_nanosecond_with_offset(source: &[u8], position: usize) -> Result<Timestamp> {
    let data = read_fixed_uint_as_u64(source, position, 8)?;
    let high_fraction = read_fixed_uint_as_u64(source, position + 8, 1)? & MASK_6;
    let second = ((data >> O_SECOND_SHIFT) & MASK_6) as u8;
    let fraction_bits = (data >> O_FRACTION_SHIFT) | (high_fraction << 24);
    let fraction = Decimal::from_i64(fraction_bits as i64, 9);
    Timestamp::for_fractional_second(
        year_of(data),
        month_of(data),
        day_of(data),
        hour_of(data),
        minute_of(data),
        second,
        fraction,
        Some(explicit_offset(data)),
    )
    .map_err(invalid(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bytes(hex: &str) -> Vec<u8> {
        hex::decode(hex.replace(' ', "")).unwrap()
    }

    fn decode(mode: u8, payload: &str) -> Timestamp {
        let data = bytes(payload);
        assert_eq!(data.len(), encoded_width(mode).unwrap());
        read_timestamp(&data, 0, mode).unwrap()
    }

    #[test]
    fn all_thirteen_modes_reproduce_the_reference_fields() {
        let cases: &[(u8, &str, &str)] = &[
            (0x0, "35", "2023T"),
            (0x1, "35 05", "2023-10T"),
            (0x2, "35 7D", "2023-10-15"),
            (0x3, "35 7D CB 0A", "2023-10-15T11:22Z"),
            (0x4, "35 7D CB 1A 02", "2023-10-15T11:22:33Z"),
            (0x4, "35 7D CB 12 02", "2023-10-15T11:22:33-00:00"),
            (0x5, "35 7D CB 12 F2 06", "2023-10-15T11:22:33.444-00:00"),
            (0x6, "35 7D CB 12 2E 22 1B", "2023-10-15T11:22:33.444555-00:00"),
            (0x7, "35 7D CB 12 4A 86 FD 69", "2023-10-15T11:22:33.444555666-00:00"),
            (0x8, "35 7D CB EA 01", "2023-10-15T11:22+01:15"),
            (0x9, "35 7D CB EA 85", "2023-10-15T11:22:33+01:15"),
            (0xA, "35 7D CB EA 85 BC 01", "2023-10-15T11:22:33.444+01:15"),
            (0xB, "35 7D CB EA 85 8B C8 06", "2023-10-15T11:22:33.444555+01:15"),
            (0xC, "35 7D CB EA 85 92 61 7F 1A", "2023-10-15T11:22:33.444555666+01:15"),
        ];
        for (mode, payload, expected) in cases {
            assert_eq!(decode(*mode, payload).to_string(), *expected, "mode {mode:#X}");
        }
    }

    #[test]
    fn mode_0_is_the_epoch_biased_year() {
        assert_eq!(decode(0x0, "00").to_string(), "1970T");
        assert_eq!(decode(0x0, "7F").to_string(), "2097T");
    }

    #[test]
    fn fraction_digit_counts_follow_the_mode() {
        let millis = decode(0x5, "35 7D CB 12 F2 06");
        assert_eq!(millis.fraction().unwrap(), &Decimal::from_i64(444, 3));
        let nanos = decode(0x7, "35 7D CB 12 4A 86 FD 69");
        assert_eq!(nanos.fraction().unwrap(), &Decimal::from_i64(444_555_666, 9));
    }

    #[test]
    fn offset_bias_covers_the_negative_range() {
        // increments 0 => -14:00
        let data = bytes("35 7D CB 02 00");
        let value = read_timestamp(&data, 0, 0x8).unwrap();
        assert_eq!(value.offset_minutes(), Some(-14 * 60));
    }

    #[test]
    fn unknown_mode_nibble_is_malformed() {
        let data = bytes("00");
        assert!(matches!(
            read_timestamp(&data, 0, 0xD).unwrap_err(),
            DecodeError::Malformed { .. }
        ));
    }

    #[test]
    fn truncated_payload_is_reported() {
        let data = bytes("35 7D");
        assert!(matches!(
            read_timestamp(&data, 0, 0x3).unwrap_err(),
            DecodeError::Truncated { .. }
        ));
    }
}
