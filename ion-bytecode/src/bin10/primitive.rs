//! The legacy variable-width integer encodings.
//!
//! Unlike the self-delimiting encodings of the current format, these carry
//! 7 data bits per byte, most significant group first, and mark the *final*
//! byte with its high bit. VarInt additionally spends bit 6 of its first
//! byte on a sign, giving it only 6 data bits there.

use crate::error::{DecodeError, Result};

const TERMINATOR_BIT: u8 = 0x80;
const SIGN_BIT: u8 = 0x40;
const LOWER_SEVEN: u8 = 0x7F;
const LOWER_SIX: u8 = 0x3F;

/// A VarInt whose single byte is terminator+sign with zero magnitude.
/// The legacy timestamp encoding uses it to mean "offset unknown".
pub const VAR_INT_NEGATIVE_ZERO: u8 = 0xC0;

fn next_byte(source: &[u8], position: &mut usize, limit: usize) -> Result<u8> {
    if *position >= limit || *position >= source.len() {
        return Err(DecodeError::Truncated {
            start: *position,
            length: 1,
            limit: limit.min(source.len()),
        });
    }
    let byte = source[*position];
    *position += 1;
    Ok(byte)
}

/// Reads the VarUInt at `*position`, advancing the cursor past it. The
/// value must fit in a u32.
pub fn read_var_uint(source: &[u8], position: &mut usize, limit: usize) -> Result<u32> {
    let mut result: u32 = 0;
    loop {
        let byte = next_byte(source, position, limit)?;
        if result > u32::MAX >> 7 {
            return Err(DecodeError::overflow("VarUInt", "u32"));
        }
        result = (result << 7) | (byte & LOWER_SEVEN) as u32;
        if byte & TERMINATOR_BIT != 0 {
            return Ok(result);
        }
    }
}

/// Reads the VarInt at `*position`, advancing the cursor past it. The
/// value must fit in an i32.
pub fn read_var_int(source: &[u8], position: &mut usize, limit: usize) -> Result<i32> {
    let first = next_byte(source, position, limit)?;
    let negative = first & SIGN_BIT != 0;
    let mut magnitude = (first & LOWER_SIX) as u32;
    let mut byte = first;
    while byte & TERMINATOR_BIT == 0 {
        byte = next_byte(source, position, limit)?;
        if magnitude > u32::MAX >> 7 {
            return Err(DecodeError::overflow("VarInt", "i32"));
        }
        magnitude = (magnitude << 7) | (byte & LOWER_SEVEN) as u32;
    }
    if magnitude > i32::MAX as u32 {
        return Err(DecodeError::overflow("VarInt", "i32"));
    }
    let magnitude = magnitude as i32;
    Ok(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bytes(hex: &str) -> Vec<u8> {
        hex::decode(hex.replace(' ', "")).unwrap()
    }

    fn var_uint(hex: &str) -> (u32, usize) {
        let data = bytes(hex);
        let mut position = 0;
        let value = read_var_uint(&data, &mut position, data.len()).unwrap();
        (value, position)
    }

    fn var_int(hex: &str) -> (i32, usize) {
        let data = bytes(hex);
        let mut position = 0;
        let value = read_var_int(&data, &mut position, data.len()).unwrap();
        (value, position)
    }

    #[test]
    fn var_uint_terminates_on_the_high_bit() {
        assert_eq!(var_uint("80"), (0, 1));
        assert_eq!(var_uint("81"), (1, 1));
        assert_eq!(var_uint("FF"), (127, 1));
        assert_eq!(var_uint("01 80"), (128, 2));
        assert_eq!(var_uint("0F E7"), (2023, 2)); // 15 * 128 + 103
        assert_eq!(var_uint("7F FF"), (16383, 2));
        assert_eq!(var_uint("01 00 80"), (16384, 3));
        // trailing bytes after the terminator are untouched
        assert_eq!(var_uint("81 55 55"), (1, 1));
    }

    #[test]
    fn var_uint_overlong_zero_prefix() {
        assert_eq!(var_uint("00 00 81"), (1, 3));
    }

    #[test]
    fn var_int_sign_lives_in_the_first_byte() {
        assert_eq!(var_int("80"), (0, 1));
        assert_eq!(var_int("81"), (1, 1));
        assert_eq!(var_int("C1"), (-1, 1));
        assert_eq!(var_int("BF"), (63, 1));
        assert_eq!(var_int("FF"), (-63, 1));
        assert_eq!(var_int("00 C0"), (64, 2));
        assert_eq!(var_int("40 C0"), (-64, 2));
        assert_eq!(var_int("01 8B"), (139, 2)); // 1 * 128 + 11
        assert_eq!(var_int("41 8B"), (-139, 2));
    }

    #[test]
    fn negative_zero_sentinel_decodes_as_zero() {
        // the sentinel is only special to the timestamp decoder; as a plain
        // VarInt it is just a negatively-signed zero
        assert_eq!(var_int("C0"), (0, 1));
    }

    #[test]
    fn truncation_is_reported_with_the_limit() {
        let data = bytes("00 00");
        let mut position = 0;
        let error = read_var_uint(&data, &mut position, data.len()).unwrap_err();
        assert_eq!(
            error,
            DecodeError::Truncated {
                start: 2,
                length: 1,
                limit: 2
            }
        );
        // a declared end boundary short of the terminator also truncates
        let data = bytes("01 01 81");
        let mut position = 0;
        assert!(read_var_uint(&data, &mut position, 2).is_err());
    }

    #[test]
    fn overflow_names_the_encoding() {
        // six 7-bit groups exceed a u32
        let data = bytes("7F 7F 7F 7F 7F FF");
        let mut position = 0;
        assert_eq!(
            read_var_uint(&data, &mut position, data.len()).unwrap_err(),
            DecodeError::overflow("VarUInt", "u32")
        );
    }
}
