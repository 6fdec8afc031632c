//! Fixed- and variable-width integer decoding.
//!
//! `FixedInt`/`FixedUInt` have an opcode-declared byte width; the bytes are
//! assembled little-endian and the unused high bits discarded with an
//! arithmetic (signed) or logical (unsigned) shift so the sign bit of the
//! most significant *present* byte propagates for every width.
//!
//! `FlexInt`/`FlexUInt` are self-delimiting: counting from the least
//! significant bit of the first byte, the position of the first set bit
//! (all-zero bytes contribute 8 each) is the encoded length L; the low L
//! bits across the run are the length header and are shifted away after
//! little-endian reassembly. Fast paths cover results that fit 32 and 64
//! bits; anything longer or over-padded takes the big-integer fallback.

use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};

use crate::error::{require, DecodeError, Result};

/// Decodes a FixedInt of 1..=2 bytes into an i16.
pub fn read_fixed_int_as_i16(source: &[u8], start: usize, length: usize) -> Result<i16> {
    debug_assert!((1..=2).contains(&length));
    require(source, start, length)?;
    let mut acc: u16 = 0;
    for (i, &byte) in source[start..start + length].iter().enumerate() {
        acc |= (byte as u16) << (8 * i);
    }
    let unused = 16 - 8 * length as u32;
    Ok(((acc << unused) as i16) >> unused)
}

/// Decodes a FixedInt of 1..=4 bytes into an i32.
pub fn read_fixed_int_as_i32(source: &[u8], start: usize, length: usize) -> Result<i32> {
    debug_assert!((1..=4).contains(&length));
    require(source, start, length)?;
    let mut acc: u32 = 0;
    for (i, &byte) in source[start..start + length].iter().enumerate() {
        acc |= (byte as u32) << (8 * i);
    }
    let unused = 32 - 8 * length as u32;
    Ok(((acc << unused) as i32) >> unused)
}

/// Decodes a FixedInt of 1..=8 bytes into an i64.
pub fn read_fixed_int_as_i64(source: &[u8], start: usize, length: usize) -> Result<i64> {
    debug_assert!((1..=8).contains(&length));
    require(source, start, length)?;
    let mut acc: u64 = 0;
    for (i, &byte) in source[start..start + length].iter().enumerate() {
        acc |= (byte as u64) << (8 * i);
    }
    let unused = 64 - 8 * length as u32;
    Ok(((acc << unused) as i64) >> unused)
}

/// Decodes a FixedUInt of 1..=8 bytes into a u64.
pub fn read_fixed_uint_as_u64(source: &[u8], start: usize, length: usize) -> Result<u64> {
    debug_assert!((1..=8).contains(&length));
    require(source, start, length)?;
    let mut acc: u64 = 0;
    for (i, &byte) in source[start..start + length].iter().enumerate() {
        acc |= (byte as u64) << (8 * i);
    }
    Ok(acc)
}

/// Decodes a FixedInt of any length (including over-padded >8 byte
/// encodings) into a BigInt.
pub fn read_fixed_int_as_big(source: &[u8], start: usize, length: usize) -> Result<BigInt> {
    require(source, start, length)?;
    if length == 0 {
        return Ok(BigInt::zero());
    }
    Ok(BigInt::from_signed_bytes_le(&source[start..start + length]))
}

/// Decodes a FixedUInt of any length into a (non-negative) BigInt.
pub fn read_fixed_uint_as_big(source: &[u8], start: usize, length: usize) -> Result<BigInt> {
    require(source, start, length)?;
    Ok(BigInt::from_bytes_le(Sign::Plus, &source[start..start + length]))
}

/// Discovers the encoded length of the FlexInt or FlexUInt at `position`
/// without decoding its value.
pub fn flex_len_at(source: &[u8], position: usize) -> Result<usize> {
    let mut i = position;
    let mut length = 1usize;
    loop {
        require(source, i, 1)?;
        let byte = source[i];
        i += 1;
        if byte != 0 {
            return Ok(length + byte.trailing_zeros() as usize);
        }
        length += 8;
    }
}

#[inline]
fn accumulate_le_u32(source: &[u8], position: usize, length: usize) -> u32 {
    let mut acc = 0u32;
    for (i, &byte) in source[position..position + length].iter().enumerate() {
        acc |= (byte as u32) << (8 * i);
    }
    acc
}

#[inline]
fn accumulate_le_u64(source: &[u8], position: usize, length: usize) -> u64 {
    let mut acc = 0u64;
    for (i, &byte) in source[position..position + length].iter().enumerate() {
        acc |= (byte as u64) << (8 * i);
    }
    acc
}

/// Decodes a FlexInt into an i32, returning the value together with the
/// number of bytes consumed so the caller can advance its cursor without a
/// second pass.
pub fn read_flex_int(source: &[u8], position: usize) -> Result<(i32, usize)> {
    require(source, position, 1)?;
    let first = source[position];
    let num_bytes = first.trailing_zeros() as usize + 1;
    match num_bytes {
        1..=4 => {
            require(source, position, num_bytes)?;
            let acc = accumulate_le_u32(source, position, num_bytes);
            let unused = 32 - 8 * num_bytes as u32;
            let value = ((acc << unused) as i32) >> (unused + num_bytes as u32);
            Ok((value, num_bytes))
        }
        5 => {
            require(source, position, 5)?;
            let acc = accumulate_le_u64(source, position, 5);
            let wide = ((acc << 24) as i64) >> (24 + 5);
            let value = i32::try_from(wide)
                .map_err(|_| DecodeError::overflow("FlexInt", "i32"))?;
            Ok((value, 5))
        }
        _ => {
            // over-padded, or genuinely too large for the fast path
            let length = flex_len_at(source, position)?;
            let big = read_flex_int_as_big(source, position)?;
            let value = big
                .to_i32()
                .ok_or(DecodeError::overflow("FlexInt", "i32"))?;
            Ok((value, length))
        }
    }
}

/// Decodes a FlexUInt into a u32, returning the value and bytes consumed.
pub fn read_flex_uint(source: &[u8], position: usize) -> Result<(u32, usize)> {
    require(source, position, 1)?;
    let first = source[position];
    let num_bytes = first.trailing_zeros() as usize + 1;
    match num_bytes {
        1..=4 => {
            require(source, position, num_bytes)?;
            let acc = accumulate_le_u32(source, position, num_bytes);
            Ok((acc >> num_bytes, num_bytes))
        }
        5 => {
            require(source, position, 5)?;
            let acc = accumulate_le_u64(source, position, 5);
            let wide = acc >> 5;
            let value = u32::try_from(wide)
                .map_err(|_| DecodeError::overflow("FlexUInt", "u32"))?;
            Ok((value, 5))
        }
        _ => {
            let length = flex_len_at(source, position)?;
            let big = read_flex_uint_as_big(source, position)?;
            let value = big
                .to_u32()
                .ok_or(DecodeError::overflow("FlexUInt", "u32"))?;
            Ok((value, length))
        }
    }
}

/// Decodes a FlexInt into an i64, returning the value and bytes consumed.
pub fn read_flex_int_as_i64(source: &[u8], position: usize) -> Result<(i64, usize)> {
    require(source, position, 1)?;
    let first = source[position];
    let num_bytes = first.trailing_zeros() as usize + 1;
    match num_bytes {
        1..=8 => {
            require(source, position, num_bytes)?;
            let acc = accumulate_le_u64(source, position, num_bytes);
            let unused = 64 - 8 * num_bytes as u32;
            let value = ((acc << unused) as i64) >> (unused + num_bytes as u32);
            Ok((value, num_bytes))
        }
        _ => {
            let length = flex_len_at(source, position)?;
            let big = read_flex_int_as_big(source, position)?;
            let value = big
                .to_i64()
                .ok_or(DecodeError::overflow("FlexInt", "i64"))?;
            Ok((value, length))
        }
    }
}

/// Decodes a FlexUInt into a u64, returning the value and bytes consumed.
pub fn read_flex_uint_as_u64(source: &[u8], position: usize) -> Result<(u64, usize)> {
    require(source, position, 1)?;
    let first = source[position];
    let num_bytes = first.trailing_zeros() as usize + 1;
    match num_bytes {
        1..=8 => {
            require(source, position, num_bytes)?;
            let acc = accumulate_le_u64(source, position, num_bytes);
            Ok((acc >> num_bytes, num_bytes))
        }
        _ => {
            let length = flex_len_at(source, position)?;
            let big = read_flex_uint_as_big(source, position)?;
            let value = big
                .to_u64()
                .ok_or(DecodeError::overflow("FlexUInt", "u64"))?;
            Ok((value, length))
        }
    }
}

/// Decodes a FlexInt of any length into a BigInt. Slow; only reached for
/// over-padded or >64-bit values.
pub fn read_flex_int_as_big(source: &[u8], position: usize) -> Result<BigInt> {
    let length = flex_len_at(source, position)?;
    require(source, position, length)?;
    let big = BigInt::from_signed_bytes_le(&source[position..position + length]);
    Ok(big >> length)
}

/// Decodes a FlexUInt of any length into a BigInt.
pub fn read_flex_uint_as_big(source: &[u8], position: usize) -> Result<BigInt> {
    let length = flex_len_at(source, position)?;
    require(source, position, length)?;
    let big = BigInt::from_bytes_le(Sign::Plus, &source[position..position + length]);
    Ok(big >> length)
}
