//! IEEE-754 float decoding: half, single, and double precision.
//!
//! Half-precision values are widened to single precision bit-exactly:
//! signed zeros, infinities, subnormals, and every NaN payload (quiet or
//! signaling, either sign) map to the unique single-precision pattern with
//! the same meaning. The payload bits of a NaN land in the top of the wider
//! mantissa so the signaling bit keeps its role.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{require, Result};

const HALF_SIGN: u16 = 0x8000;
const HALF_EXPONENT: u16 = 0x7C00;
const HALF_MANTISSA: u16 = 0x03FF;

/// Exponent re-bias from half (15) to single (127).
const EXPONENT_REBIAS: u32 = 112;

/// Widens a raw half-precision bit pattern to the equivalent
/// single-precision bit pattern.
pub fn widen_half_bits(half: u16) -> u32 {
    let sign = ((half & HALF_SIGN) as u32) << 16;
    let exponent = ((half & HALF_EXPONENT) >> 10) as u32;
    let mantissa = (half & HALF_MANTISSA) as u32;
    match exponent {
        0x1F => sign | 0x7F80_0000 | (mantissa << 13),
        0 => {
            if mantissa == 0 {
                return sign; // signed zero
            }
            // subnormal: renormalize into the wider exponent range
            let mut exponent = EXPONENT_REBIAS + 1;
            let mut mantissa = mantissa;
            while mantissa & 0x400 == 0 {
                mantissa <<= 1;
                exponent -= 1;
            }
            sign | (exponent << 23) | ((mantissa & 0x3FF) << 13)
        }
        _ => sign | ((exponent + EXPONENT_REBIAS) << 23) | (mantissa << 13),
    }
}

/// Reads a 16-bit little-endian half float and widens it to a
/// single-precision bit pattern.
pub fn read_half_as_f32_bits(source: &[u8], start: usize) -> Result<u32> {
    require(source, start, 2)?;
    Ok(widen_half_bits(LittleEndian::read_u16(&source[start..])))
}

/// Reads a 32-bit little-endian single-precision bit pattern.
pub fn read_f32_bits(source: &[u8], start: usize) -> Result<u32> {
    require(source, start, 4)?;
    Ok(LittleEndian::read_u32(&source[start..]))
}

/// Reads a 64-bit little-endian double-precision bit pattern.
pub fn read_f64_bits(source: &[u8], start: usize) -> Result<u64> {
    require(source, start, 8)?;
    Ok(LittleEndian::read_u64(&source[start..]))
}
