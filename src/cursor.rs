use crate::error::{Error, Result};
use crate::properties::Endianness;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Cursor;

// 80-bit extended precision layout
const F80_EXPONENT_BIAS: i32 = 16383;
const F80_EXPONENT_MAX: u16 = 0x7FFF;
const F80_MANTISSA_BITS: i32 = 63;
const F64_EXPONENT_BIAS: i32 = 1023;
const F64_FRACTION_BITS: u32 = 52;

/// Forward-only reader over a fixed slice.
///
/// Every read advances the offset by exactly the width consumed. A read that
/// would run past the end fails with [`Error::Truncated`] and leaves the offset
/// untouched.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    inner: Cursor<&'a [u8]>,
    order: Endianness,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8], order: Endianness) -> Self {
        Self {
            inner: Cursor::new(data),
            order,
        }
    }

    pub fn big_endian(data: &'a [u8]) -> Self {
        Self::new(data, Endianness::Big)
    }

    pub fn little_endian(data: &'a [u8]) -> Self {
        Self::new(data, Endianness::Little)
    }

    pub fn order(&self) -> Endianness {
        self.order
    }

    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(Error::Truncated { needed, remaining });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.inner.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let value = match self.order {
            Endianness::Big => self.inner.read_u16::<BigEndian>()?,
            Endianness::Little => self.inner.read_u16::<LittleEndian>()?,
        };
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let value = match self.order {
            Endianness::Big => self.inner.read_u32::<BigEndian>()?,
            Endianness::Little => self.inner.read_u32::<LittleEndian>()?,
        };
        Ok(value)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let data: &'a [u8] = *self.inner.get_ref();
        let start = self.position();
        self.inner.set_position((start + n) as u64);
        Ok(&data[start..start + n])
    }

    pub fn read_four_cc(&mut self) -> Result<[u8; 4]> {
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// `n` bytes as ISO-8859-1 characters.
    pub fn read_fixed_chars(&mut self, n: usize) -> Result<String> {
        Ok(latin1(self.read_bytes(n)?))
    }

    /// One length byte followed by that many ISO-8859-1 characters.
    ///
    /// No pad byte is consumed; callers decide what follows.
    pub fn read_pascal_string(&mut self) -> Result<String> {
        self.ensure(1)?;
        let len = self.inner.get_ref()[self.position()] as usize;
        // Check the body before consuming the count byte
        self.ensure(1 + len)?;
        self.read_u8()?;
        self.read_fixed_chars(len)
    }

    /// IEEE-754 80-bit extended float, always big-endian (AIFF sample rate).
    pub fn read_extended_f80(&mut self) -> Result<f64> {
        let bytes = self.read_bytes(10)?;
        let mut raw = [0u8; 10];
        raw.copy_from_slice(bytes);
        Ok(decode_extended_f80(&raw))
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.inner.set_position((self.position() + n) as u64);
        Ok(())
    }

    pub fn rest(&mut self) -> &'a [u8] {
        let data: &'a [u8] = *self.inner.get_ref();
        let start = self.position().min(data.len());
        self.inner.set_position(data.len() as u64);
        &data[start..]
    }
}

pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

pub fn decode_extended_f80(raw: &[u8; 10]) -> f64 {
    let sign = raw[0] & 0x80 != 0;
    let exponent = ((raw[0] as u16 & 0x7F) << 8) | raw[1] as u16;

    let mut mantissa = 0u64;
    for &b in &raw[2..10] {
        mantissa = (mantissa << 8) | b as u64;
    }

    let magnitude = if exponent == 0 && mantissa == 0 {
        0.0
    } else if exponent == F80_EXPONENT_MAX {
        if mantissa << 1 == 0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        let shift = exponent as i32 - F80_EXPONENT_BIAS - F80_MANTISSA_BITS;
        // Split the scaling so neither factor overflows on its own
        let half = shift / 2;
        mantissa as f64 * 2f64.powi(half) * 2f64.powi(shift - half)
    };

    if sign { -magnitude } else { magnitude }
}

/// Encode an `f64` as an 80-bit extended float. Subnormal inputs encode as zero.
pub fn encode_extended_f80(value: f64) -> [u8; 10] {
    let mut out = [0u8; 10];
    if value.is_sign_negative() {
        out[0] = 0x80;
    }

    if value.is_nan() {
        out[0] |= 0x7F;
        out[1] = 0xFF;
        out[2] = 0xC0;
        return out;
    }
    if value.is_infinite() {
        out[0] |= 0x7F;
        out[1] = 0xFF;
        out[2] = 0x80;
        return out;
    }
    if !value.is_normal() {
        return out;
    }

    let bits = value.abs().to_bits();
    let exp64 = ((bits >> F64_FRACTION_BITS) & 0x7FF) as i32 - F64_EXPONENT_BIAS;
    let fraction = (bits & ((1u64 << F64_FRACTION_BITS) - 1)) | (1u64 << F64_FRACTION_BITS);
    let mantissa = fraction << (63 - F64_FRACTION_BITS);
    let exponent = (exp64 + F80_EXPONENT_BIAS) as u16;

    out[0] |= ((exponent >> 8) & 0x7F) as u8;
    out[1] = (exponent & 0xFF) as u8;
    out[2..10].copy_from_slice(&mantissa.to_be_bytes());
    out
}
