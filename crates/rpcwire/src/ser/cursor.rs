// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable writer and bounds-checked reader for the wire format.
//!
//! Integers are LEB128 varints (signed ones zigzag-mapped first), floats
//! are fixed-width little-endian bit patterns.

use crate::error::{CodecError, Result};

/// Longest valid encoding of a u64 varint.
const MAX_VARINT_LEN: usize = 10;

/// Map a signed integer to unsigned so small magnitudes stay short.
#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Generate fixed-width little-endian write methods.
macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
    };
}

/// Generate fixed-width little-endian read methods.
///
/// Each generated method checks bounds (`MalformedStream` on overflow),
/// reads N bytes, and advances the offset.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.take($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Append-only output buffer.
#[derive(Debug, Default)]
pub struct WireWriter {
    buffer: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    impl_write_le!(write_u32_le, u32);
    impl_write_le!(write_u64_le, u64);

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32_le(value.to_bits());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_u64_le(value.to_bits());
    }

    pub fn write_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buffer.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buffer.push(value as u8);
    }

    pub fn write_varint_signed(&mut self, value: i64) {
        self.write_varint(zigzag_encode(value));
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Length-prefixed byte string.
    pub fn write_blob(&mut self, data: &[u8]) {
        self.write_varint(data.len() as u64);
        self.write_bytes(data);
    }

    /// Length-prefixed UTF-8 string.
    pub fn write_str(&mut self, s: &str) {
        self.write_blob(s.as_bytes());
    }
}

/// Bounds-checked input cursor. Every failure is `MalformedStream` with
/// the offset where the bad read started.
pub struct WireReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CodecError::malformed(
                self.offset,
                format!(
                    "unexpected end of buffer (need {} bytes, {} left)",
                    len,
                    self.remaining()
                ),
            ));
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    impl_read_le!(read_u32_le, u32, 4);
    impl_read_le!(read_u64_le, u64, 8);

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_u32_le().map(f32::from_bits)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_u64_le().map(f64::from_bits)
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let start = self.offset;
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.read_u8()?;
            let bits = u64::from(byte & 0x7f);
            // 10th byte may only carry the top bit of a u64
            if i == MAX_VARINT_LEN - 1 && bits > 1 {
                return Err(CodecError::malformed(start, "varint overflows 64 bits"));
            }
            value |= bits << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::malformed(start, "varint longer than 10 bytes"))
    }

    pub fn read_varint_signed(&mut self) -> Result<i64> {
        self.read_varint().map(zigzag_decode)
    }

    /// Varint that must fit the target integer type.
    pub fn read_varint_as<T: TryFrom<u64>>(&mut self, what: &str) -> Result<T> {
        let start = self.offset;
        let raw = self.read_varint()?;
        T::try_from(raw)
            .map_err(|_| CodecError::malformed(start, format!("{} out of range: {}", what, raw)))
    }

    /// Zigzag varint that must fit the target integer type.
    pub fn read_signed_as<T: TryFrom<i64>>(&mut self, what: &str) -> Result<T> {
        let start = self.offset;
        let raw = self.read_varint_signed()?;
        T::try_from(raw)
            .map_err(|_| CodecError::malformed(start, format!("{} out of range: {}", what, raw)))
    }

    /// Length-prefixed byte string, at most `limit` bytes.
    pub fn read_blob(&mut self, limit: usize) -> Result<&'a [u8]> {
        let start = self.offset;
        let len: usize = self.read_varint_as("length")?;
        if len > limit {
            return Err(CodecError::malformed(
                start,
                format!("length {} exceeds limit {}", len, limit),
            ));
        }
        self.take(len)
    }

    /// Length-prefixed UTF-8 string, at most `limit` bytes.
    pub fn read_str(&mut self, limit: usize) -> Result<&'a str> {
        let start = self.offset;
        let bytes = self.read_blob(limit)?;
        std::str::from_utf8(bytes)
            .map_err(|e| CodecError::malformed(start, format!("invalid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        for v in [i64::MIN, -300, -1, 0, 1, 300, i64::MAX] {
            assert_eq!(zigzag_decode(zigzag_encode(v)), v);
        }
    }

    #[test]
    fn test_varint_layout() {
        let mut w = WireWriter::new();
        w.write_varint(1);
        w.write_varint(300);
        assert_eq!(w.into_bytes(), vec![0x01, 0xac, 0x02]);

        let mut w = WireWriter::new();
        w.write_varint(u64::MAX);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), MAX_VARINT_LEN);
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_varint().expect("read"), u64::MAX);
        assert!(r.is_eof());
    }

    #[test]
    fn test_varint_too_long() {
        let bytes = [0xffu8; 11];
        let mut r = WireReader::new(&bytes);
        assert!(matches!(
            r.read_varint(),
            Err(CodecError::MalformedStream { offset: 0, .. })
        ));

        let mut overflow = [0xffu8; 10];
        overflow[9] = 0x02;
        assert!(WireReader::new(&overflow).read_varint().is_err());
    }

    #[test]
    fn test_truncated_reads() {
        let mut r = WireReader::new(&[0x80]);
        assert!(r.read_varint().is_err());

        let mut r = WireReader::new(&[1, 2, 3]);
        match r.read_f64() {
            Err(CodecError::MalformedStream { offset, reason }) => {
                assert_eq!(offset, 0);
                assert!(reason.contains("end of buffer"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_floats_bit_exact() {
        let mut w = WireWriter::new();
        w.write_f32(-0.0);
        w.write_f64(f64::NAN);
        w.write_f64(f64::MIN_POSITIVE);
        let bytes = w.into_bytes();
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_f32().expect("f32").to_bits(), (-0.0f32).to_bits());
        assert_eq!(r.read_f64().expect("nan").to_bits(), f64::NAN.to_bits());
        assert_eq!(r.read_f64().expect("min"), f64::MIN_POSITIVE);
    }

    #[test]
    fn test_strings() {
        let mut w = WireWriter::new();
        w.write_str("héllo");
        w.write_blob(&[0xff, 0xfe]);
        let bytes = w.into_bytes();

        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_str(64).expect("str"), "héllo");
        // valid length but not UTF-8
        assert!(r.read_str(64).is_err());

        let mut r = WireReader::new(&bytes);
        assert!(r.read_str(3).is_err());
    }

    #[test]
    fn test_range_checked_varints() {
        let mut w = WireWriter::new();
        w.write_varint(u64::from(u32::MAX) + 1);
        w.write_varint_signed(i64::from(i32::MIN) - 1);
        let bytes = w.into_bytes();
        let mut r = WireReader::new(&bytes);
        assert!(r.read_varint_as::<u32>("id").is_err());
        assert!(r.read_signed_as::<i32>("code").is_err());
    }
}
