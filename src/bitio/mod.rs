//! Bit-level pull reader over a byte source.
//!
//! [`BigEndianBitReader`] consumes the high bit of each byte first, the
//! convention BZIP2's Huffman bitstream and LHA's canonical-Huffman
//! bitstream both use. The carried LZ4 frame/block codec is byte/token
//! oriented (literal/match lengths are plain bytes, not bit-packed), so no
//! LSB-first counterpart is needed here.
//!
//! External contract: `read_bits(n)` for `1 ≤ n ≤ 63`, `clear_bit_cache()`
//! to discard buffered bits and realign to the next byte boundary, and
//! `bytes_read()` tracking consumption of the underlying source (updated
//! only when a byte is pulled from it, not when bits are consumed from the
//! cache).

use std::io::{self, Read};

#[inline]
fn mask(n: u32) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

fn eof_err() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "bit reader: source exhausted mid-read")
}

/// MSB-first bit reader (BZIP2, LHA canonical Huffman).
pub struct BigEndianBitReader<R> {
    inner: R,
    bit_buf: u64,
    bit_count: u32,
    bytes_read: u64,
}

impl<R: Read> BigEndianBitReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, bit_buf: 0, bit_count: 0, bytes_read: 0 }
    }

    /// Read `n` bits (1..=63), MSB of the stream first.
    pub fn read_bits(&mut self, n: u32) -> io::Result<u64> {
        debug_assert!((1..=63).contains(&n));
        while self.bit_count < n {
            let mut byte = [0u8; 1];
            self.inner.read_exact(&mut byte).map_err(|_| eof_err())?;
            self.bytes_read += 1;
            self.bit_buf = (self.bit_buf << 8) | byte[0] as u64;
            self.bit_count += 8;
        }
        let shift = self.bit_count - n;
        let value = (self.bit_buf >> shift) & mask(n);
        self.bit_count = shift;
        self.bit_buf &= mask(shift);
        Ok(value)
    }

    /// Read a single bit as a bool (convenience; same cost as `read_bits(1)`).
    pub fn read_bit(&mut self) -> io::Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    pub fn clear_bit_cache(&mut self) {
        self.bit_buf = 0;
        self.bit_count = 0;
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Attempt to read one byte directly from the underlying source without
    /// going through the bit cache. Only valid at a byte boundary (no bits
    /// buffered); returns `Ok(None)` on a clean EOF rather than erroring —
    /// used at stream/member boundaries where EOF is a valid outcome
    /// (BZIP2 concatenation, spec.md §4.5).
    pub fn try_read_byte(&mut self) -> io::Result<Option<u8>> {
        debug_assert_eq!(self.bit_count, 0, "try_read_byte requires a byte-aligned cache");
        let mut byte = [0u8; 1];
        loop {
            return match self.inner.read(&mut byte) {
                Ok(0) => Ok(None),
                Ok(_) => {
                    self.bytes_read += 1;
                    Ok(Some(byte[0]))
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => Err(e),
            };
        }
    }
}
