//! Checksum primitives shared by every format codec in this crate: CRC-32
//! (GZIP trailer, TAR is excluded — TAR uses an additive checksum, computed
//! inline in [`crate::tar::header`]), CRC-16 (LHA header/entry CRC) and
//! XXHash-32 (LZ4 frame header/block/content checksums).
//!
//! All three share one capability: accumulate bytes, read back the running
//! value without disturbing it, and reset to the initial seed.

pub mod crc16;
pub mod crc32;

pub use crc16::Crc16;
pub use crc32::Crc32;
use crate::xxhash::Xxh32State;

/// A running checksum accumulator.
///
/// `value()` is callable any number of times without mutating state;
/// `reset()` restores the state a freshly constructed instance would have.
pub trait Checksum {
    /// The value produced by `value()`.
    type Output;

    /// Fold `bytes` into the running checksum.
    fn update(&mut self, bytes: &[u8]);

    /// Current checksum value. Does not consume or mutate the accumulator.
    fn value(&self) -> Self::Output;

    /// Restore the initial seed.
    fn reset(&mut self);
}

impl Checksum for Crc32 {
    type Output = u32;

    #[inline]
    fn update(&mut self, bytes: &[u8]) {
        Crc32::update(self, bytes);
    }

    #[inline]
    fn value(&self) -> u32 {
        Crc32::value(self)
    }

    #[inline]
    fn reset(&mut self) {
        Crc32::reset(self);
    }
}

impl Checksum for Crc16 {
    type Output = u16;

    #[inline]
    fn update(&mut self, bytes: &[u8]) {
        Crc16::update(self, bytes);
    }

    #[inline]
    fn value(&self) -> u16 {
        Crc16::value(self)
    }

    #[inline]
    fn reset(&mut self) {
        Crc16::reset(self);
    }
}

/// XXHash-32 accumulator with seed(0), the only seed this crate ever uses
/// (LZ4 frame header/block/content checksums per RFC — LZ4 frame format
/// v1.5.1 §2.1). Remembers the seed so `reset()` can rebuild the state —
/// `xxhash_rust::xxh32::Xxh32` has no in-place reset of its own.
#[derive(Clone)]
pub struct XxHash32 {
    seed: u32,
    state: Xxh32State,
}

impl XxHash32 {
    pub fn new(seed: u32) -> Self {
        Self { seed, state: Xxh32State::new(seed) }
    }
}

impl Default for XxHash32 {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Checksum for XxHash32 {
    type Output = u32;

    #[inline]
    fn update(&mut self, bytes: &[u8]) {
        self.state.update(bytes);
    }

    #[inline]
    fn value(&self) -> u32 {
        self.state.digest()
    }

    #[inline]
    fn reset(&mut self) {
        self.state = Xxh32State::new(self.seed);
    }
}

/// A byte source that updates a [`Checksum`] as bytes pass through `read`.
///
/// Wraps any `std::io::Read` so a decoder can checksum a stream without a
/// second buffered pass.
pub struct ChecksummingReader<R, C> {
    inner: R,
    checksum: C,
}

impl<R: std::io::Read, C: Checksum> ChecksummingReader<R, C> {
    pub fn new(inner: R, checksum: C) -> Self {
        Self { inner, checksum }
    }

    pub fn checksum(&self) -> C::Output {
        self.checksum.value()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: std::io::Read, C: Checksum> std::io::Read for ChecksummingReader<R, C> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.checksum.update(&buf[..n]);
        Ok(n)
    }
}
