//! Facade capability traits (C9): the uniform pull contracts every
//! byte-producing or entry-producing component in this crate implements.
//!
//! These replace the class-hierarchy contract a object-oriented rendition
//! would use (`CompressorInputStream` / `ArchiveInputStream` / `Closeable`):
//! here they are plain traits over `std::io::Read`, with two extra counters
//! (`bytes_read`, `compressed_bytes_read`) that every decoder tracks
//! alongside the data it yields.

use std::io;

/// A byte-producing decoder: any format codec's decompressing reader.
///
/// Implementors already get `read`/`read_to_end`/etc. through
/// `std::io::Read`; this trait adds the two accounting counters spec.md
/// §4.9 requires and a `close` hook for deterministic resource release
/// (buffers, checksum state) ahead of `Drop`.
pub trait ByteSource: io::Read {
    /// Count of bytes delivered to the caller so far (post-decompression).
    fn bytes_read(&self) -> u64;

    /// Count of bytes consumed from the underlying byte source so far
    /// (pre-decompression).
    fn compressed_bytes_read(&self) -> u64;

    /// Release any owned resources. Idempotent; safe to call more than once
    /// and safe to skip (every implementor also releases on `Drop`).
    fn close(&mut self) {}
}

/// A byte-consuming encoder: any format codec's compressing writer.
pub trait ByteSink: io::Write {
    /// Count of bytes accepted from the caller so far (pre-compression).
    fn bytes_written(&self) -> u64;

    /// Count of bytes emitted to the underlying sink so far
    /// (post-compression). Only meaningful after a `flush`.
    fn compressed_bytes_written(&self) -> u64;

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// A lazy sequence of archive entries, each with an associated payload
/// sub-stream (some reader type implementing [`ByteSource`] or plain
/// `std::io::Read`).
pub trait EntrySource {
    type Entry;

    /// Advance to the next entry, skipping any unread payload bytes of the
    /// previous one. Returns `None` at end of archive.
    fn next_entry(&mut self) -> io::Result<Option<Self::Entry>>;

    /// `false` when the current entry uses a compression method or
    /// encryption scheme this reader cannot decode (the entry's metadata is
    /// still readable; only the payload is inaccessible).
    fn can_read_entry_data(&self, entry: &Self::Entry) -> bool;
}
