//! LHA/LZH archive reader (spec.md §4.6, C6): header dispatch across levels
//! 0/1/2, LH0 (store) and LH4/5/6/7 (sliding-window + canonical-Huffman)
//! payload decoding, and entry CRC-16 verification.

pub mod body;
pub mod error;
pub mod header;
pub mod huffman;
pub mod tables;

pub use error::{LhaError, LhaResult};
pub use header::{FileSeparator, LhaEntry, LhaReadOptions};

use std::io::{self, Cursor, Read};

use crate::checksum::Crc16;
use crate::stream::{ByteSource, EntrySource};
use body::LhaBodyDecoder;

/// Pull-based LHA/LZH archive reader over any `Read` source.
///
/// One entry at a time: call [`LhaDecoder::next_entry`] to advance, then
/// read its payload (already fully decoded and CRC-checked) through the
/// `Read`/[`ByteSource`] impl before advancing again.
pub struct LhaDecoder<R> {
    source: R,
    options: LhaReadOptions,
    current: Cursor<Vec<u8>>,
    bytes_read: u64,
    finished: bool,
}

impl<R: Read> LhaDecoder<R> {
    pub fn new(source: R) -> Self {
        Self::with_options(source, LhaReadOptions::new())
    }

    pub fn with_options(source: R, options: LhaReadOptions) -> Self {
        Self { source, options, current: Cursor::new(Vec::new()), bytes_read: 0, finished: false }
    }

    /// Advance to the next entry, decoding and CRC-verifying its payload
    /// eagerly. Returns `None` once the terminating zero byte is reached.
    pub fn next_entry(&mut self) -> LhaResult<Option<LhaEntry>> {
        if self.finished {
            return Ok(None);
        }
        match header::parse_header(&mut self.source, &self.options)? {
            None => {
                self.finished = true;
                self.current = Cursor::new(Vec::new());
                Ok(None)
            }
            Some(entry) => {
                let payload = self.decode_payload(&entry)?;
                verify_entry_crc(&entry, &payload)?;
                self.current = Cursor::new(payload);
                Ok(Some(entry))
            }
        }
    }

    fn decode_payload(&mut self, entry: &LhaEntry) -> LhaResult<Vec<u8>> {
        let mut compressed = vec![0u8; entry.compressed_size as usize];
        self.source.read_exact(&mut compressed).map_err(LhaError::from)?;
        if entry.is_directory {
            return Ok(Vec::new());
        }
        match entry.compression_method.as_str() {
            "-lh0-" | "-lz4-" => Ok(compressed),
            tag => {
                let dicbit = tables::dicbit_for_method(tag)
                    .ok_or_else(|| LhaError::UnsupportedMethod(tag.to_string()))?;
                let pbit = tables::pbit_for_dicbit(dicbit);
                let mut body = LhaBodyDecoder::new(Cursor::new(compressed), dicbit, pbit, entry.size);
                body.decode_all()
            }
        }
    }
}

fn verify_entry_crc(entry: &LhaEntry, payload: &[u8]) -> LhaResult<()> {
    if entry.is_directory {
        return Ok(());
    }
    let actual = Crc16::of(payload);
    if actual != entry.crc16 {
        return Err(LhaError::BadEntryCrc { expected: entry.crc16, actual });
    }
    Ok(())
}

impl<R: Read> Read for LhaDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.current.read(buf)?;
        self.bytes_read += n as u64;
        Ok(n)
    }
}

impl<R: Read> ByteSource for LhaDecoder<R> {
    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn compressed_bytes_read(&self) -> u64 {
        self.current.position()
    }
}

impl<R: Read> EntrySource for LhaDecoder<R> {
    type Entry = LhaEntry;

    fn next_entry(&mut self) -> io::Result<Option<LhaEntry>> {
        LhaDecoder::next_entry(self).map_err(to_io_error)
    }

    fn can_read_entry_data(&self, entry: &LhaEntry) -> bool {
        entry.is_directory
            || entry.compression_method == "-lh0-"
            || tables::dicbit_for_method(&entry.compression_method).is_some()
    }
}

fn to_io_error(e: LhaError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}
