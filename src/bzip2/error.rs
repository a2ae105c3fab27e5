//! BZIP2 error taxonomy (spec.md §7), same manual-enum convention as
//! [`crate::gzip::error::GzipError`].

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bzip2Error {
    /// Stream magic was not `"BZh" <digit>`.
    NotFormat,
    /// Block magic matched neither the data-block nor end-of-stream magic.
    BadBlockHeader,
    /// A Huffman code length fell outside `[1, MAX_CODE_LEN]`.
    BadCodeLen,
    /// An index derived from the bitstream (origPtr, MTF/BWT position,
    /// selector) was out of bounds for the array it indexes.
    CorruptedInput(String),
    /// A block or the combined stream CRC did not match.
    CrcMismatch { expected: u32, actual: u32 },
    /// The underlying source ended before a required field was fully read.
    UnexpectedEof(&'static str),
}

impl fmt::Display for Bzip2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bzip2Error::NotFormat => write!(f, "not a bzip2 stream: bad magic"),
            Bzip2Error::BadBlockHeader => write!(f, "unrecognised block magic"),
            Bzip2Error::BadCodeLen => write!(f, "huffman code length out of range"),
            Bzip2Error::CorruptedInput(reason) => write!(f, "corrupted bzip2 block: {reason}"),
            Bzip2Error::CrcMismatch { expected, actual } => write!(
                f,
                "bzip2 CRC mismatch: expected {expected:08x}, computed {actual:08x}"
            ),
            Bzip2Error::UnexpectedEof(field) => {
                write!(f, "unexpected end of stream while reading {field}")
            }
        }
    }
}

impl std::error::Error for Bzip2Error {}

impl From<std::io::Error> for Bzip2Error {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Bzip2Error::UnexpectedEof("stream")
        } else {
            Bzip2Error::CorruptedInput(e.to_string())
        }
    }
}

pub type Bzip2Result<T> = Result<T, Bzip2Error>;
