//! LHA error taxonomy (spec.md §7), same manual-enum convention as
//! [`crate::gzip::error::GzipError`] and [`crate::bzip2::error::Bzip2Error`].

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LhaError {
    /// Header level byte was not 0, 1, or 2.
    InvalidHeaderLevel(u8),
    /// Compression method tag was not one of the supported `-lhN-` tags.
    UnsupportedMethod(String),
    /// The fixed-header XOR checksum (level 0/1) did not match.
    BadChecksum,
    /// A declared header-CRC (level 1/2, extended header id 0x00) did not
    /// match the CRC-16 computed over the logical header.
    BadHeaderCrc { expected: u16, actual: u16 },
    /// The decoded payload's CRC-16 did not match the entry's declared CRC.
    BadEntryCrc { expected: u16, actual: u16 },
    /// A Huffman code length, symbol index, or back-reference distance was
    /// out of the range valid for its table or window.
    CorruptedInput(String),
    /// The underlying source ended before a required field was fully read.
    UnexpectedEof(&'static str),
}

impl fmt::Display for LhaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LhaError::InvalidHeaderLevel(level) => write!(f, "invalid LHA header level: {level}"),
            LhaError::UnsupportedMethod(tag) => write!(f, "unsupported LHA compression method: {tag}"),
            LhaError::BadChecksum => write!(f, "LHA header checksum mismatch"),
            LhaError::BadHeaderCrc { expected, actual } => {
                write!(f, "LHA header CRC mismatch: expected {expected:04x}, computed {actual:04x}")
            }
            LhaError::BadEntryCrc { expected, actual } => {
                write!(f, "LHA entry CRC mismatch: expected {expected:04x}, computed {actual:04x}")
            }
            LhaError::CorruptedInput(reason) => write!(f, "corrupted LHA stream: {reason}"),
            LhaError::UnexpectedEof(field) => write!(f, "unexpected end of stream while reading {field}"),
        }
    }
}

impl std::error::Error for LhaError {}

impl From<std::io::Error> for LhaError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            LhaError::UnexpectedEof("stream")
        } else {
            LhaError::CorruptedInput(e.to_string())
        }
    }
}

pub type LhaResult<T> = Result<T, LhaError>;
