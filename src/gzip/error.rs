//! GZIP error taxonomy (spec.md §7), realized as a manual enum with a
//! `Display`/`std::error::Error` impl — no `thiserror`, matching the
//! conventions of [`crate::frame::types::Lz4FError`].

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GzipError {
    /// Magic bytes were not `1F 8B`.
    NotFormat,
    /// `CM` byte was not 8 (DEFLATE).
    UnsupportedMethod(u8),
    /// A reserved `FLG` bit (top 3) was set.
    ReservedFlagsSet,
    /// GZIP FEXTRA subfield total size would exceed 65535.
    SizeLimitExceeded,
    /// A subfield's declared length ran past the remaining FEXTRA bytes.
    SubfieldTooLong,
    /// Bytes remained after the last complete FEXTRA subfield.
    TrailingGarbage,
    /// Trailer CRC32 did not match the computed CRC32 of the decompressed body.
    CrcMismatch { expected: u32, actual: u32 },
    /// Trailer ISIZE did not match `bytes_written mod 2^32`.
    SizeMismatch { expected: u32, actual: u32 },
    /// The underlying source ended before a required field was fully read.
    UnexpectedEof(&'static str),
    /// The DEFLATE body was malformed (forwarded from the inflater).
    CorruptedInput(String),
}

impl fmt::Display for GzipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GzipError::NotFormat => write!(f, "not a gzip stream: bad magic"),
            GzipError::UnsupportedMethod(cm) => {
                write!(f, "unsupported compression method: {cm}")
            }
            GzipError::ReservedFlagsSet => write!(f, "reserved FLG bits are set"),
            GzipError::SizeLimitExceeded => {
                write!(f, "gzip extra field exceeds 65535 bytes")
            }
            GzipError::SubfieldTooLong => {
                write!(f, "extra field subfield length exceeds remaining bytes")
            }
            GzipError::TrailingGarbage => {
                write!(f, "trailing bytes after last extra field subfield")
            }
            GzipError::CrcMismatch { expected, actual } => write!(
                f,
                "gzip trailer CRC32 mismatch: expected {expected:08x}, computed {actual:08x}"
            ),
            GzipError::SizeMismatch { expected, actual } => write!(
                f,
                "gzip trailer ISIZE mismatch: expected {expected}, computed {actual}"
            ),
            GzipError::UnexpectedEof(field) => {
                write!(f, "unexpected end of stream while reading {field}")
            }
            GzipError::CorruptedInput(reason) => write!(f, "corrupted gzip stream: {reason}"),
        }
    }
}

impl std::error::Error for GzipError {}

impl From<std::io::Error> for GzipError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            GzipError::UnexpectedEof("stream")
        } else {
            GzipError::CorruptedInput(e.to_string())
        }
    }
}

pub type GzipResult<T> = Result<T, GzipError>;
