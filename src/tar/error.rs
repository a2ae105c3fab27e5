//! TAR error taxonomy (spec.md §7), same manual-enum convention as
//! [`crate::gzip::error::GzipError`], [`crate::bzip2::error::Bzip2Error`], and
//! [`crate::lha::error::LhaError`].

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TarError {
    /// The 512-byte header checksum did not match the octal-sum computed
    /// with the checksum field blanked to spaces.
    BadChecksum,
    /// A numeric octal/base-256 field held a negative value.
    CorruptedInput(String),
    /// A PAX record's length prefix was not a valid decimal integer.
    BadPaxHeader(String),
    /// The archive ended before an entry's declared size was fully read.
    Truncated,
    /// The underlying source ended before a required block was fully read.
    UnexpectedEof(&'static str),
}

impl fmt::Display for TarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TarError::BadChecksum => write!(f, "TAR header checksum mismatch"),
            TarError::CorruptedInput(reason) => write!(f, "corrupted TAR stream: {reason}"),
            TarError::BadPaxHeader(reason) => write!(f, "malformed PAX extended header: {reason}"),
            TarError::Truncated => write!(f, "TAR archive truncated before entry data ended"),
            TarError::UnexpectedEof(field) => write!(f, "unexpected end of stream while reading {field}"),
        }
    }
}

impl std::error::Error for TarError {}

impl From<std::io::Error> for TarError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            TarError::UnexpectedEof("stream")
        } else {
            TarError::CorruptedInput(e.to_string())
        }
    }
}

pub type TarResult<T> = Result<T, TarError>;
