//! GZIP (RFC 1952): multi-member stream decoding with header optional
//! fields, trailer verification, and per-member metadata callbacks.
//!
//! See [`decoder::GzipDecoder`] for the entry point.

pub mod decoder;
pub mod error;
pub mod extra_field;
pub mod member;

pub use decoder::GzipDecoder;
pub use error::{GzipError, GzipResult};
pub use extra_field::{ExtraField, Subfield};
pub use member::{CompressionLevelClass, GzipReadOptions, MemberHeader, MemberMetadata, MemberTrailer};
