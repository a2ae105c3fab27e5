//! GZIP member metadata (spec.md §3.2) and read options (spec.md §6.3).

use super::extra_field::ExtraField;
use crate::charset::Charset;

/// `XFL`'s compression-level hint, mapped to a class (RFC 1952 §2.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevelClass {
    #[default]
    Default,
    BestSpeed,
    BestCompression,
}

impl CompressionLevelClass {
    pub fn from_xfl(xfl: u8) -> Self {
        match xfl {
            2 => CompressionLevelClass::BestCompression,
            4 => CompressionLevelClass::BestSpeed,
            _ => CompressionLevelClass::Default,
        }
    }
}

/// Metadata captured while parsing one member's header, passed to
/// `on_member_start`.
#[derive(Debug, Clone, Default)]
pub struct MemberHeader {
    /// Seconds since epoch; 0 means "none" (RFC 1952 §2.3.1).
    pub mtime: u32,
    pub level: CompressionLevelClass,
    pub os: u8,
    pub filename: Option<String>,
    pub comment: Option<String>,
    pub extra_field: Option<ExtraField>,
    pub header_crc_present: bool,
}

/// Trailer fields captured once a member's body has been fully verified,
/// passed to `on_member_end` together with the header already seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberTrailer {
    pub crc32: u32,
    pub isize: u32,
}

/// Complete per-member metadata (header + trailer), the record type spec.md
/// §3.2 describes.
#[derive(Debug, Clone, Default)]
pub struct MemberMetadata {
    pub header: MemberHeader,
    pub trailer: MemberTrailer,
}

type MemberStartCallback = Box<dyn FnMut(&MemberHeader)>;
type MemberEndCallback = Box<dyn FnMut(&MemberMetadata)>;

/// GZIP read-side configuration (spec.md §6.3), built by free setters
/// returning `Self` per spec.md §9's "configuration record" guidance.
#[derive(Default)]
pub struct GzipReadOptions {
    pub decompress_concatenated: bool,
    pub ignore_extra_field: bool,
    pub filename_charset: Charset,
    pub on_member_start: Option<MemberStartCallback>,
    pub on_member_end: Option<MemberEndCallback>,
}

impl GzipReadOptions {
    pub fn new() -> Self {
        Self { ignore_extra_field: true, ..Default::default() }
    }

    pub fn decompress_concatenated(mut self, value: bool) -> Self {
        self.decompress_concatenated = value;
        self
    }

    pub fn ignore_extra_field(mut self, value: bool) -> Self {
        self.ignore_extra_field = value;
        self
    }

    pub fn filename_charset(mut self, charset: Charset) -> Self {
        self.filename_charset = charset;
        self
    }

    pub fn on_member_start(mut self, cb: impl FnMut(&MemberHeader) + 'static) -> Self {
        self.on_member_start = Some(Box::new(cb));
        self
    }

    pub fn on_member_end(mut self, cb: impl FnMut(&MemberMetadata) + 'static) -> Self {
        self.on_member_end = Some(Box::new(cb));
        self
    }
}
