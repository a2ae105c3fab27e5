//! Charset capability used by header string fields: GZIP FNAME/FCOMMENT, LHA
//! filenames, TAR name/linkname/uname/gname.
//!
//! Two charsets only — the two spec.md's options tables (§6.3) ever name:
//! LATIN-1 (the byte-preserving default every format falls back to) and
//! UTF-8 (opt-in, used by PAX records and GNU long names in practice).

/// A charset selectable via a format's `*ReadOptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// ISO-8859-1: every byte maps to the codepoint of the same value.
    #[default]
    Latin1,
    Utf8,
}

/// Decode `bytes` under `charset`, never failing — invalid UTF-8 sequences
/// are replaced with U+FFFD (LATIN-1 decoding cannot fail: every byte is a
/// valid codepoint).
pub fn decode_with_replacement(bytes: &[u8], charset: Charset) -> String {
    match charset {
        Charset::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Encode `s` under `charset` on a best-effort basis: characters outside the
/// target charset's repertoire are replaced with `?` (LATIN-1) or simply
/// pass through unchanged (UTF-8, which has no repertoire limit here).
pub fn encode_best_effort(s: &str, charset: Charset) -> Vec<u8> {
    match charset {
        Charset::Latin1 => s
            .chars()
            .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
            .collect(),
        Charset::Utf8 => s.as_bytes().to_vec(),
    }
}
