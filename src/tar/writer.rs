//! Push-based TAR archive writer (spec.md §4.7's "Write path"): symmetric
//! to [`super::reader::TarReader`], with selectable long-file and
//! big-number overflow strategies.

use std::io::{self, Write};

use super::error::{TarError, TarResult};
use super::header::{self, TarEntry, TypeFlag, BLOCK_SIZE};

/// What to do when an entry's name (or link name) does not fit the
/// 100-byte USTAR `name` field (and, for names, the 155-byte `prefix`
/// field) (spec.md §4.7's "Write path").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LongFileMode {
    /// Refuse to write the entry.
    Error,
    /// Silently truncate the name to what the USTAR fields can hold.
    Truncate,
    /// Emit a GNU `'L'`/`'K'` long-name/long-link entry ahead of the real one.
    #[default]
    Gnu,
    /// Emit a PAX `'x'` extended header carrying the full `path`/`linkpath`.
    Posix,
}

/// What to do when a numeric field (size, mtime, uid, gid, devmajor,
/// devminor) overflows its 12-byte octal field (spec.md §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BigNumberMode {
    /// Refuse to write the entry.
    Error,
    /// Use a base-256 (GNU/STAR) field encoding.
    Star,
    /// Emit a PAX `'x'` extended header carrying the oversize field as text.
    #[default]
    Posix,
}

/// TAR write-side configuration (spec.md §4.7).
#[derive(Debug, Clone, Copy)]
pub struct TarWriteOptions {
    pub long_file_mode: LongFileMode,
    pub big_number_mode: BigNumberMode,
}

impl Default for TarWriteOptions {
    fn default() -> Self {
        Self { long_file_mode: LongFileMode::default(), big_number_mode: BigNumberMode::default() }
    }
}

impl TarWriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn long_file_mode(mut self, mode: LongFileMode) -> Self {
        self.long_file_mode = mode;
        self
    }

    pub fn big_number_mode(mut self, mode: BigNumberMode) -> Self {
        self.big_number_mode = mode;
        self
    }
}

/// The USTAR octal `size`/`mtime`/`uid`/`gid`/`devmajor`/`devminor` fields
/// hold 11 octal digits: values at or above 8 GiB (for size) need either
/// base-256 or a PAX override.
const OCTAL_FIELD_LIMIT: u64 = (1u64 << 33) - 1; // 11 octal digits

/// Push-based TAR writer. Call [`TarWriter::write_entry`] once per entry's
/// header, then [`std::io::Write`] the entry's body, then
/// [`TarWriter::finish`] once all entries are written.
pub struct TarWriter<W> {
    sink: W,
    options: TarWriteOptions,
    current_remaining: u64,
    current_padding: u64,
    finished: bool,
}

impl<W: Write> TarWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, TarWriteOptions::new())
    }

    pub fn with_options(sink: W, options: TarWriteOptions) -> Self {
        Self { sink, options, current_remaining: 0, current_padding: 0, finished: false }
    }

    /// Write `entry`'s header block(s) (including any GNU longname/longlink
    /// or PAX extended-header blocks the entry requires), and begin
    /// accepting its body via [`std::io::Write`].
    pub fn write_entry(&mut self, entry: &TarEntry) -> TarResult<()> {
        self.finish_current_entry()?;

        let needs_long_name = exceeds_ustar_name(&entry.name);
        let needs_long_link = !entry.link_name.is_empty() && entry.link_name.len() > header::LINKNAME_LEN;
        let oversize_fields = oversize_numeric_fields(entry);

        let mut pax_records: Vec<(&'static str, String)> = Vec::new();
        let mut effective = entry.clone();

        if needs_long_name || needs_long_link {
            match self.options.long_file_mode {
                LongFileMode::Error => {
                    return Err(TarError::CorruptedInput(format!(
                        "entry name {:?} exceeds USTAR field limits",
                        entry.name
                    )));
                }
                LongFileMode::Truncate => {
                    effective.name = truncate_name(&entry.name);
                    effective.link_name = truncate_link(&entry.link_name);
                }
                LongFileMode::Gnu => {
                    if needs_long_name {
                        self.write_gnu_long(TypeFlag::GnuLongName, &entry.name)?;
                    }
                    if needs_long_link {
                        self.write_gnu_long(TypeFlag::GnuLongLink, &entry.link_name)?;
                    }
                }
                LongFileMode::Posix => {
                    if needs_long_name {
                        pax_records.push(("path", entry.name.clone()));
                    }
                    if needs_long_link {
                        pax_records.push(("linkpath", entry.link_name.clone()));
                    }
                }
            }
        }

        if !oversize_fields.is_empty() {
            match self.options.big_number_mode {
                BigNumberMode::Error => {
                    return Err(TarError::CorruptedInput(format!(
                        "entry {:?} has a numeric field exceeding the octal field width",
                        entry.name
                    )));
                }
                BigNumberMode::Star => {
                    effective.use_base256 = true;
                }
                BigNumberMode::Posix => {
                    for field in oversize_fields {
                        pax_records.push((field, numeric_field_value(entry, field)));
                    }
                }
            }
        }

        if !pax_records.is_empty() {
            self.write_pax_extended(&pax_records)?;
        }

        let block = header::encode_header_block(&effective);
        self.sink.write_all(&block).map_err(TarError::from)?;

        self.current_remaining = entry.size;
        self.current_padding = header::padding_for(entry.size);
        Ok(())
    }

    fn finish_current_entry(&mut self) -> TarResult<()> {
        if self.current_remaining != 0 {
            return Err(TarError::Truncated);
        }
        if self.current_padding != 0 {
            let pad = vec![0u8; self.current_padding as usize];
            self.sink.write_all(&pad).map_err(TarError::from)?;
            self.current_padding = 0;
        }
        Ok(())
    }

    fn write_gnu_long(&mut self, typeflag: TypeFlag, value: &str) -> TarResult<()> {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        let marker = TarEntry {
            name: "././@LongLink".into(),
            typeflag,
            size: data.len() as u64,
            ..Default::default()
        };
        self.sink.write_all(&header::encode_header_block(&marker)).map_err(TarError::from)?;
        self.sink.write_all(&data).map_err(TarError::from)?;
        let padding = header::padding_for(data.len() as u64);
        if padding != 0 {
            self.sink.write_all(&vec![0u8; padding as usize]).map_err(TarError::from)?;
        }
        Ok(())
    }

    fn write_pax_extended(&mut self, records: &[(&'static str, String)]) -> TarResult<()> {
        let mut body = Vec::new();
        for (key, value) in records {
            append_pax_record(&mut body, key, value);
        }
        let marker = TarEntry {
            name: "PaxHeaders/entry".into(),
            typeflag: TypeFlag::PaxExtended,
            size: body.len() as u64,
            ..Default::default()
        };
        self.sink.write_all(&header::encode_header_block(&marker)).map_err(TarError::from)?;
        self.sink.write_all(&body).map_err(TarError::from)?;
        let padding = header::padding_for(body.len() as u64);
        if padding != 0 {
            self.sink.write_all(&vec![0u8; padding as usize]).map_err(TarError::from)?;
        }
        Ok(())
    }

    /// Write the two all-zero end-of-archive blocks. Must be called after
    /// the last entry's body has been fully written.
    pub fn finish(mut self) -> TarResult<W> {
        self.finish_current_entry()?;
        self.sink.write_all(&[0u8; BLOCK_SIZE * 2]).map_err(TarError::from)?;
        self.sink.flush().map_err(TarError::from)?;
        self.finished = true;
        Ok(self.sink)
    }
}

impl<W: Write> Write for TarWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let want = (self.current_remaining.min(buf.len() as u64)) as usize;
        if want == 0 {
            return Ok(0);
        }
        let n = self.sink.write(&buf[..want])?;
        self.current_remaining -= n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl<W> Drop for TarWriter<W> {
    fn drop(&mut self) {
        debug_assert!(self.finished || self.current_remaining == 0, "TarWriter dropped with an unfinished entry");
    }
}

fn exceeds_ustar_name(name: &str) -> bool {
    if name.len() <= header::NAME_LEN {
        return false;
    }
    header::split_ustar_path_checked(name).is_none()
}

fn truncate_name(name: &str) -> String {
    name.chars().take(header::NAME_LEN).collect()
}

fn truncate_link(link: &str) -> String {
    link.chars().take(header::LINKNAME_LEN).collect()
}

fn oversize_numeric_fields(entry: &TarEntry) -> Vec<&'static str> {
    let mut out = Vec::new();
    if entry.size > OCTAL_FIELD_LIMIT {
        out.push("size");
    }
    if entry.mtime > OCTAL_FIELD_LIMIT {
        out.push("mtime");
    }
    if entry.uid > OCTAL_FIELD_LIMIT {
        out.push("uid");
    }
    if entry.gid > OCTAL_FIELD_LIMIT {
        out.push("gid");
    }
    out
}

fn numeric_field_value(entry: &TarEntry, field: &str) -> String {
    match field {
        "size" => entry.size.to_string(),
        "mtime" => entry.mtime.to_string(),
        "uid" => entry.uid.to_string(),
        "gid" => entry.gid.to_string(),
        other => unreachable!("unexpected oversize field {other}"),
    }
}

/// Append one self-referential-length PAX record (`"<len> <key>=<value>\n"`)
/// to `out`, solving for the fixed point where `<len>` equals the record's
/// own total byte length.
fn append_pax_record(out: &mut Vec<u8>, key: &str, value: &str) {
    let suffix_len = 1 + key.len() + 1 + value.len() + 1; // ' ' key '=' value '\n'
    let mut digits = suffix_len.to_string().len();
    loop {
        let total = digits + suffix_len;
        if total.to_string().len() == digits {
            out.extend_from_slice(format!("{total} {key}={value}\n").as_bytes());
            return;
        }
        digits += 1;
    }
}
