//! LHA tripartite header parsing (spec.md §3.4, §4.6): header levels 0/1/2,
//! the extended-header chain, and header-CRC verification.

use std::io::Read;
use std::time::{Duration, SystemTime};

use super::error::{LhaError, LhaResult};
use crate::charset::{decode_with_replacement, Charset};
use crate::checksum::Crc16;

/// LHA read-side configuration (spec.md §6.3).
#[derive(Debug, Clone, Copy, Default)]
pub struct LhaReadOptions {
    pub charset: Charset,
    pub file_separator_char: FileSeparator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileSeparator {
    #[default]
    Slash,
    Backslash,
}

impl FileSeparator {
    fn as_char(self) -> char {
        match self {
            FileSeparator::Slash => '/',
            FileSeparator::Backslash => '\\',
        }
    }
}

impl LhaReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn file_separator_char(mut self, sep: FileSeparator) -> Self {
        self.file_separator_char = sep;
        self
    }
}

/// One archive entry's parsed header (spec.md §3.4).
#[derive(Debug, Clone)]
pub struct LhaEntry {
    pub name: String,
    pub is_directory: bool,
    pub size: u64,
    pub compressed_size: u64,
    pub last_modified: Option<SystemTime>,
    pub compression_method: String,
    pub crc16: u16,
    pub os_id: Option<u8>,
    pub unix_permission: Option<u16>,
    pub unix_uid: Option<u16>,
    pub unix_gid: Option<u16>,
    pub msdos_attributes: Option<u16>,
    pub header_crc: Option<u16>,
}

/// Wraps the byte source, recording every byte consumed so the header-CRC
/// check (spec.md §3.4's invariant) can be computed over the exact bytes
/// that made up the logical header, with the CRC slot zeroed.
struct HeaderReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: Read> HeaderReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, buf: Vec::new() }
    }

    fn read_u8(&mut self) -> LhaResult<u8> {
        let mut b = [0u8; 1];
        self.inner.read_exact(&mut b).map_err(LhaError::from)?;
        self.buf.push(b[0]);
        Ok(b[0])
    }

    fn read_bytes(&mut self, n: usize) -> LhaResult<Vec<u8>> {
        let mut v = vec![0u8; n];
        self.inner.read_exact(&mut v).map_err(LhaError::from)?;
        self.buf.extend_from_slice(&v);
        Ok(v)
    }

    fn read_u16_le(&mut self) -> LhaResult<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32_le(&mut self) -> LhaResult<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn position(&self) -> usize {
        self.buf.len()
    }
}

fn dos_datetime_to_system_time(packed: u32) -> Option<SystemTime> {
    if packed == 0 {
        return None;
    }
    let time = (packed & 0xFFFF) as u16;
    let date = ((packed >> 16) & 0xFFFF) as u16;
    let sec = ((time & 0x1F) * 2) as u64;
    let min = ((time >> 5) & 0x3F) as u64;
    let hour = ((time >> 11) & 0x1F) as u64;
    let day = (date & 0x1F) as u64;
    let month = ((date >> 5) & 0x0F) as u64;
    let year = (((date >> 9) & 0x7F) + 80) as u64; // years since 1980, offset from 1900
    // Rough days-since-epoch via a civil calendar calculation (proleptic Gregorian).
    let y = 1900 + year as i64 - if month <= 2 { 1 } else { 0 };
    let m = if month <= 2 { month as i64 + 12 } else { month as i64 };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as i64;
    let doy = (153 * (m - 3) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    let days_since_epoch = era * 146097 + doe - 719468;
    if days_since_epoch < 0 {
        return None;
    }
    let secs = days_since_epoch as u64 * 86400 + hour * 3600 + min * 60 + sec;
    Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
}

/// Level-0/1 fixed name fields store the path separator as `0xFF`; remap it
/// to the reader's chosen separator, matching the id-0x02 extended header's
/// own conversion (spec.md §3.4).
fn convert_separator(bytes: &[u8], sep: u8) -> Vec<u8> {
    bytes.iter().map(|&b| if b == 0xFF { sep } else { b }).collect()
}

/// Result of parsing one header: `None` at end-of-archive.
pub fn parse_header<R: Read>(source: &mut R, options: &LhaReadOptions) -> LhaResult<Option<LhaEntry>> {
    let mut first = [0u8; 1];
    let n = read_up_to(source, &mut first)?;
    if n == 0 || first[0] == 0 {
        return Ok(None);
    }

    let mut hr = HeaderReader::new(source);
    hr.buf.push(first[0]);

    // Bytes 1..21 of the logical header (we already have byte 0); byte 20
    // (index 20 overall) is the level discriminator for every header shape
    // (spec.md §4.6's "peek the 20th byte").
    let b1 = hr.read_u8()?;
    let method = hr.read_bytes(5)?;
    let compressed_size_raw = hr.read_u32_le()?;
    let original_size_raw = hr.read_u32_le()?;
    let datetime_raw = hr.read_u32_le()?;
    let attribute = hr.read_u8()?;
    let level = hr.read_u8()?;

    let method_tag = String::from_utf8_lossy(&method).into_owned();
    let is_directory = method_tag == "-lhd-";

    match level {
        0 => parse_level0_tail(hr, first[0], b1, method_tag, compressed_size_raw, original_size_raw, datetime_raw, attribute, is_directory, options),
        1 => parse_level1_tail(hr, b1, method_tag, compressed_size_raw, original_size_raw, datetime_raw, attribute, is_directory, options),
        2 => parse_level2_tail(hr, method_tag, compressed_size_raw, original_size_raw, datetime_raw, attribute, is_directory, options),
        other => Err(LhaError::InvalidHeaderLevel(other)),
    }
}

#[allow(clippy::too_many_arguments)]
fn parse_level0_tail<R: Read>(
    mut hr: HeaderReader<R>,
    h_size: u8,
    checksum_byte: u8,
    method: String,
    compressed_size: u32,
    original_size: u32,
    datetime: u32,
    attribute: u8,
    is_directory: bool,
    options: &LhaReadOptions,
) -> LhaResult<Option<LhaEntry>> {
    let _ = h_size;
    let name_len = hr.read_u8()? as usize;
    let name_bytes = hr.read_bytes(name_len)?;
    let crc16 = hr.read_u16_le()?;

    // Checksum covers every header byte after the (size, checksum) pair.
    let checksum: u8 = hr.buf[2..].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if checksum != checksum_byte {
        return Err(LhaError::BadChecksum);
    }

    let name_bytes = convert_separator(&name_bytes, options.file_separator_char.as_char() as u8);
    let name = decode_with_replacement(&name_bytes, options.charset);
    Ok(Some(LhaEntry {
        name,
        is_directory,
        size: if is_directory { 0 } else { original_size as u64 },
        compressed_size: compressed_size as u64,
        last_modified: dos_datetime_to_system_time(datetime),
        compression_method: method,
        crc16,
        os_id: None,
        unix_permission: None,
        unix_uid: None,
        unix_gid: None,
        msdos_attributes: Some(attribute as u16),
        header_crc: None,
    }))
}

#[allow(clippy::too_many_arguments)]
fn parse_level1_tail<R: Read>(
    mut hr: HeaderReader<R>,
    checksum_byte: u8,
    method: String,
    compressed_size: u32,
    original_size: u32,
    datetime: u32,
    attribute: u8,
    is_directory: bool,
    options: &LhaReadOptions,
) -> LhaResult<Option<LhaEntry>> {
    let name_len = hr.read_u8()? as usize;
    let name_bytes = hr.read_bytes(name_len)?;
    let crc16 = hr.read_u16_le()?;

    let checksum: u8 = hr.buf[2..].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if checksum != checksum_byte {
        return Err(LhaError::BadChecksum);
    }

    let name_bytes = convert_separator(&name_bytes, options.file_separator_char.as_char() as u8);
    let mut entry = LhaEntry {
        name: decode_with_replacement(&name_bytes, options.charset),
        is_directory,
        size: if is_directory { 0 } else { original_size as u64 },
        compressed_size: compressed_size as u64,
        last_modified: dos_datetime_to_system_time(datetime),
        compression_method: method,
        crc16,
        os_id: None,
        unix_permission: None,
        unix_uid: None,
        unix_gid: None,
        msdos_attributes: Some(attribute as u16),
        header_crc: None,
    };

    let crc_slot = read_extended_headers(&mut hr, &mut entry, options)?;
    verify_header_crc(&hr.buf, crc_slot, &mut entry)?;
    Ok(Some(entry))
}

fn parse_level2_tail<R: Read>(
    mut hr: HeaderReader<R>,
    method: String,
    compressed_size: u32,
    original_size: u32,
    unix_mtime: u32,
    attribute: u8,
    is_directory: bool,
    options: &LhaReadOptions,
) -> LhaResult<Option<LhaEntry>> {
    // Fixed level-2 header carries the file CRC-16 at bytes 21-22 and the
    // OS-id at byte 23; the extended-header chain starts right after.
    let crc16 = hr.read_u16_le()?;
    let os_id = hr.read_u8()?;

    let mut entry = LhaEntry {
        name: String::new(),
        is_directory,
        size: if is_directory { 0 } else { original_size as u64 },
        compressed_size: compressed_size as u64,
        last_modified: if unix_mtime == 0 {
            None
        } else {
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(unix_mtime as u64))
        },
        compression_method: method,
        crc16,
        os_id: Some(os_id),
        unix_permission: None,
        unix_uid: None,
        unix_gid: None,
        msdos_attributes: Some(attribute as u16),
        header_crc: None,
    };

    let crc_slot = read_extended_headers(&mut hr, &mut entry, options)?;
    verify_header_crc(&hr.buf, crc_slot, &mut entry)?;
    Ok(Some(entry))
}

/// Reads the extended-header chain until a zero-length header terminates
/// it, folding recognised ids into `entry`. Returns the byte offset within
/// the accumulated header buffer of the 2-byte header-CRC slot, if a
/// `0x00` common header was seen.
fn read_extended_headers<R: Read>(
    hr: &mut HeaderReader<R>,
    entry: &mut LhaEntry,
    options: &LhaReadOptions,
) -> LhaResult<Option<usize>> {
    let mut crc_slot = None;
    let mut name_parts: Vec<u8> = Vec::new();
    let mut dir_parts: Vec<u8> = Vec::new();
    let mut have_name = false;
    let mut have_dir = false;

    loop {
        let len = hr.read_u16_le()? as usize;
        if len == 0 {
            break;
        }
        if len < 3 {
            return Err(LhaError::CorruptedInput("extended header length too short".into()));
        }
        let id = hr.read_u8()?;
        let body_offset = hr.position();
        let body = hr.read_bytes(len - 3)?;
        match id {
            0x00 => {
                if body.len() >= 2 {
                    entry.header_crc = Some(u16::from_le_bytes([body[0], body[1]]));
                    crc_slot = Some(body_offset);
                }
            }
            0x01 => {
                name_parts.extend_from_slice(&body);
                have_name = true;
            }
            0x02 => {
                let sep = options.file_separator_char.as_char() as u8;
                for &b in &body {
                    dir_parts.push(if b == 0xFF { sep } else { b });
                }
                have_dir = true;
            }
            0x40 => {
                if body.len() >= 2 {
                    entry.msdos_attributes = Some(u16::from_le_bytes([body[0], body[1]]));
                }
            }
            0x50 => {
                if body.len() >= 2 {
                    entry.unix_permission = Some(u16::from_le_bytes([body[0], body[1]]));
                }
            }
            0x51 => {
                if body.len() >= 4 {
                    entry.unix_gid = Some(u16::from_le_bytes([body[0], body[1]]));
                    entry.unix_uid = Some(u16::from_le_bytes([body[2], body[3]]));
                }
            }
            0x54 => {
                if body.len() >= 4 {
                    let secs = u32::from_le_bytes([body[0], body[1], body[2], body[3]]);
                    entry.last_modified = Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs as u64));
                }
            }
            _ => {}
        }
    }

    if have_dir || have_name {
        let mut sep = options.file_separator_char.as_char().to_string();
        if !have_dir {
            sep.clear();
        }
        let dir = decode_with_replacement(&dir_parts, options.charset);
        let name = decode_with_replacement(&name_parts, options.charset);
        entry.name = if have_dir && have_name {
            format!("{dir}{name}")
        } else if have_dir {
            if dir.ends_with(options.file_separator_char.as_char()) {
                dir
            } else {
                format!("{dir}{sep}")
            }
        } else {
            name
        };
    }

    Ok(crc_slot)
}

fn verify_header_crc(header_bytes: &[u8], crc_slot: Option<usize>, entry: &mut LhaEntry) -> LhaResult<()> {
    let Some(offset) = crc_slot else { return Ok(()) };
    let expected = entry.header_crc.unwrap();
    let mut zeroed = header_bytes.to_vec();
    zeroed[offset] = 0;
    zeroed[offset + 1] = 0;
    let actual = Crc16::of(&zeroed);
    if actual != expected {
        return Err(LhaError::BadHeaderCrc { expected, actual });
    }
    Ok(())
}

fn read_up_to<R: Read>(r: &mut R, buf: &mut [u8]) -> LhaResult<usize> {
    let mut total = 0;
    while total < buf.len() {
        match r.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(LhaError::from(e)),
        }
    }
    Ok(total)
}
