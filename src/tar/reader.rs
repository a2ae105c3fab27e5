//! Pull-based TAR archive reader (spec.md §4.7, C7): 512-byte block framing,
//! GNU longname/longlink and PAX extended-header lookahead, and sparse-file
//! reconstruction.

use std::io::{self, Read};

use super::error::{TarError, TarResult};
use super::header::{self, TarEntry, TypeFlag, BLOCK_SIZE};
use super::pax;
use crate::stream::{ByteSource, EntrySource};

/// TAR read-side configuration (spec.md §6.3): only the entry-name/linkname
/// charset is configurable.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarReadOptions {
    pub charset: crate::charset::Charset,
}

impl TarReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn charset(mut self, charset: crate::charset::Charset) -> Self {
        self.charset = charset;
        self
    }
}

enum Payload {
    /// Plain contiguous entry data: `remaining` bytes left, rounded up to
    /// a block boundary when skipping to the next header.
    Plain { remaining: u64, padding: u64 },
    /// Sparse entry: ordered virtual-offset segments backed by physical
    /// bytes read from the archive, zero-filling the gaps between them.
    Sparse { segments: Vec<(u64, u64)>, seg_index: usize, seg_read: u64, virtual_pos: u64, total_size: u64, padding: u64 },
    Exhausted,
}

/// Pull-based TAR reader. Call [`TarReader::next_entry`] to advance, then
/// read the current entry's data through the `Read`/[`ByteSource`] impl.
pub struct TarReader<R> {
    source: R,
    options: TarReadOptions,
    payload: Payload,
    pax_global: Vec<(String, String)>,
    bytes_read: u64,
    ended: bool,
}

impl<R: Read> TarReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_options(source, TarReadOptions::new())
    }

    pub fn with_options(source: R, options: TarReadOptions) -> Self {
        Self {
            source,
            options,
            payload: Payload::Exhausted,
            pax_global: Vec::new(),
            bytes_read: 0,
            ended: false,
        }
    }

    fn skip_current_payload(&mut self) -> TarResult<()> {
        match std::mem::replace(&mut self.payload, Payload::Exhausted) {
            Payload::Exhausted => Ok(()),
            Payload::Plain { remaining, padding } => {
                skip_exact(&mut self.source, remaining + padding)
            }
            Payload::Sparse { total_size, seg_index, seg_read, segments, padding, .. } => {
                let physical_remaining: u64 = segments[seg_index..]
                    .iter()
                    .enumerate()
                    .map(|(i, &(_, n))| if i == 0 { n - seg_read } else { n })
                    .sum();
                let _ = total_size;
                skip_exact(&mut self.source, physical_remaining + padding)
            }
        }
    }

    /// Advance to the next entry, skipping any unread data from the
    /// previous one, and folding GNU longname/longlink and PAX extended
    /// headers into the returned entry.
    pub fn next_entry(&mut self) -> TarResult<Option<TarEntry>> {
        if self.ended {
            return Ok(None);
        }
        self.skip_current_payload()?;

        let mut pending_long_name: Option<String> = None;
        let mut pending_long_link: Option<String> = None;
        let mut pending_pax: Vec<(String, String)> = Vec::new();

        loop {
            let block = match self.read_zero_tolerant_block()? {
                Some(b) => b,
                None => {
                    self.ended = true;
                    return Ok(None);
                }
            };

            let mut entry = match header::parse_header_block(&block)? {
                Some(e) => e,
                None => {
                    self.ended = true;
                    return Ok(None);
                }
            };

            match entry.typeflag {
                TypeFlag::GnuLongName => {
                    pending_long_name = Some(self.read_extension_data(entry.size)?);
                    continue;
                }
                TypeFlag::GnuLongLink => {
                    pending_long_link = Some(self.read_extension_data(entry.size)?);
                    continue;
                }
                TypeFlag::PaxGlobal => {
                    let data = self.read_extension_data(entry.size)?;
                    let records = pax::parse_pax_records(&data)?;
                    pax::merge_records(&mut self.pax_global, records);
                    continue;
                }
                TypeFlag::PaxExtended => {
                    let data = self.read_extension_data(entry.size)?;
                    let records = pax::parse_pax_records(&data)?;
                    pax::merge_records(&mut pending_pax, records);
                    continue;
                }
                _ => {
                    if !self.pax_global.is_empty() {
                        pax::apply_pax_records(&mut entry, &self.pax_global)?;
                    }
                    if !pending_pax.is_empty() {
                        pax::apply_pax_records(&mut entry, &pending_pax)?;
                    }
                    if let Some(name) = pending_long_name.take() {
                        entry.name = name;
                    }
                    if let Some(link) = pending_long_link.take() {
                        entry.link_name = link;
                    }

                    if entry.typeflag == TypeFlag::GnuSparse {
                        entry.sparse = self.read_gnu_old_sparse(&block, &mut entry)?;
                    }

                    self.begin_payload(&entry)?;
                    return Ok(Some(entry));
                }
            }
        }
    }

    /// Reads one header block, tolerating (spec.md §7's historical
    /// tolerance) a missing second all-zero block: a single all-zero
    /// block followed by EOF is accepted as end-of-archive.
    fn read_zero_tolerant_block(&mut self) -> TarResult<Option<[u8; BLOCK_SIZE]>> {
        let mut block = [0u8; BLOCK_SIZE];
        let n = read_up_to(&mut self.source, &mut block)?;
        if n == 0 {
            return Ok(None);
        }
        if n < BLOCK_SIZE {
            return Err(TarError::Truncated);
        }
        if header::is_all_zero(&block) {
            return Ok(None);
        }
        Ok(Some(block))
    }

    fn read_extension_data(&mut self, size: u64) -> TarResult<Vec<u8>> {
        let mut buf = vec![0u8; size as usize];
        self.source.read_exact(&mut buf).map_err(TarError::from)?;
        let padding = padding_for(size);
        skip_exact(&mut self.source, padding)?;
        Ok(buf)
    }

    fn read_gnu_old_sparse(&mut self, block: &[u8; BLOCK_SIZE], entry: &mut TarEntry) -> TarResult<Vec<(u64, u64)>> {
        const SPARSE_FIELD: (usize, usize) = (386, 96);
        const IS_EXTENDED: usize = 482;
        const REAL_SIZE: (usize, usize) = (483, 12);

        let real_size = parse_ascii_octal(&block[REAL_SIZE.0..REAL_SIZE.0 + REAL_SIZE.1]);
        let is_extended = block[IS_EXTENDED] != 0;
        let sparse_field = block[SPARSE_FIELD.0..SPARSE_FIELD.0 + SPARSE_FIELD.1].to_vec();

        let source = &mut self.source;
        let segments = pax::parse_gnu_sparse_header_block(&sparse_field, is_extended, real_size, || {
            let mut ext = [0u8; BLOCK_SIZE];
            source.read_exact(&mut ext)?;
            Ok(ext)
        })?;
        entry.size = real_size;
        Ok(segments)
    }

    fn begin_payload(&mut self, entry: &TarEntry) -> TarResult<()> {
        if entry.sparse.is_empty() {
            let padding = padding_for(entry.size);
            self.payload = Payload::Plain { remaining: entry.size, padding };
        } else {
            let physical_size: u64 = entry.sparse.iter().map(|&(_, n)| n).sum();
            let padding = padding_for(physical_size);
            self.payload = Payload::Sparse {
                segments: entry.sparse.clone(),
                seg_index: 0,
                seg_read: 0,
                virtual_pos: 0,
                total_size: entry.size,
                padding,
            };
        }
        Ok(())
    }
}

fn padding_for(size: u64) -> u64 {
    let rem = size % BLOCK_SIZE as u64;
    if rem == 0 {
        0
    } else {
        BLOCK_SIZE as u64 - rem
    }
}

fn skip_exact<R: Read>(r: &mut R, mut n: u64) -> TarResult<()> {
    let mut buf = [0u8; 4096];
    while n > 0 {
        let chunk = n.min(buf.len() as u64) as usize;
        r.read_exact(&mut buf[..chunk]).map_err(TarError::from)?;
        n -= chunk as u64;
    }
    Ok(())
}

fn read_up_to<R: Read>(r: &mut R, buf: &mut [u8]) -> TarResult<usize> {
    let mut total = 0;
    while total < buf.len() {
        match r.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TarError::from(e)),
        }
    }
    Ok(total)
}

fn parse_ascii_octal(raw: &[u8]) -> u64 {
    let text: String = raw.iter().take_while(|&&b| b != 0).map(|&b| b as char).collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        0
    } else {
        u64::from_str_radix(trimmed, 8).unwrap_or(0)
    }
}

impl<R: Read> Read for TarReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match &mut self.payload {
            Payload::Exhausted => 0,
            Payload::Plain { remaining, .. } => {
                if *remaining == 0 {
                    0
                } else {
                    let want = (*remaining).min(buf.len() as u64) as usize;
                    let n = self.source.read(&mut buf[..want])?;
                    if n == 0 {
                        return Err(to_io_error(TarError::Truncated));
                    }
                    *remaining -= n as u64;
                    n
                }
            }
            Payload::Sparse { segments, seg_index, seg_read, virtual_pos, total_size, .. } => {
                read_sparse(&mut self.source, segments, seg_index, seg_read, virtual_pos, *total_size, buf)?
            }
        };
        self.bytes_read += n as u64;
        Ok(n)
    }
}

#[allow(clippy::too_many_arguments)]
fn read_sparse<R: Read>(
    source: &mut R,
    segments: &[(u64, u64)],
    seg_index: &mut usize,
    seg_read: &mut u64,
    virtual_pos: &mut u64,
    total_size: u64,
    buf: &mut [u8],
) -> io::Result<usize> {
    loop {
        if *virtual_pos >= total_size {
            return Ok(0);
        }
        if *seg_index >= segments.len() {
            // Past the last physical segment: remaining output is a zero-filled gap.
            let want = ((total_size - *virtual_pos).min(buf.len() as u64)) as usize;
            for b in &mut buf[..want] {
                *b = 0;
            }
            *virtual_pos += want as u64;
            return Ok(want);
        }

        let (offset, numbytes) = segments[*seg_index];
        if *virtual_pos < offset {
            // Inside a zero-filled gap before this segment's virtual offset.
            let want = ((offset - *virtual_pos).min(buf.len() as u64)) as usize;
            for b in &mut buf[..want] {
                *b = 0;
            }
            *virtual_pos += want as u64;
            return Ok(want);
        }

        let seg_remaining = numbytes - *seg_read;
        if seg_remaining == 0 {
            *seg_index += 1;
            *seg_read = 0;
            continue;
        }
        let want = seg_remaining.min(buf.len() as u64) as usize;
        let n = source.read(&mut buf[..want])?;
        if n == 0 {
            return Err(to_io_error(TarError::Truncated));
        }
        *seg_read += n as u64;
        *virtual_pos += n as u64;
        return Ok(n);
    }
}

impl<R: Read> ByteSource for TarReader<R> {
    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn compressed_bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> EntrySource for TarReader<R> {
    type Entry = TarEntry;

    fn next_entry(&mut self) -> io::Result<Option<TarEntry>> {
        TarReader::next_entry(self).map_err(to_io_error)
    }

    fn can_read_entry_data(&self, _entry: &TarEntry) -> bool {
        true
    }
}

fn to_io_error(e: TarError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}
