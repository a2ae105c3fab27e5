//! GZIP member decoder (C4, spec.md §4.4): header parse → DEFLATE body →
//! trailer verify → optional multi-member concatenation.

use std::io::{self, BufRead, Read};

use flate2::bufread::DeflateDecoder;

use super::error::{GzipError, GzipResult};
use super::extra_field::ExtraField;
use super::member::{CompressionLevelClass, GzipReadOptions, MemberHeader, MemberMetadata, MemberTrailer};
use crate::charset::decode_with_replacement;
use crate::checksum::Crc32;
use crate::stream::ByteSource;

const MAGIC: [u8; 2] = [0x1F, 0x8B];

const FLG_FTEXT: u8 = 0x01;
const FLG_FHCRC: u8 = 0x02;
const FLG_FEXTRA: u8 = 0x04;
const FLG_FNAME: u8 = 0x08;
const FLG_FCOMMENT: u8 = 0x10;
const FLG_RESERVED: u8 = 0xE0;

/// Wraps a `BufRead` source, counting every byte consumed from it (for
/// `compressed_bytes_read`, spec.md §4.9).
struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: BufRead> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

impl<R: BufRead> BufRead for CountingReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.count += amt as u64;
        self.inner.consume(amt);
    }
}

enum Body<R: BufRead> {
    Inflating(DeflateDecoder<CountingReader<R>>),
    None,
}

/// A decoding pull-reader over one (or, with `decompress_concatenated`,
/// several) GZIP member(s).
pub struct GzipDecoder<R: BufRead> {
    source: Option<CountingReader<R>>,
    body: Body<R>,
    options: GzipReadOptions,
    header: MemberHeader,
    crc: Crc32,
    produced: u64,
    first_member: bool,
    finished: bool,
    bytes_read: u64,
}

impl<R: BufRead> GzipDecoder<R> {
    pub fn new(source: R, options: GzipReadOptions) -> Self {
        Self {
            source: Some(CountingReader { inner: source, count: 0 }),
            body: Body::None,
            options,
            header: MemberHeader::default(),
            crc: Crc32::new(),
            produced: 0,
            first_member: true,
            finished: false,
            bytes_read: 0,
        }
    }

    fn compressed_bytes_read_raw(&self) -> u64 {
        match (&self.source, &self.body) {
            (Some(s), _) => s.count,
            (None, Body::Inflating(d)) => d.get_ref().count,
            (None, Body::None) => 0,
        }
    }

    /// Parse the next member header. `Ok(None)` means clean termination
    /// (EOF exactly at a member boundary, concatenation enabled).
    fn read_header(&mut self) -> GzipResult<Option<MemberHeader>> {
        let src = self.source.as_mut().expect("source present while awaiting header");

        let mut magic = [0u8; 2];
        let n = read_up_to(src, &mut magic)?;
        if n == 0 {
            if !self.first_member && self.options.decompress_concatenated {
                return Ok(None);
            }
            return Err(GzipError::NotFormat);
        }
        if n < 2 || magic != MAGIC {
            return Err(GzipError::NotFormat);
        }

        let mut one = [0u8; 1];
        src.read_exact(&mut one)?;
        let cm = one[0];
        if cm != 8 {
            return Err(GzipError::UnsupportedMethod(cm));
        }

        src.read_exact(&mut one)?;
        let flg = one[0];
        if flg & FLG_RESERVED != 0 {
            return Err(GzipError::ReservedFlagsSet);
        }

        let mut buf4 = [0u8; 4];
        src.read_exact(&mut buf4)?;
        let mtime = u32::from_le_bytes(buf4);

        src.read_exact(&mut one)?;
        let xfl = one[0];
        src.read_exact(&mut one)?;
        let os = one[0];

        let mut extra_field = None;
        if flg & FLG_FEXTRA != 0 {
            let mut len_buf = [0u8; 2];
            src.read_exact(&mut len_buf)?;
            let xlen = u16::from_le_bytes(len_buf) as usize;
            let mut body = vec![0u8; xlen];
            src.read_exact(&mut body)?;
            if !self.options.ignore_extra_field {
                extra_field = Some(ExtraField::decode(&body)?);
            }
        }

        let filename = if flg & FLG_FNAME != 0 {
            Some(decode_with_replacement(
                &read_nul_terminated(src)?,
                self.options.filename_charset,
            ))
        } else {
            None
        };

        let comment = if flg & FLG_FCOMMENT != 0 {
            Some(decode_with_replacement(
                &read_nul_terminated(src)?,
                self.options.filename_charset,
            ))
        } else {
            None
        };

        let header_crc_present = flg & FLG_FHCRC != 0;
        if header_crc_present {
            let mut crc_buf = [0u8; 2];
            src.read_exact(&mut crc_buf)?; // truncated header CRC-16, not verified (historical)
        }

        let _ = flg & FLG_FTEXT; // text hint, not otherwise observable from this API

        Ok(Some(MemberHeader {
            mtime,
            level: CompressionLevelClass::from_xfl(xfl),
            os,
            filename,
            comment,
            extra_field,
            header_crc_present,
        }))
    }

    fn start_body(&mut self, header: MemberHeader) {
        if let Some(cb) = self.options.on_member_start.as_mut() {
            cb(&header);
        }
        self.header = header;
        self.crc = Crc32::new();
        self.produced = 0;
        let source = self.source.take().expect("source present before body start");
        self.body = Body::Inflating(DeflateDecoder::new(source));
    }

    /// Read the trailer, verify it, invoke `on_member_end`, and return the
    /// underlying source for either the next member or for good.
    fn finish_body(&mut self) -> GzipResult<()> {
        let inflater = match std::mem::replace(&mut self.body, Body::None) {
            Body::Inflating(d) => d,
            Body::None => unreachable!("finish_body called without an active body"),
        };
        let mut source = inflater.into_inner();

        let mut buf4 = [0u8; 4];
        source.read_exact(&mut buf4).map_err(GzipError::from)?;
        let crc32 = u32::from_le_bytes(buf4);
        source.read_exact(&mut buf4).map_err(GzipError::from)?;
        let isize = u32::from_le_bytes(buf4);

        let computed_crc = self.crc.value();
        if crc32 != computed_crc {
            return Err(GzipError::CrcMismatch { expected: crc32, actual: computed_crc });
        }
        let computed_isize = (self.produced & 0xFFFF_FFFF) as u32;
        if isize != computed_isize {
            return Err(GzipError::SizeMismatch { expected: isize, actual: computed_isize });
        }

        self.source = Some(source);
        let trailer = MemberTrailer { crc32, isize };
        if let Some(cb) = self.options.on_member_end.as_mut() {
            cb(&MemberMetadata { header: self.header.clone(), trailer });
        }
        self.first_member = false;
        Ok(())
    }
}

impl<R: BufRead> Read for GzipDecoder<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.finished || out.is_empty() {
            return Ok(0);
        }
        loop {
            match &mut self.body {
                Body::None => match self.read_header() {
                    Ok(Some(header)) => self.start_body(header),
                    Ok(None) => {
                        self.finished = true;
                        return Ok(0);
                    }
                    Err(e) => return Err(to_io_error(e)),
                },
                Body::Inflating(inflater) => {
                    let n = inflater.read(out).map_err(|e| {
                        to_io_error(GzipError::CorruptedInput(e.to_string()))
                    })?;
                    if n > 0 {
                        self.crc.update(&out[..n]);
                        self.produced += n as u64;
                        self.bytes_read += n as u64;
                        return Ok(n);
                    }
                    // Inflater produced nothing: body is complete.
                    self.finish_body().map_err(to_io_error)?;
                    if !self.options.decompress_concatenated {
                        self.finished = true;
                        return Ok(0);
                    }
                    // loop back to read_header for the next member
                }
            }
        }
    }
}

impl<R: BufRead> ByteSource for GzipDecoder<R> {
    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn compressed_bytes_read(&self) -> u64 {
        self.compressed_bytes_read_raw()
    }
}

fn to_io_error(e: GzipError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}

/// Reads up to `buf.len()` bytes, short of EOF. Returns the number of bytes
/// actually read (0 only at a clean EOF before any byte was read).
fn read_up_to<R: Read>(r: &mut R, buf: &mut [u8]) -> GzipResult<usize> {
    let mut total = 0;
    while total < buf.len() {
        match r.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(GzipError::from(e)),
        }
    }
    Ok(total)
}

fn read_nul_terminated<R: Read>(r: &mut R) -> GzipResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        r.read_exact(&mut byte)?;
        if byte[0] == 0 {
            return Ok(out);
        }
        out.push(byte[0]);
    }
}
