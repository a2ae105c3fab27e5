//! BZIP2 block state machine (C5, spec.md §4.5): stream header, per-block
//! Huffman/MTF/BWT/RLE decode, randomisation, block and combined CRC.

use std::io::{self, Read};

use super::crc::{combine, BlockCrc};
use super::error::{Bzip2Error, Bzip2Result};
use super::huffman::HuffmanTable;
use super::tables::{
    BLOCK_UNIT, DATA_BLOCK_MAGIC, END_OF_STREAM_MAGIC, GROUP_SIZE, MAX_ALPHA_SIZE, MAX_CODE_LEN,
    MAX_GROUPS, MAX_SELECTORS, RAND_NUMS,
};
use crate::bitio::BigEndianBitReader;
use crate::stream::ByteSource;

/// BZIP2 read-side configuration (spec.md §6.3).
#[derive(Debug, Clone, Copy, Default)]
pub struct Bzip2ReadOptions {
    pub decompress_concatenated: bool,
}

impl Bzip2ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decompress_concatenated(mut self, value: bool) -> Self {
        self.decompress_concatenated = value;
        self
    }
}

/// Tracks the legacy "randomised block" derandomisation countdown
/// (spec.md §4.5 step 10).
#[derive(Default)]
struct RandState {
    n_to_go: u32,
    t_pos: usize,
}

impl RandState {
    fn next_mask(&mut self) -> u8 {
        if self.n_to_go == 0 {
            self.n_to_go = RAND_NUMS[self.t_pos] as u32;
            self.t_pos = (self.t_pos + 1) % RAND_NUMS.len();
        }
        self.n_to_go -= 1;
        if self.n_to_go == 1 {
            1
        } else {
            0
        }
    }
}

/// A decoding pull-reader over one (or, with `decompress_concatenated`,
/// several) BZIP2 stream(s).
pub struct Bzip2Decoder<R> {
    bits: BigEndianBitReader<R>,
    options: Bzip2ReadOptions,
    block_size_100k: u32,
    combined_crc: u32,
    started: bool,
    finished: bool,
    pending: Vec<u8>,
    pending_pos: usize,
    bytes_read: u64,
}

impl<R: Read> Bzip2Decoder<R> {
    pub fn new(source: R, options: Bzip2ReadOptions) -> Self {
        Self {
            bits: BigEndianBitReader::new(source),
            options,
            block_size_100k: 0,
            combined_crc: 0,
            started: false,
            finished: false,
            pending: Vec::new(),
            pending_pos: 0,
            bytes_read: 0,
        }
    }

    /// Read `"BZh" <digit>`. `Ok(None)` only when EOF lands cleanly before
    /// any byte of a new stream is consumed (valid between concatenated
    /// streams; a format error everywhere else).
    fn try_read_stream_header(&mut self, allow_eof: bool) -> Bzip2Result<Option<u32>> {
        let b0 = match self.bits.try_read_byte()? {
            Some(b) => b,
            None if allow_eof => return Ok(None),
            None => return Err(Bzip2Error::NotFormat),
        };
        if b0 != b'B' {
            return Err(Bzip2Error::NotFormat);
        }
        let b1 = self.bits.read_bits(8).map_err(Bzip2Error::from)? as u8;
        let b2 = self.bits.read_bits(8).map_err(Bzip2Error::from)? as u8;
        if b1 != b'Z' || b2 != b'h' {
            return Err(Bzip2Error::NotFormat);
        }
        let digit = self.bits.read_bits(8).map_err(Bzip2Error::from)? as u8;
        if !(b'1'..=b'9').contains(&digit) {
            return Err(Bzip2Error::NotFormat);
        }
        Ok(Some((digit - b'0') as u32))
    }

    /// Decode the next chunk of output into `self.pending`, or mark the
    /// stream finished. Loops across concatenated streams internally.
    fn fill_next_block(&mut self) -> Bzip2Result<()> {
        loop {
            if !self.started {
                let bs = self
                    .try_read_stream_header(false)?
                    .expect("allow_eof=false never returns None");
                self.block_size_100k = bs;
                self.combined_crc = 0;
                self.started = true;
            }

            let magic = self.bits.read_bits(48).map_err(Bzip2Error::from)?;
            if magic == DATA_BLOCK_MAGIC {
                let out = self.decode_block()?;
                self.pending = out;
                self.pending_pos = 0;
                return Ok(());
            } else if magic == END_OF_STREAM_MAGIC {
                let stored = self.bits.read_bits(32).map_err(Bzip2Error::from)? as u32;
                if stored != self.combined_crc {
                    return Err(Bzip2Error::CrcMismatch { expected: stored, actual: self.combined_crc });
                }
                if self.options.decompress_concatenated {
                    self.bits.clear_bit_cache();
                    match self.try_read_stream_header(true)? {
                        Some(bs) => {
                            self.block_size_100k = bs;
                            self.combined_crc = 0;
                            continue;
                        }
                        None => {
                            self.finished = true;
                            return Ok(());
                        }
                    }
                } else {
                    self.finished = true;
                    return Ok(());
                }
            } else {
                return Err(Bzip2Error::BadBlockHeader);
            }
        }
    }

    fn decode_block(&mut self) -> Bzip2Result<Vec<u8>> {
        let block_crc_stored = self.bits.read_bits(32).map_err(Bzip2Error::from)? as u32;
        let randomised = self.bits.read_bits(1).map_err(Bzip2Error::from)? != 0;
        let orig_ptr = self.bits.read_bits(24).map_err(Bzip2Error::from)? as u32;

        // In-use symbol map: 16 range flags, then 16 byte flags per set range.
        let mut range_in_use = [false; 16];
        for flag in range_in_use.iter_mut() {
            *flag = self.bits.read_bits(1).map_err(Bzip2Error::from)? != 0;
        }
        let mut in_use = [false; 256];
        for (i, &used) in range_in_use.iter().enumerate() {
            if used {
                for j in 0..16 {
                    in_use[i * 16 + j] = self.bits.read_bits(1).map_err(Bzip2Error::from)? != 0;
                }
            }
        }
        let seq_to_unseq: Vec<u8> = (0u16..256)
            .filter(|&b| in_use[b as usize])
            .map(|b| b as u8)
            .collect();
        let n_in_use = seq_to_unseq.len();
        if n_in_use == 0 {
            return Err(Bzip2Error::CorruptedInput("no symbols marked in use".into()));
        }
        let alpha_size = n_in_use + 2;
        if alpha_size > MAX_ALPHA_SIZE {
            return Err(Bzip2Error::CorruptedInput("alphabet too large".into()));
        }

        let n_groups = self.bits.read_bits(3).map_err(Bzip2Error::from)? as u32;
        if n_groups > MAX_GROUPS {
            return Err(Bzip2Error::CorruptedInput(format!("nGroups {n_groups} exceeds {MAX_GROUPS}")));
        }
        let n_selectors = self.bits.read_bits(15).map_err(Bzip2Error::from)? as u32;

        // Selector MTF values: read all n_selectors unary codes (to stay in
        // sync with the bitstream); keep only the first MAX_SELECTORS
        // (spec.md §3.6's documented historical tolerance).
        let mut selector_mtf = Vec::with_capacity((n_selectors as usize).min(MAX_SELECTORS));
        for i in 0..n_selectors {
            let mut j = 0u32;
            loop {
                if self.bits.read_bits(1).map_err(Bzip2Error::from)? == 0 {
                    break;
                }
                j += 1;
                if j > 255 {
                    return Err(Bzip2Error::CorruptedInput("selector MTF run too long".into()));
                }
            }
            if (i as usize) < MAX_SELECTORS {
                selector_mtf.push(j as u8);
            }
        }

        let mut pos: Vec<u8> = (0..n_groups as u8).collect();
        let mut selectors = Vec::with_capacity(selector_mtf.len());
        for &v in &selector_mtf {
            let v = v as usize;
            if v >= pos.len() {
                return Err(Bzip2Error::CorruptedInput("selector MTF value out of range".into()));
            }
            let tmp = pos[v];
            pos.copy_within(0..v, 1);
            pos[0] = tmp;
            selectors.push(tmp);
        }

        // Per-group canonical-Huffman code lengths and decode tables.
        let mut tables = Vec::with_capacity(n_groups as usize);
        for _ in 0..n_groups {
            let mut curr = self.bits.read_bits(5).map_err(Bzip2Error::from)? as i32;
            let mut lengths = vec![0u8; alpha_size];
            for len_slot in lengths.iter_mut() {
                loop {
                    if curr < 1 || curr > MAX_CODE_LEN as i32 {
                        return Err(Bzip2Error::BadCodeLen);
                    }
                    if self.bits.read_bits(1).map_err(Bzip2Error::from)? == 0 {
                        break;
                    }
                    if self.bits.read_bits(1).map_err(Bzip2Error::from)? == 0 {
                        curr += 1;
                    } else {
                        curr -= 1;
                    }
                }
                *len_slot = curr as u8;
            }
            tables.push(HuffmanTable::build(&lengths)?);
        }

        let capacity = BLOCK_UNIT * self.block_size_100k.max(1) as usize;
        let (ll8, unzftab) =
            self.mtf_and_rle2_decode(&tables, &selectors, &seq_to_unseq, alpha_size, capacity)?;
        let nblock = ll8.len();

        if orig_ptr as usize >= nblock.max(1) || (nblock == 0 && orig_ptr != 0) {
            return Err(Bzip2Error::CorruptedInput("origPtr out of range".into()));
        }

        let raw = inverse_bwt(&ll8, &unzftab, orig_ptr as usize)?;

        let mut rand = RandState::default();
        let derandomised: Vec<u8> = if randomised {
            raw.iter().map(|&b| b ^ rand.next_mask()).collect()
        } else {
            raw
        };

        let decoded = rle1_decode(&derandomised)?;

        let mut crc = BlockCrc::new();
        crc.update(&decoded);
        let computed = crc.finish();
        if computed != block_crc_stored {
            return Err(Bzip2Error::CrcMismatch { expected: block_crc_stored, actual: computed });
        }
        self.combined_crc = combine(self.combined_crc, computed);

        Ok(decoded)
    }

    /// getAndMoveToFrontDecode (spec.md §4.5 step 8): RLE2-decode RUNA/RUNB
    /// pairs and undo the byte-level move-to-front transform, producing the
    /// pre-BWT-inverse byte array `ll8[]` plus its frequency table.
    fn mtf_and_rle2_decode(
        &mut self,
        tables: &[HuffmanTable],
        selectors: &[u8],
        seq_to_unseq: &[u8],
        alpha_size: usize,
        capacity: usize,
    ) -> Bzip2Result<(Vec<u8>, [u32; 256])> {
        let eob = (alpha_size - 1) as u16;
        let mut mtfa: Vec<u8> = seq_to_unseq.to_vec();
        let mut unzftab = [0u32; 256];
        let mut ll8: Vec<u8> = Vec::new();

        let mut group_no: i32 = -1;
        let mut group_pos: usize = 0;
        let mut cur_table: usize = 0;
        let mut run_es: u64 = 0;
        let mut run_n: u32 = 0;

        let flush_run = |ll8: &mut Vec<u8>, unzftab: &mut [u32; 256], mtfa: &[u8], es: u64| -> Bzip2Result<()> {
            if es == 0 {
                return Ok(());
            }
            let byte = mtfa[0];
            if ll8.len() as u64 + es > capacity as u64 {
                return Err(Bzip2Error::CorruptedInput("block overrun during RLE2 run".into()));
            }
            for _ in 0..es {
                ll8.push(byte);
            }
            unzftab[byte as usize] += es as u32;
            Ok(())
        };

        loop {
            if group_pos == 0 {
                group_no += 1;
                let sel = *selectors
                    .get(group_no as usize)
                    .ok_or_else(|| Bzip2Error::CorruptedInput("ran out of selectors".into()))?;
                cur_table = sel as usize;
                group_pos = GROUP_SIZE;
            }
            group_pos -= 1;

            let table = tables
                .get(cur_table)
                .ok_or_else(|| Bzip2Error::CorruptedInput("selector group index out of range".into()))?;
            let sym = table.decode(&mut self.bits)?;

            if sym <= 1 {
                if run_n >= 32 {
                    return Err(Bzip2Error::CorruptedInput("RLE2 run length overflow".into()));
                }
                run_es += ((sym as u64) + 1) << run_n;
                run_n += 1;
                if ll8.len() as u64 + run_es > capacity as u64 {
                    return Err(Bzip2Error::CorruptedInput("block overrun during RLE2 run".into()));
                }
                continue;
            }

            flush_run(&mut ll8, &mut unzftab, &mtfa, run_es)?;
            run_es = 0;
            run_n = 0;

            if sym == eob {
                break;
            }

            let idx = (sym - 1) as usize;
            if idx >= mtfa.len() {
                return Err(Bzip2Error::CorruptedInput("MTF index out of range".into()));
            }
            let byte = mtfa[idx];
            mtfa.copy_within(0..idx, 1);
            mtfa[0] = byte;
            if ll8.len() >= capacity {
                return Err(Bzip2Error::CorruptedInput("block overrun".into()));
            }
            ll8.push(byte);
            unzftab[byte as usize] += 1;
        }

        Ok((ll8, unzftab))
    }
}

/// Inverse Burrows-Wheeler transform (spec.md §4.5 step 9): build the `tt[]`
/// back-pointer chain from the cumulative frequency table and walk it
/// starting at `tt[origPtr]`.
fn inverse_bwt(ll8: &[u8], unzftab: &[u32; 256], orig_ptr: usize) -> Bzip2Result<Vec<u8>> {
    let nblock = ll8.len();
    if nblock == 0 {
        return Ok(Vec::new());
    }
    let mut cftab = [0u32; 257];
    for i in 0..256 {
        cftab[i + 1] = cftab[i] + unzftab[i];
    }
    let mut cursor = cftab;
    let mut tt = vec![0u32; nblock];
    for (i, &ch) in ll8.iter().enumerate() {
        let slot = cursor[ch as usize] as usize;
        if slot >= nblock {
            return Err(Bzip2Error::CorruptedInput("BWT frequency table inconsistent".into()));
        }
        tt[slot] = i as u32;
        cursor[ch as usize] += 1;
    }

    let mut out = Vec::with_capacity(nblock);
    let mut t_pos = *tt.get(orig_ptr).ok_or_else(|| Bzip2Error::CorruptedInput("origPtr out of range".into()))?;
    for _ in 0..nblock {
        let idx = t_pos as usize;
        let byte = *ll8.get(idx).ok_or_else(|| Bzip2Error::CorruptedInput("BWT cursor out of range".into()))?;
        out.push(byte);
        t_pos = *tt.get(idx).ok_or_else(|| Bzip2Error::CorruptedInput("BWT cursor out of range".into()))?;
    }
    Ok(out)
}

/// RLE1 decode (spec.md §4.5 step 10): 4 identical consecutive bytes are
/// followed by one extra byte giving the count of additional repeats.
fn rle1_decode(raw: &[u8]) -> Bzip2Result<Vec<u8>> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        let mut run = 1;
        while run < 4 && i + run < raw.len() && raw[i + run] == b {
            run += 1;
        }
        for _ in 0..run {
            out.push(b);
        }
        i += run;
        if run == 4 {
            let extra = *raw
                .get(i)
                .ok_or_else(|| Bzip2Error::CorruptedInput("RLE1 run-length count byte missing".into()))?;
            out.extend(std::iter::repeat(b).take(extra as usize));
            i += 1;
        }
    }
    Ok(out)
}

impl<R: Read> Read for Bzip2Decoder<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            if self.pending_pos < self.pending.len() {
                let n = (self.pending.len() - self.pending_pos).min(out.len());
                out[..n].copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + n]);
                self.pending_pos += n;
                self.bytes_read += n as u64;
                return Ok(n);
            }
            if self.finished {
                return Ok(0);
            }
            self.fill_next_block().map_err(to_io_error)?;
            if self.pending.is_empty() && self.finished {
                return Ok(0);
            }
        }
    }
}

impl<R: Read> ByteSource for Bzip2Decoder<R> {
    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn compressed_bytes_read(&self) -> u64 {
        self.bits.bytes_read()
    }
}

fn to_io_error(e: Bzip2Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}
