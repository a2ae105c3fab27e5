//! LH4/5/6/7 body decoder (spec.md §4.6): sliding-window LZ77 with two
//! canonical-Huffman trees (literal/length "C", distance "P") refreshed
//! every block, each tree's own code lengths carried by a small Huffman-
//! coded "PT" meta-table with a run-length escape for zero lengths.

use super::error::{LhaError, LhaResult};
use super::huffman::CodeTree;
use super::tables::{CBIT, MAX_MATCH, NC, NT, PT_SPECIAL, TBIT, THRESHOLD};
use crate::bitio::BigEndianBitReader;
use std::io::Read;

/// Reads the `PT` meta-table: `n` code lengths (3 bits each, with a `7`
/// escape extending by further 1-bits), used to build a [`CodeTree`] for
/// decoding either the C table's or the (read directly, no further RLE
/// layer) distance table's own lengths.
///
/// `n == 0` is itself the degenerate single-symbol case: the one symbol in
/// use is given directly as an `nbit`-bit value with no length table at
/// all (spec.md's LH5 edge case, surfaced generically through
/// [`CodeTree::Single`]).
fn read_pt_len<R: Read>(
    bits: &mut BigEndianBitReader<R>,
    alphabet_size: usize,
    nbit: u32,
    special: usize,
) -> LhaResult<CodeTree> {
    let n = bits.read_bits(nbit).map_err(LhaError::from)? as usize;
    if n == 0 {
        let c = bits.read_bits(nbit).map_err(LhaError::from)? as u16;
        return Ok(CodeTree::Single(c));
    }
    if n > alphabet_size {
        return Err(LhaError::CorruptedInput("PT table code count exceeds alphabet".into()));
    }
    let mut lengths = vec![0u8; alphabet_size];
    let mut i = 0;
    while i < n {
        let mut c = bits.read_bits(3).map_err(LhaError::from)? as u8;
        if c == 7 {
            loop {
                if bits.read_bits(1).map_err(LhaError::from)? == 0 {
                    break;
                }
                c += 1;
                if c as u32 > 32 {
                    return Err(LhaError::CorruptedInput("PT code length escape overflow".into()));
                }
            }
        }
        lengths[i] = c;
        i += 1;
        if i == special {
            let skip = bits.read_bits(2).map_err(LhaError::from)? as usize;
            for _ in 0..skip {
                if i >= n {
                    break;
                }
                lengths[i] = 0;
                i += 1;
            }
        }
    }
    CodeTree::build(&lengths)
}

/// Reads the `C` (literal/length) table's lengths, themselves Huffman-coded
/// through `pt`, with a run-length escape for stretches of unused symbols.
fn read_c_len<R: Read>(bits: &mut BigEndianBitReader<R>, pt: &CodeTree) -> LhaResult<CodeTree> {
    let n = bits.read_bits(TBIT).map_err(LhaError::from)? as usize;
    if n == 0 {
        let c = bits.read_bits(TBIT).map_err(LhaError::from)? as u16;
        return Ok(CodeTree::Single(c));
    }
    if n > NC {
        return Err(LhaError::CorruptedInput("C table code count exceeds alphabet".into()));
    }
    let mut lengths = vec![0u8; NC];
    let mut i = 0;
    while i < n {
        let sym = pt.decode(bits)?;
        match sym {
            0 => {
                i += 1;
            }
            1 => {
                let count = bits.read_bits(4).map_err(LhaError::from)? as usize + 3;
                for _ in 0..count {
                    if i >= n {
                        break;
                    }
                    i += 1;
                }
            }
            2 => {
                let count = bits.read_bits(CBIT).map_err(LhaError::from)? as usize + 20;
                for _ in 0..count {
                    if i >= n {
                        break;
                    }
                    i += 1;
                }
            }
            other => {
                if i >= NC {
                    return Err(LhaError::CorruptedInput("C table index out of range".into()));
                }
                lengths[i] = (other - 2) as u8;
                i += 1;
            }
        }
    }
    CodeTree::build(&lengths)
}

struct Block {
    remaining: u32,
    c_tree: CodeTree,
    p_tree: CodeTree,
}

/// Stateful LH4/5/6/7 body decoder: one instance per archive entry. `read`
/// yields exactly `uncompressed_size` bytes in total; the caller drives it
/// via [`LhaBodyDecoder::read_exact_payload`] or manual `read` calls.
pub struct LhaBodyDecoder<R> {
    bits: BigEndianBitReader<R>,
    window: Vec<u8>,
    window_mask: usize,
    cursor: usize,
    produced: u64,
    total_size: u64,
    block: Option<Block>,
    pbit: u32,
    np: usize,
}

impl<R: Read> LhaBodyDecoder<R> {
    pub fn new(source: R, dicbit: u32, pbit: u32, total_size: u64) -> Self {
        let window_size = 1usize << dicbit;
        Self {
            bits: BigEndianBitReader::new(source),
            window: vec![0u8; window_size],
            window_mask: window_size - 1,
            cursor: 0,
            produced: 0,
            total_size,
            block: None,
            pbit,
            np: dicbit as usize + 1,
        }
    }

    fn start_block(&mut self) -> LhaResult<()> {
        let block_size = self.bits.read_bits(16).map_err(LhaError::from)? as u32;
        if block_size == 0 {
            return Err(LhaError::CorruptedInput("zero-length block before declared size reached".into()));
        }
        let pt = read_pt_len(&mut self.bits, NT, TBIT, PT_SPECIAL)?;
        let c_tree = read_c_len(&mut self.bits, &pt)?;
        let p_tree = read_pt_len(&mut self.bits, self.np, self.pbit, usize::MAX)?;
        self.block = Some(Block { remaining: block_size, c_tree, p_tree });
        Ok(())
    }

    /// Decodes the next position (back-reference distance) using `p_tree`,
    /// honouring spec.md's degenerate-tree edge case: a [`CodeTree::Single`]
    /// distance tree returns its one symbol as the final distance directly,
    /// consuming no extra bits at all.
    fn decode_position(&mut self) -> LhaResult<usize> {
        if let CodeTree::Single(sym) = &self.block.as_ref().unwrap().p_tree {
            return Ok(*sym as usize);
        }
        let c = self.block.as_ref().unwrap().p_tree.decode(&mut self.bits)?;
        if c == 0 {
            return Ok(0);
        }
        let extra_bits = (c - 1) as u32;
        let extra = self.bits.read_bits(extra_bits).map_err(LhaError::from)? as usize;
        Ok((1usize << (c - 1)) + extra)
    }

    fn push_byte(&mut self, byte: u8, out: &mut Vec<u8>) {
        self.window[self.cursor] = byte;
        self.cursor = (self.cursor + 1) & self.window_mask;
        out.push(byte);
        self.produced += 1;
    }

    /// Decode the whole payload into `out` (appended). Matches spec.md's
    /// "decoder stops after `size` output bytes" contract.
    pub fn decode_all(&mut self) -> LhaResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.total_size as usize);
        while self.produced < self.total_size {
            if self.block.as_ref().map(|b| b.remaining == 0).unwrap_or(true) {
                self.start_block()?;
            }
            let block = self.block.as_mut().unwrap();
            block.remaining -= 1;
            let sym = block.c_tree.decode(&mut self.bits)?;
            if (sym as usize) < 256 {
                if self.produced >= self.total_size {
                    return Err(LhaError::CorruptedInput("decoded past declared size".into()));
                }
                self.push_byte(sym as u8, &mut out);
            } else {
                let length = sym as usize - 256 + THRESHOLD;
                if length > MAX_MATCH {
                    return Err(LhaError::CorruptedInput("match length out of range".into()));
                }
                let position = self.decode_position()?;
                if position >= self.window.len() {
                    return Err(LhaError::CorruptedInput("back-reference distance exceeds window".into()));
                }
                if self.produced + length as u64 > self.total_size {
                    return Err(LhaError::CorruptedInput("decoded past declared size".into()));
                }
                for _ in 0..length {
                    let src = (self.cursor + self.window.len() - position - 1) & self.window_mask;
                    let byte = self.window[src];
                    self.push_byte(byte, &mut out);
                }
            }
        }
        Ok(out)
    }
}
