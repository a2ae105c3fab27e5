//! Canonical-Huffman decode table shared by the LHA "C" (literal/length)
//! and "P" (distance) trees, plus the degenerate single-symbol case
//! spec.md §4.6 calls out explicitly: when a tree's length sequence has
//! exactly one non-zero entry, the wire format transmits that one symbol
//! directly (a code count of zero) instead of a one-bit code, and decoding
//! it consumes no further bits at all.

use super::error::{LhaError, LhaResult};
use crate::bitio::BigEndianBitReader;
use std::io::Read;

const MAX_CODE_LEN: u8 = 16;

pub enum CodeTree {
    /// Every occurrence of this tree decodes to the same symbol, consuming
    /// zero bits (spec.md's LH5 degenerate-distance-tree edge case,
    /// generalized to either tree).
    Single(u16),
    Huffman {
        min_len: u32,
        max_len: u32,
        limit: Vec<i32>,
        base: Vec<i32>,
        perm: Vec<u16>,
    },
}

impl CodeTree {
    /// Build from a per-symbol length vector (0 = unused). At least one
    /// entry must be non-zero.
    pub fn build(lengths: &[u8]) -> LhaResult<Self> {
        let used: Vec<(usize, u8)> = lengths
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l > 0)
            .map(|(i, &l)| (i, l))
            .collect();
        if used.is_empty() {
            return Err(LhaError::CorruptedInput("huffman tree with no symbols".into()));
        }
        if used.len() == 1 {
            return Ok(CodeTree::Single(used[0].0 as u16));
        }

        let min_len = used.iter().map(|&(_, l)| l as u32).min().unwrap();
        let max_len = used.iter().map(|&(_, l)| l as u32).max().unwrap();
        if max_len > MAX_CODE_LEN as u32 {
            return Err(LhaError::CorruptedInput("huffman code length out of range".into()));
        }

        let mut perm = Vec::with_capacity(used.len());
        for len in min_len..=max_len {
            for &(sym, l) in &used {
                if l as u32 == len {
                    perm.push(sym as u16);
                }
            }
        }

        let mut base = vec![0i32; MAX_CODE_LEN as usize + 2];
        for &(_, l) in &used {
            base[l as usize + 1] += 1;
        }
        for i in 1..base.len() {
            base[i] += base[i - 1];
        }

        let mut limit = vec![0i32; MAX_CODE_LEN as usize + 2];
        let mut vec_ = 0i32;
        for len in min_len..=max_len {
            let li = len as usize;
            vec_ += base[li + 1] - base[li];
            limit[li] = vec_ - 1;
            vec_ <<= 1;
        }
        for len in (min_len + 1)..=max_len {
            let li = len as usize;
            base[li] = ((limit[li - 1] + 1) << 1) - base[li];
        }

        Ok(CodeTree::Huffman { min_len, max_len, limit, base, perm })
    }

    pub fn decode<R: Read>(&self, bits: &mut BigEndianBitReader<R>) -> LhaResult<u16> {
        match self {
            CodeTree::Single(sym) => Ok(*sym),
            CodeTree::Huffman { min_len, max_len, limit, base, perm } => {
                let mut zn = *min_len;
                let mut zvec = bits.read_bits(zn).map_err(LhaError::from)? as i32;
                while zn > *max_len || zvec > limit[zn as usize] {
                    if zn > *max_len {
                        return Err(LhaError::CorruptedInput("huffman code length out of range".into()));
                    }
                    zn += 1;
                    let bit = bits.read_bits(1).map_err(LhaError::from)? as i32;
                    zvec = (zvec << 1) | bit;
                }
                let idx = zvec - base[zn as usize];
                perm.get(idx as usize)
                    .copied()
                    .ok_or_else(|| LhaError::CorruptedInput(format!("huffman symbol index {idx} out of range")))
            }
        }
    }
}
