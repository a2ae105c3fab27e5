//! Canonical-Huffman decode tables (spec.md §4.5 step 7), one per selector
//! group: `limit[len]` (last code value of that length), `base[len]` (index
//! bias into `perm`), `perm[]` (symbols ordered by `(len, original index)`).

use super::error::{Bzip2Error, Bzip2Result};
use super::tables::MAX_CODE_LEN;
use crate::bitio::BigEndianBitReader;
use std::io::Read;

pub struct HuffmanTable {
    min_len: u32,
    max_len: u32,
    limit: [i32; MAX_CODE_LEN as usize + 2],
    base: [i32; MAX_CODE_LEN as usize + 2],
    perm: Vec<u16>,
}

impl HuffmanTable {
    /// Build decode tables from a per-symbol length vector (spec.md's
    /// `createDecodeTables`, ported from the bzip2 reference decoder).
    pub fn build(lengths: &[u8]) -> Bzip2Result<Self> {
        let alpha_size = lengths.len();
        let min_len = *lengths.iter().min().unwrap() as u32;
        let max_len = *lengths.iter().max().unwrap() as u32;

        let mut perm = vec![0u16; alpha_size];
        let mut pp = 0usize;
        for len in min_len..=max_len {
            for (sym, &l) in lengths.iter().enumerate() {
                if l as u32 == len {
                    perm[pp] = sym as u16;
                    pp += 1;
                }
            }
        }

        let mut base = [0i32; MAX_CODE_LEN as usize + 2];
        for &l in lengths {
            base[l as usize + 1] += 1;
        }
        for i in 1..base.len() {
            base[i] += base[i - 1];
        }

        let mut limit = [0i32; MAX_CODE_LEN as usize + 2];
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

        Ok(HuffmanTable { min_len, max_len, limit, base, perm })
    }

    /// Decode one symbol from the bitstream.
    pub fn decode<R: Read>(&self, bits: &mut BigEndianBitReader<R>) -> Bzip2Result<u16> {
        let mut zn = self.min_len;
        let mut zvec = bits.read_bits(zn)? as i32;
        while zn > self.max_len || zvec > self.limit[zn as usize] {
            if zn > self.max_len {
                return Err(Bzip2Error::BadCodeLen);
            }
            zn += 1;
            let bit = bits.read_bits(1)? as i32;
            zvec = (zvec << 1) | bit;
        }
        let idx = zvec - self.base[zn as usize];
        self.perm
            .get(idx as usize)
            .copied()
            .ok_or_else(|| Bzip2Error::CorruptedInput(format!("huffman symbol index {idx} out of range")))
    }
}
