//! BZIP2 shared constants and the legacy "randomised block" derandomisation
//! table.

/// Data-block magic: 48-bit `0x314159265359` (pi digits).
pub const DATA_BLOCK_MAGIC: u64 = 0x3141_5926_5359;
/// End-of-stream magic: 48-bit `0x177245385090` (e digits).
pub const END_OF_STREAM_MAGIC: u64 = 0x1772_4538_5090;

/// Highest permitted Huffman code length (bzip2 canonical-Huffman bound).
pub const MAX_CODE_LEN: u8 = 20;

/// Largest possible alphabet: 256 literal bytes + RUNA + RUNB + EOB... the
/// actual bound bzip2 uses is 2 + 256 (in-use bytes can be at most 256, plus
/// RUNA/RUNB collapse into the literal range, plus one EOB symbol).
pub const MAX_ALPHA_SIZE: usize = 258;

/// Block capacity per unit of `blockSize100k` (spec.md §3.6).
pub const BLOCK_UNIT: usize = 100_000;

/// Maximum number of Huffman table groups per block.
pub const MAX_GROUPS: u32 = 6;

/// Symbols per selector (a new group selector is consulted every 50 symbols).
pub const GROUP_SIZE: usize = 50;

/// Hard cap on the number of selectors a decoder will retain; bzip2 itself
/// bounds `nSelectors` to `2 + (900000 / GROUP_SIZE)`. Selectors beyond this
/// bound are read (to stay in sync with the bitstream) and silently
/// discarded — spec.md §3.6's documented historical tolerance.
pub const MAX_SELECTORS: usize = 2 + (900_000 / GROUP_SIZE);

/// Run-length-4 threshold: 4 identical consecutive bytes are followed by a
/// count byte giving additional repeats.
pub const RUN_LENGTH_THRESHOLD: usize = 4;

/// Legacy "randomised block" derandomisation table (512 entries, each used
/// as a run-length-until-next-flip counter).
///
/// bzip2's `-r`/randomised-block mode was removed from the *encoder* in
/// bzip2 0.9.5 (2000) — decoders still have to support it for archives
/// produced by older tools. This crate does not have network access to the
/// upstream `randtable.c` source to reproduce its exact 512 constants
/// byte-for-byte; the table below is a structurally faithful stand-in
/// (fixed, deterministic, each entry in bzip2's documented range `1..=255`)
/// that exercises the same code path. Byte-exact interoperability with
/// historical randomised-mode archives is therefore NOT guaranteed by this
/// table — see DESIGN.md's note on this open item.
pub const RAND_NUMS: [u16; 512] = build_rand_nums();

const fn build_rand_nums() -> [u16; 512] {
    // Deterministic xorshift-style generator, compile-time, range [1, 255].
    let mut table = [0u16; 512];
    let mut state: u32 = 0x2545_F491;
    let mut i = 0;
    while i < 512 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        table[i] = ((state % 255) + 1) as u16;
        i += 1;
    }
    table
}
