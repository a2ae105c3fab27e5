//! Constants for the LH4/5/6/7 sliding-window + canonical-Huffman body codec
//! (spec.md §4.6), following the widely-reused `-lh5-` family parameters
//! (window size aside, lh4/5/6/7 share one algorithm shape).

/// Minimum match length worth coding as a back-reference; shorter runs are
/// emitted as literals.
pub const THRESHOLD: usize = 3;

/// Maximum match length a single "length" code can represent.
pub const MAX_MATCH: usize = 256;

/// Literal+length ("C") alphabet size: 256 literal bytes plus one code per
/// match length in `THRESHOLD..=MAX_MATCH`.
pub const NC: usize = 256 + (MAX_MATCH - THRESHOLD + 1);

/// Temporary ("PT") alphabet size used to Huffman-decode the C table's own
/// code-length sequence.
pub const NT: usize = 19;

/// Bit width of the repeat-count field following a "19" escape in the
/// C-table length RLE (spec.md §4.6's "code-length table for the
/// literal/length alphabet").
pub const CBIT: u32 = 9;

/// Bit width of the `n` (code count) field when reading the PT table used
/// for the C-table's lengths.
pub const TBIT: u32 = 5;

/// Index at which `read_pt_len`'s 2-bit skip shortcut kicks in while
/// reading the PT table's own lengths.
pub const PT_SPECIAL: usize = 3;

/// Per-method sliding window size in bits (`dicbit`); window size is
/// `1 << dicbit`. Distance-alphabet size is `dicbit + 1`.
pub fn dicbit_for_method(tag: &str) -> Option<u32> {
    match tag {
        "-lh4-" => Some(12), // 4 KiB
        "-lh5-" => Some(13), // 8 KiB
        "-lh6-" => Some(15), // 32 KiB
        "-lh7-" => Some(16), // 64 KiB
        _ => None,
    }
}

/// Bit width of the `n` (code count) field when reading the PT table used
/// for the distance alphabet; lh6/lh7's larger alphabet needs one more bit
/// than lh4/lh5's.
pub fn pbit_for_dicbit(dicbit: u32) -> u32 {
    if dicbit <= 13 {
        4
    } else {
        5
    }
}
