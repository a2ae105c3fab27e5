// Unit tests for task-009: HC sequence encoder (`encode_sequence`).
//
// Tests verify behavioural parity with lz4hc.c v1.10.0, lines 262–355:
//   `LZ4HC_encodeSequence` → `encode_sequence`
//
// Coverage:
//   - Basic sequence (small literal + small match — both fit in token nibbles)
//   - Zero-length literal run (anchor == ip)
//   - Large literal length (>= RUN_MASK=15) — extension bytes in output
//   - Very large literal (multiple 255-blocks)
//   - Large match length (>= ML_MASK=15) — extension bytes in output
//   - Very large match (>= 510+15) — the 510-loop fast path
//   - Offset encoded as little-endian u16
//   - State advancement: ip and anchor updated correctly
//   - NotLimited: no output-bound checks
//   - LimitedOutput: OutputTooSmall returned when buffer too small for literals
//   - LimitedOutput: OutputTooSmall returned when buffer too small for match
//   - LimitedOutput: success when buffer exactly large enough

use arcodec::block::types::LimitedOutputDirective;
use arcodec::hc::encode::{encode_sequence, Lz4HcError};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Allocate an input buffer pre-filled with `0xAA` bytes and return it plus
/// raw pointer helpers, all heap-allocated so that MIRI / address-sanitizer
/// can check bounds.
fn make_input(size: usize) -> Vec<u8> {
    vec![0xAA_u8; size]
}

fn make_output(size: usize) -> Vec<u8> {
    vec![0u8; size]
}

// ─────────────────────────────────────────────────────────────────────────────
// Basic sequence: 0 literals + MINMATCH match (smallest possible sequence)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn basic_zero_literal_min_match() {
    // literal_length = 0, match_length = 4 (MINMATCH), offset = 1
    // Expected token = 0x00 (lit_nibble=0, ml_nibble=0 because ml_remaining=0)
    // Output: [token(1)] + offset_le16(2) = 3 bytes
    let input = make_input(32);
    let mut output = make_output(64);

    unsafe {
        let ip_start = input.as_ptr();
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip: *const u8 = ip_start;
        let mut op: *mut u8 = op_start;
        let mut anchor: *const u8 = ip_start; // anchor == ip → 0 literals

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            4, // match_length = MINMATCH
            1, // offset
            LimitedOutputDirective::NotLimited,
            oend,
        );

        assert!(result.is_ok());

        let written = op.offset_from(op_start) as usize;
        assert_eq!(written, 3); // token + 2-byte offset

        // Token: high nibble = 0 (literal_length=0), low nibble = 0 (ml_remaining=0)
        assert_eq!(output[0], 0x00);
        // Offset 1 as little-endian u16
        assert_eq!(output[1], 0x01);
        assert_eq!(output[2], 0x00);

        // ip must advance by match_length; anchor must equal new ip
        assert_eq!(ip, ip_start.add(4));
        assert_eq!(anchor, ip);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Basic sequence: small literal + small match (both in nibble range)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn basic_small_literal_small_match() {
    // literal_length = 3, match_length = 7, offset = 5
    // ml_remaining = 7 - 4 = 3
    // token = (3 << 4) | 3 = 0x33
    // Output: token(1) + 3 literal bytes + offset_le16(2) = 6 bytes
    let literal_bytes = b"ABC";
    let match_start = b"ABCDEFGHIJKLMN"; // input backing store
    let mut output = make_output(64);

    unsafe {
        // Build a contiguous input: literal_bytes followed by more data
        let mut input = Vec::with_capacity(32);
        input.extend_from_slice(literal_bytes);
        input.extend_from_slice(b"XYZXYZXYZ");

        let ip_start = input.as_ptr().add(3); // ip points past the literal bytes
        let anchor_start = input.as_ptr(); // anchor at start → 3 literals

        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip: *const u8 = ip_start;
        let mut op: *mut u8 = op_start;
        let mut anchor: *const u8 = anchor_start;

        let _ = match_start; // suppress unused warning

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            7, // match_length
            5, // offset
            LimitedOutputDirective::NotLimited,
            oend,
        );

        assert!(result.is_ok());

        let written = op.offset_from(op_start) as usize;
        // token(1) + literals(3) + offset(2) = 6
        assert_eq!(written, 6);

        // Token: high nibble = 3 (literals), low nibble = 3 (ml_remaining)
        assert_eq!(output[0], 0x33);
        // Literal bytes
        assert_eq!(&output[1..4], b"ABC");
        // Offset 5 LE
        assert_eq!(output[4], 0x05);
        assert_eq!(output[5], 0x00);

        // ip advanced by match_length (7); anchor == new ip
        assert_eq!(ip, ip_start.add(7));
        assert_eq!(anchor, ip);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Large literal length: >= RUN_MASK (15) — extension bytes required
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn large_literal_exactly_runmask() {
    // literal_length = 15 = RUN_MASK
    // token high nibble = 0xF; extension: remaining = 15-15 = 0 → one byte 0x00
    // match_length = 4 (MINMATCH), ml_remaining = 0 → token low nibble = 0
    // Output: token(1) + ext_byte(1) + 15 literals + offset(2) = 19 bytes
    let lit_len = 15usize;
    let mut input = vec![0xBB_u8; lit_len + 32];
    let mut output = make_output(128);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr.add(lit_len);
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            4, // match_length = MINMATCH
            1,
            LimitedOutputDirective::NotLimited,
            oend,
        );

        assert!(result.is_ok());

        let written = op.offset_from(op_start) as usize;
        // token(1) + ext(1) + literals(15) + offset(2) = 19
        assert_eq!(written, 19);

        // Token high nibble = 0xF, low nibble = 0x0
        assert_eq!(output[0], 0xF0);
        // Extension byte = 0 (remaining = 0)
        assert_eq!(output[1], 0x00);
        // Literals (15 × 0xBB)
        assert!(output[2..17].iter().all(|&b| b == 0xBB));
        // Offset
        assert_eq!(output[17], 0x01);
        assert_eq!(output[18], 0x00);
    }
}

#[test]
fn large_literal_multi_extension_bytes() {
    // literal_length = 15 + 255 + 255 + 100 = 625
    // Extension bytes: 255, 255, 100 (remaining after 510 = 100, remaining after 15 = 610 → wait)
    // remaining after subtracting RUN_MASK(15) = 625 - 15 = 610
    // 610 >= 255 → write 255, remaining = 355
    // 355 >= 255 → write 255, remaining = 100
    // 100 < 255 → write 100
    // So extension bytes: [255, 255, 100], then 625 literal bytes
    let lit_len = 625usize;
    let mut input = vec![0xCC_u8; lit_len + 64];
    let mut output = make_output(lit_len + 64);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr.add(lit_len);
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            4,
            1,
            LimitedOutputDirective::NotLimited,
            oend,
        );

        assert!(result.is_ok());

        // token(1) + ext_bytes(3) + literals(625) + offset(2) = 631
        let written = op.offset_from(op_start) as usize;
        assert_eq!(written, 631);

        assert_eq!(output[0], 0xF0); // token: lit=0xF, ml=0x0
        assert_eq!(output[1], 255);
        assert_eq!(output[2], 255);
        assert_eq!(output[3], 100);
        // Literals
        assert!(output[4..629].iter().all(|&b| b == 0xCC));
        // Offset
        assert_eq!(output[629], 0x01);
        assert_eq!(output[630], 0x00);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Large match length: >= ML_MASK (15) — extension bytes required
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn large_match_exactly_mlmask_plus_minmatch() {
    // match_length = 4 + 15 = 19; ml_remaining = 15 = ML_MASK
    // token low nibble = 0xF; extension: remaining = 15-15 = 0 → one byte 0x00
    // literal_length = 0
    // Output: token(1) + offset(2) + ext_byte(1) = 4 bytes
    let mut input = vec![0xDD_u8; 64];
    let mut output = make_output(64);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr; // 0 literals
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            19, // match_length = 4 + 15
            1,
            LimitedOutputDirective::NotLimited,
            oend,
        );

        assert!(result.is_ok());

        let written = op.offset_from(op_start) as usize;
        // token(1) + offset(2) + ext(1) = 4
        assert_eq!(written, 4);

        // Token: high nibble = 0 (no literals), low nibble = 0xF
        assert_eq!(output[0], 0x0F);
        // Offset LE
        assert_eq!(output[1], 0x01);
        assert_eq!(output[2], 0x00);
        // Extension byte = 0
        assert_eq!(output[3], 0x00);
    }
}

#[test]
fn large_match_510_fast_path() {
    // ml_remaining = ML_MASK(15) + 510 + 77 = 602 → ml_remaining after -= ML_MASK = 602
    // match_length = 4 + 15 + 602 = 621
    // After subtracting ML_MASK: remaining = 602
    // 602 >= 510 → write 255,255; remaining = 92
    // 92 < 255 → write 92
    // Extension bytes: [255, 255, 92]
    let match_len = 4 + 15 + 602; // = 621
    let mut input = vec![0xEE_u8; match_len + 64];
    let mut output = make_output(64);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr; // 0 literals
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            match_len as i32,
            1,
            LimitedOutputDirective::NotLimited,
            oend,
        );

        assert!(result.is_ok());

        let written = op.offset_from(op_start) as usize;
        // token(1) + offset(2) + ext(3) = 6
        assert_eq!(written, 6);

        assert_eq!(output[0], 0x0F); // no literals, ml saturated
        assert_eq!(output[1], 0x01); // offset LE lo
        assert_eq!(output[2], 0x00); // offset LE hi
        assert_eq!(output[3], 255);
        assert_eq!(output[4], 255);
        assert_eq!(output[5], 92);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Offset encoding: large offset (> 255) must be little-endian u16
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn offset_large_little_endian() {
    // offset = 0x1234 = 4660  → LE bytes [0x34, 0x12]
    let mut input = vec![0xFF_u8; 64];
    let mut output = make_output(64);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr;
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            4,      // MINMATCH
            0x1234, // offset
            LimitedOutputDirective::NotLimited,
            oend,
        );

        assert!(result.is_ok());

        // token + offset bytes
        assert_eq!(output[1], 0x34); // lo byte
        assert_eq!(output[2], 0x12); // hi byte
    }
}

#[test]
fn offset_max_65535() {
    // Maximum offset = 65535 = 0xFFFF → LE bytes [0xFF, 0xFF]
    let mut input = vec![0x00_u8; 64];
    let mut output = make_output(64);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr;
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            4,
            65535,
            LimitedOutputDirective::NotLimited,
            oend,
        );

        assert!(result.is_ok());
        assert_eq!(output[1], 0xFF);
        assert_eq!(output[2], 0xFF);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// State advancement: ip and anchor
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn ip_and_anchor_advance_by_match_length() {
    let match_length = 37i32;
    let literal_length = 5usize;
    let mut input = vec![0x11_u8; literal_length + match_length as usize + 32];
    let mut output = make_output(128);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr.add(literal_length);
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            match_length,
            1,
            LimitedOutputDirective::NotLimited,
            oend,
        )
        .unwrap();

        // ip should be ip_start + match_length
        assert_eq!(ip, ip_ptr.add(match_length as usize));
        // anchor should equal new ip
        assert_eq!(anchor, ip);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LimitedOutput: OutputTooSmall for literal run
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn limited_output_too_small_for_literals() {
    // Use a large literal length (300) so the needed bytes exceed our tiny output buffer.
    let lit_len = 300usize;
    let mut input = vec![0x22_u8; lit_len + 64];
    // Give just 1 byte of output — definitely not enough
    let mut output = make_output(4);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr.add(lit_len);
        let op_start = output.as_mut_ptr();
        // oend points 4 bytes past op_start
        let oend = op_start.add(output.len());

        // op starts at op_start+1 (after token byte reservation)
        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            4,
            1,
            LimitedOutputDirective::LimitedOutput,
            oend,
        );

        assert_eq!(result, Err(Lz4HcError::OutputTooSmall));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LimitedOutput: OutputTooSmall for match-length extension
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn limited_output_too_small_for_match_length() {
    // literal_length = 0, very large match → needs extension bytes for match
    // Give exactly enough for: token(1) + offset(2) but not the extension bytes
    let match_len = 4 + 15 + 600i32; // ml_remaining = 615 after -ML_MASK
    let mut input = vec![0x33_u8; match_len as usize + 64];
    // Output only 3 bytes: token + offset; no room for extensions
    let mut output = make_output(3);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr;
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            match_len,
            1,
            LimitedOutputDirective::LimitedOutput,
            oend,
        );

        assert_eq!(result, Err(Lz4HcError::OutputTooSmall));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NotLimited: no output checks — succeeds even with a large output buffer needed
// (we still provide enough space to avoid UB; the point is the variant path)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn not_limited_skips_output_check() {
    // Same params that would fail under LimitedOutput (but we have real space here)
    let lit_len = 3usize;
    let match_len = 4i32;
    let mut input = vec![0x44_u8; lit_len + 64];
    let mut output = make_output(64);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr.add(lit_len);
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        let result = encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            match_len,
            1,
            LimitedOutputDirective::NotLimited,
            oend,
        );

        assert!(result.is_ok());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token byte: combined literal and match nibbles
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn token_nibbles_combined_correctly() {
    // literal_length = 7 → high nibble = 7
    // match_length = 4 + 10 = 14 → ml_remaining = 10, low nibble = 10 = 0xA
    // token = (7 << 4) | 10 = 0x7A
    let lit_len = 7usize;
    let match_len = 14i32;
    let mut input = vec![0x55_u8; lit_len + 64];
    let mut output = make_output(64);

    unsafe {
        let anchor_ptr = input.as_ptr();
        let ip_ptr = anchor_ptr.add(lit_len);
        let op_start = output.as_mut_ptr();
        let oend = op_start.add(output.len());

        let mut ip = ip_ptr;
        let mut op = op_start;
        let mut anchor = anchor_ptr;

        encode_sequence(
            &mut ip,
            &mut op,
            &mut anchor,
            match_len,
            2,
            LimitedOutputDirective::NotLimited,
            oend,
        )
        .unwrap();

        assert_eq!(output[0], 0x7A);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Error type: Lz4HcError is Clone, Copy, PartialEq, Debug
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn error_type_traits() {
    let e = Lz4HcError::OutputTooSmall;
    let e2 = e; // Copy
    let e3 = e.clone(); // Clone
    assert_eq!(e, e2); // PartialEq
    assert_eq!(e, e3);
    // Debug formatting does not panic
    let _ = format!("{:?}", e);
}
