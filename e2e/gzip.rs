//! E2E Test Suite: GZIP member decoder
//!
//! Validates the GZIP (RFC 1952) read path end to end:
//! - single-member decode with trailer CRC/ISIZE verification
//! - concatenated multi-member streams with per-member callbacks
//! - FEXTRA/FNAME/FCOMMENT optional-field parsing
//! - the documented error taxonomy (bad magic, unsupported method, reserved
//!   flags, CRC/size mismatch)

use std::cell::RefCell;
use std::io::{Cursor, Read};
use std::rc::Rc;

use arcodec::checksum::{Checksum, Crc32};
use arcodec::gzip::{ExtraField, GzipDecoder, GzipError, GzipReadOptions};

fn gzip_member(body: &[u8]) -> Vec<u8> {
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut deflated = Vec::new();
    {
        let mut enc = DeflateEncoder::new(&mut deflated, Compression::default());
        enc.write_all(body).unwrap();
        enc.finish().unwrap();
    }

    let mut crc = Crc32::new();
    crc.update(body);

    let mut out = Vec::new();
    out.extend_from_slice(&[0x1F, 0x8B, 0x08, 0x00]); // magic, CM=8, FLG=0
    out.extend_from_slice(&[0, 0, 0, 0]); // MTIME
    out.extend_from_slice(&[0, 0xFF]); // XFL, OS
    out.extend_from_slice(&deflated);
    out.extend_from_slice(&crc.value().to_le_bytes());
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out
}

#[test]
fn scenario_1_gzip_single_empty_member() {
    // spec.md §8 scenario 1, byte-for-byte.
    let bytes: [u8; 20] = [
        0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    let mut dec = GzipDecoder::new(Cursor::new(&bytes[..]), GzipReadOptions::new());
    let mut out = Vec::new();
    dec.read_to_end(&mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn roundtrip_nonempty_member_verifies_trailer() {
    let body = b"The quick brown fox jumps over the lazy dog.".repeat(10);
    let member = gzip_member(&body);
    let mut dec = GzipDecoder::new(Cursor::new(member), GzipReadOptions::new());
    let mut out = Vec::new();
    dec.read_to_end(&mut out).unwrap();
    assert_eq!(out, body);
}

#[test]
fn scenario_6_concatenated_members_invoke_callbacks_twice() {
    let empty_member = gzip_member(b"");
    let mut both = Vec::new();
    both.extend_from_slice(&empty_member);
    both.extend_from_slice(&empty_member);

    let starts = Rc::new(RefCell::new(0));
    let ends = Rc::new(RefCell::new(0));
    let (starts_cb, ends_cb) = (starts.clone(), ends.clone());

    let options = GzipReadOptions::new()
        .decompress_concatenated(true)
        .on_member_start(move |_hdr| *starts_cb.borrow_mut() += 1)
        .on_member_end(move |_meta| *ends_cb.borrow_mut() += 1);

    let mut dec = GzipDecoder::new(Cursor::new(both), options);
    let mut out = Vec::new();
    dec.read_to_end(&mut out).unwrap();
    assert!(out.is_empty());
    assert_eq!(*starts.borrow(), 2);
    assert_eq!(*ends.borrow(), 2);
}

#[test]
fn without_concatenation_trailing_member_is_ignored() {
    let empty_member = gzip_member(b"");
    let mut both = Vec::new();
    both.extend_from_slice(&empty_member);
    both.extend_from_slice(&empty_member);

    let mut dec = GzipDecoder::new(Cursor::new(both), GzipReadOptions::new());
    let mut out = Vec::new();
    dec.read_to_end(&mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn fname_and_fcomment_are_decoded_and_reported_via_callback() {
    let mut member = Vec::new();
    member.extend_from_slice(&[0x1F, 0x8B, 0x08, 0x08 | 0x10]); // FNAME | FCOMMENT
    member.extend_from_slice(&[0, 0, 0, 0]);
    member.extend_from_slice(&[0, 0xFF]);
    member.extend_from_slice(b"hello.txt\0");
    member.extend_from_slice(b"a comment\0");

    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;
    let mut deflated = Vec::new();
    {
        let mut enc = DeflateEncoder::new(&mut deflated, Compression::default());
        enc.write_all(b"").unwrap();
        enc.finish().unwrap();
    }
    member.extend_from_slice(&deflated);
    member.extend_from_slice(&0u32.to_le_bytes());
    member.extend_from_slice(&0u32.to_le_bytes());

    let seen = Rc::new(RefCell::new((None, None)));
    let seen_cb = seen.clone();
    let options = GzipReadOptions::new().on_member_start(move |hdr| {
        *seen_cb.borrow_mut() = (hdr.filename.clone(), hdr.comment.clone());
    });
    let mut dec = GzipDecoder::new(Cursor::new(member), options);
    let mut out = Vec::new();
    dec.read_to_end(&mut out).unwrap();
    let (filename, comment) = seen.borrow().clone();
    assert_eq!(filename.as_deref(), Some("hello.txt"));
    assert_eq!(comment.as_deref(), Some("a comment"));
}

#[test]
fn fextra_subfields_round_trip_when_not_ignored() {
    let mut extra = ExtraField::new();
    extra.add("AB", b"payload".to_vec()).unwrap();

    let mut member = Vec::new();
    member.extend_from_slice(&[0x1F, 0x8B, 0x08, 0x04]); // FEXTRA
    member.extend_from_slice(&[0, 0, 0, 0]);
    member.extend_from_slice(&[0, 0xFF]);
    let encoded = extra.encode();
    member.extend_from_slice(&(encoded.len() as u16).to_le_bytes());
    member.extend_from_slice(&encoded);

    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;
    let mut deflated = Vec::new();
    {
        let mut enc = DeflateEncoder::new(&mut deflated, Compression::default());
        enc.write_all(b"").unwrap();
        enc.finish().unwrap();
    }
    member.extend_from_slice(&deflated);
    member.extend_from_slice(&0u32.to_le_bytes());
    member.extend_from_slice(&0u32.to_le_bytes());

    let seen = Rc::new(RefCell::new(None));
    let seen_cb = seen.clone();
    let options = GzipReadOptions::new()
        .ignore_extra_field(false)
        .on_member_start(move |hdr| *seen_cb.borrow_mut() = hdr.extra_field.clone());
    let mut dec = GzipDecoder::new(Cursor::new(member), options);
    let mut out = Vec::new();
    dec.read_to_end(&mut out).unwrap();
    let field = seen.borrow().clone().expect("extra field reported");
    assert_eq!(field.find_first("AB").unwrap().payload, b"payload");
}

#[test]
fn rejects_bad_magic() {
    let mut dec = GzipDecoder::new(Cursor::new(b"definitely not gzip".to_vec()), GzipReadOptions::new());
    let mut out = Vec::new();
    assert!(dec.read_to_end(&mut out).is_err());
}

#[test]
fn rejects_reserved_flag_bits() {
    let mut bytes = gzip_member(b"");
    bytes[3] |= 0x20;
    let mut dec = GzipDecoder::new(Cursor::new(bytes), GzipReadOptions::new());
    let mut out = Vec::new();
    let err = dec.read_to_end(&mut out);
    assert!(err.is_err());
}

#[test]
fn corrupted_trailer_crc_is_detected() {
    let mut bytes = gzip_member(b"some payload bytes");
    let len = bytes.len();
    bytes[len - 8] ^= 0xFF; // flip a byte inside the trailer CRC32
    let mut dec = GzipDecoder::new(Cursor::new(bytes), GzipReadOptions::new());
    let mut out = Vec::new();
    assert!(dec.read_to_end(&mut out).is_err());
}

#[test]
fn extra_field_decode_rejects_trailing_garbage() {
    // 3 stray bytes after a well-formed, zero-length subfield list.
    let bytes = [b'A', b'B', 0, 0, 0xFF, 0xFF, 0xFF];
    let err = ExtraField::decode(&bytes).unwrap_err();
    assert!(matches!(err, GzipError::TrailingGarbage));
}
