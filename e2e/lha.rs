//! E2E Test Suite: LHA/LZH archive reader
//!
//! Header-level parsing (checksum, header-CRC, level dispatch) is already
//! covered by `src/lha/header.rs`'s own unit tests; this suite drives the
//! full [`LhaDecoder`] across a multi-entry archive and exercises the
//! cross-cutting properties spec.md §8 calls out: the directory-entry
//! scenario, mixed file/directory archives, and the error taxonomy.

use std::io::{Cursor, Read};

use arcodec::checksum::Crc16;
use arcodec::lha::{LhaDecoder, LhaError};

/// A level-0 `-lh0-` (store) entry, byte-for-byte: the format the existing
/// unit coverage already exercises for a single entry, reused here to
/// assemble a full multi-entry archive.
fn store_entry(name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(b"-lh0-");
    body.extend_from_slice(&(data.len() as u32).to_le_bytes());
    body.extend_from_slice(&(data.len() as u32).to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.push(0x20);
    body.push(0);
    body.push(name.len() as u8);
    body.extend_from_slice(name.as_bytes());
    body.extend_from_slice(&Crc16::of(data).to_le_bytes());

    let checksum = body.iter().fold(0u8, |a, &b| a.wrapping_add(b));
    let mut header = Vec::new();
    header.push(body.len() as u8);
    header.push(checksum);
    header.extend_from_slice(&body);
    header.extend_from_slice(data);
    header
}

/// A level-0 `-lhd-` directory entry (spec.md §8 scenario 3): no payload
/// bytes follow the header at all. `name` is stored with a real `0xFF`
/// path-separator byte where the caller writes `/`, matching what a real
/// level-0 archive puts on the wire (the reader must convert it back).
fn directory_entry(name: &str) -> Vec<u8> {
    let wire_name: Vec<u8> = name.bytes().map(|b| if b == b'/' { 0xFF } else { b }).collect();
    let mut body = Vec::new();
    body.extend_from_slice(b"-lhd-");
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.push(0x10);
    body.push(0);
    body.push(wire_name.len() as u8);
    body.extend_from_slice(&wire_name);
    body.extend_from_slice(&0u16.to_le_bytes()); // crc16, unused for directories

    let checksum = body.iter().fold(0u8, |a, &b| a.wrapping_add(b));
    let mut header = Vec::new();
    header.push(body.len() as u8);
    header.push(checksum);
    header.extend_from_slice(&body);
    header
}

#[test]
fn scenario_3_directory_entry_has_no_payload() {
    let mut archive = directory_entry("dir1/");
    archive.push(0); // end of archive
    let mut dec = LhaDecoder::new(Cursor::new(archive));
    let entry = dec.next_entry().unwrap().unwrap();
    assert_eq!(entry.name, "dir1/");
    assert!(entry.is_directory);
    assert_eq!(entry.size, 0);
    let mut out = Vec::new();
    dec.read_to_end(&mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn mixed_directory_and_file_entries_are_read_in_order() {
    let mut archive = directory_entry("dir1/");
    archive.extend_from_slice(&store_entry("dir1/a.txt", b"contents of a"));
    archive.extend_from_slice(&store_entry("b.txt", b"contents of b"));
    archive.push(0);

    let mut dec = LhaDecoder::new(Cursor::new(archive));

    let dir = dec.next_entry().unwrap().unwrap();
    assert!(dir.is_directory);
    assert_eq!(dir.name, "dir1/");

    let a = dec.next_entry().unwrap().unwrap();
    assert_eq!(a.name, "dir1/a.txt");
    let mut a_data = Vec::new();
    dec.read_to_end(&mut a_data).unwrap();
    assert_eq!(a_data, b"contents of a");

    let b = dec.next_entry().unwrap().unwrap();
    assert_eq!(b.name, "b.txt");
    let mut b_data = Vec::new();
    dec.read_to_end(&mut b_data).unwrap();
    assert_eq!(b_data, b"contents of b");

    assert!(dec.next_entry().unwrap().is_none());
}

#[test]
fn empty_file_entry_round_trips() {
    let mut archive = store_entry("empty.txt", b"");
    archive.push(0);
    let mut dec = LhaDecoder::new(Cursor::new(archive));
    let entry = dec.next_entry().unwrap().unwrap();
    assert_eq!(entry.size, 0);
    let mut out = Vec::new();
    dec.read_to_end(&mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn unsupported_compression_method_is_rejected() {
    let mut body = Vec::new();
    body.extend_from_slice(b"-lh1-"); // recognised tag, but not one this decoder implements
    body.extend_from_slice(&4u32.to_le_bytes());
    body.extend_from_slice(&4u32.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.push(0x20);
    body.push(0);
    body.push(1u8);
    body.extend_from_slice(b"x");
    body.extend_from_slice(&Crc16::of(b"data").to_le_bytes());

    let checksum = body.iter().fold(0u8, |a, &b| a.wrapping_add(b));
    let mut archive = Vec::new();
    archive.push(body.len() as u8);
    archive.push(checksum);
    archive.extend_from_slice(&body);
    archive.extend_from_slice(b"data");
    archive.push(0);

    let mut dec = LhaDecoder::new(Cursor::new(archive));
    assert!(matches!(dec.next_entry(), Err(LhaError::UnsupportedMethod(tag)) if tag == "-lh1-"));
}

#[test]
fn bad_header_checksum_surfaces_through_full_decoder() {
    let mut archive = store_entry("a.txt", b"hello");
    archive[1] ^= 0xFF; // corrupt the header checksum byte
    let mut dec = LhaDecoder::new(Cursor::new(archive));
    assert!(matches!(dec.next_entry(), Err(LhaError::BadChecksum)));
}

#[test]
fn corrupted_payload_fails_entry_crc_through_full_decoder() {
    let mut archive = store_entry("a.txt", b"hello world");
    let last = archive.len() - 1;
    archive[last] ^= 0xFF;
    let mut dec = LhaDecoder::new(Cursor::new(archive));
    assert!(matches!(dec.next_entry(), Err(LhaError::BadEntryCrc { .. })));
}

#[test]
fn truncated_archive_is_rejected_as_eof() {
    let mut archive = store_entry("a.txt", b"hello world");
    archive.truncate(archive.len() - 3); // chop off part of the payload
    let mut dec = LhaDecoder::new(Cursor::new(archive));
    assert!(dec.next_entry().is_err());
}
