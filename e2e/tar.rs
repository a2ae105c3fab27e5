//! E2E Test Suite: TAR archive reader/writer
//!
//! Unit tests alongside the reader/writer cover basic USTAR/GNU/POSIX
//! round-trips; this suite exercises the cross-cutting behaviours spec.md
//! §8 calls out explicitly: the PAX-override property (scenario 4), empty
//! PAX values removing a key, STAR big-number round-tripping, and the
//! documented error taxonomy.

use std::io::Cursor;

use arcodec::tar::{BigNumberMode, TarEntry, TarError, TarReader, TarWriteOptions, TarWriter, TypeFlag};

fn pax_entry_block(record: &str) -> Vec<u8> {
    let mut out = Vec::new();
    let pax_entry = TarEntry {
        name: "PaxHeader/dummy".to_string(),
        typeflag: TypeFlag::PaxExtended,
        size: record.len() as u64,
        ..Default::default()
    };
    out.extend_from_slice(&arcodec::tar::header::encode_header_block(&pax_entry));
    out.extend_from_slice(record.as_bytes());
    let pad = arcodec::tar::header::blocks_for_size(record.len() as u64) * 512 - record.len() as u64;
    out.extend(std::iter::repeat(0u8).take(pad as usize));
    out
}

#[test]
fn scenario_4_pax_long_path_overrides_ustar_name() {
    let long_name = "a".repeat(150);
    let record = format!("160 path={long_name}\n");
    assert_eq!(record.len(), 160, "PAX record length prefix must count itself");

    let mut archive = pax_entry_block(&record);
    let real_entry = TarEntry { name: "dummy".to_string(), size: 0, ..Default::default() };
    archive.extend_from_slice(&arcodec::tar::header::encode_header_block(&real_entry));
    archive.extend(std::iter::repeat(0u8).take(1024)); // two trailing zero blocks

    let mut reader = TarReader::new(Cursor::new(archive));
    let entry = reader.next_entry().unwrap().unwrap();
    assert_eq!(entry.name, long_name);
}

#[test]
fn pax_empty_value_removes_key() {
    let record = "11 uid=\n".to_string();
    assert_eq!(record.len(), 11);

    let mut archive = pax_entry_block(&record);
    let real_entry = TarEntry { name: "dummy".to_string(), uid: 42, size: 0, ..Default::default() };
    archive.extend_from_slice(&arcodec::tar::header::encode_header_block(&real_entry));
    archive.extend(std::iter::repeat(0u8).take(1024));

    let mut reader = TarReader::new(Cursor::new(archive));
    let entry = reader.next_entry().unwrap().unwrap();
    // The empty PAX value for `uid` removes the override entirely, leaving
    // the USTAR header's own uid (42) standing.
    assert_eq!(entry.uid, 42);
}

#[test]
fn pax_global_header_applies_to_later_entries() {
    let record = "14 comment=hi\n".to_string();
    assert_eq!(record.len(), 14);
    let mut archive = Vec::new();
    let global_entry = TarEntry {
        name: "PaxHeader/global".to_string(),
        typeflag: TypeFlag::PaxGlobal,
        size: record.len() as u64,
        ..Default::default()
    };
    archive.extend_from_slice(&arcodec::tar::header::encode_header_block(&global_entry));
    archive.extend_from_slice(record.as_bytes());
    let pad = arcodec::tar::header::blocks_for_size(record.len() as u64) * 512 - record.len() as u64;
    archive.extend(std::iter::repeat(0u8).take(pad as usize));

    let real_entry = TarEntry { name: "a.txt".to_string(), size: 0, ..Default::default() };
    archive.extend_from_slice(&arcodec::tar::header::encode_header_block(&real_entry));
    archive.extend(std::iter::repeat(0u8).take(1024));

    let mut reader = TarReader::new(Cursor::new(archive));
    let entry = reader.next_entry().unwrap().unwrap();
    assert_eq!(entry.extra_pax_headers.get("comment").map(String::as_str), Some("hi"));
}

#[test]
fn star_big_number_mode_round_trips_oversized_size() {
    let huge_size = 1u64 << 34; // exceeds the 11-octal-digit USTAR field
    let entry = TarEntry { name: "big.bin".to_string(), size: huge_size, ..Default::default() };
    let options = TarWriteOptions::new().big_number_mode(BigNumberMode::Star);

    let mut buf = Vec::new();
    {
        let mut w = TarWriter::with_options(&mut buf, options);
        w.write_entry(&entry).unwrap();
    }
    assert_eq!(buf.len(), 512);
    let mut block = [0u8; 512];
    block.copy_from_slice(&buf);
    let read_entry = arcodec::tar::header::parse_header_block(&block).unwrap().unwrap();
    assert_eq!(read_entry.size, huge_size);
}

#[test]
fn rejects_bad_header_checksum() {
    let entry = TarEntry { name: "x.txt".to_string(), size: 1, ..Default::default() };
    let mut archive = Vec::new();
    {
        use std::io::Write;
        let mut w = TarWriter::new(&mut archive);
        w.write_entry(&entry).unwrap();
        w.write_all(b"y").unwrap();
        w.finish().unwrap();
    }
    archive[148] ^= 0xFF; // corrupt a byte inside the checksum-covered region
    let mut reader = TarReader::new(Cursor::new(archive));
    assert!(matches!(reader.next_entry(), Err(TarError::BadChecksum)));
}

#[test]
fn negative_size_field_is_rejected() {
    let entry = TarEntry { name: "n.txt".to_string(), size: 0, ..Default::default() };
    let mut block = arcodec::tar::header::encode_header_block(&entry);
    // Force the size field's high bit on (base-256 marker) with an all-1s
    // magnitude: decodes as negative under the sign-bit-flip convention.
    let (offset, len) = (124, 12); // SIZE field per header.rs's layout
    for b in &mut block[offset..offset + len] {
        *b = 0xFF;
    }
    // Recompute checksum so the negative-size rejection is the only failure.
    let mut sum: i64 = 0;
    for (i, &b) in block.iter().enumerate() {
        let b = if (148..156).contains(&i) { b' ' } else { b };
        sum += b as i64;
    }
    let chk = format!("{sum:06o}\0 ");
    block[148..156].copy_from_slice(chk.as_bytes());

    let err = arcodec::tar::header::parse_header_block(&block).unwrap_err();
    assert!(matches!(err, TarError::CorruptedInput(_)));
}

#[test]
fn missing_trailing_zero_blocks_is_tolerated_but_truncated_body_fails() {
    use std::io::Read;

    let entry = TarEntry { name: "t.txt".to_string(), size: 10, ..Default::default() };
    let mut archive = Vec::new();
    archive.extend_from_slice(&arcodec::tar::header::encode_header_block(&entry));
    archive.extend_from_slice(b"short"); // only 5 of the declared 10 bytes, no padding, no terminator

    let mut reader = TarReader::new(Cursor::new(archive));
    let read_entry = reader.next_entry().unwrap().unwrap();
    assert_eq!(read_entry.size, 10);
    let mut out = Vec::new();
    assert!(reader.read_to_end(&mut out).is_err());
}
