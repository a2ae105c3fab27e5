//! PAX extended-header record parsing and override application (spec.md
//! §3.5, §4.7): `"<len> <key>=<value>\n"` records, and GNU old-style sparse
//! (`'S'` typeflag) map decoding.

use super::error::{TarError, TarResult};
use super::header::TarEntry;

/// `GNU.sparse.offset`/`GNU.sparse.numbytes` (the GNU sparse PAX 0.0 layout)
/// repeat the same key once per sparse segment; a key→value map can hold
/// only the last one, so these are exempted from the last-wins collapse
/// every other PAX key gets (spec.md §4.7).
fn is_sparse_segment_key(key: &str) -> bool {
    key.starts_with("GNU.sparse.offset") || key.starts_with("GNU.sparse.numbytes")
}

/// Fold `incoming` into `acc` in place: duplicate non-sparse-segment keys
/// collapse to the last occurrence (removing the key entirely on an empty
/// value, per spec.md §3.5), while repeated sparse-segment records are all
/// kept in their original relative order.
pub(crate) fn merge_records(acc: &mut Vec<(String, String)>, incoming: Vec<(String, String)>) {
    for (key, value) in incoming {
        if is_sparse_segment_key(&key) {
            acc.push((key, value));
            continue;
        }
        acc.retain(|(k, _)| k != &key);
        if !value.is_empty() {
            acc.push((key, value));
        }
    }
}

/// Parse a complete PAX record stream into an ordered key→value record
/// list. Duplicate keys: the last occurrence wins and an empty value
/// REMOVES the key (spec.md §3.5's invariant) — except for the repeated
/// `GNU.sparse.offset`/`GNU.sparse.numbytes` records of the sparse 0.0
/// layout, which all survive in order so the offset/numbytes pairs can be
/// reconstructed (spec.md §4.7).
pub fn parse_pax_records(mut data: &[u8]) -> TarResult<Vec<(String, String)>> {
    let mut records: Vec<(String, String)> = Vec::new();
    while !data.is_empty() {
        let space = data
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| TarError::BadPaxHeader("missing length/key separator".into()))?;
        let len_text = std::str::from_utf8(&data[..space])
            .map_err(|_| TarError::BadPaxHeader("length prefix is not valid UTF-8".into()))?;
        let record_len: usize = len_text
            .parse()
            .map_err(|_| TarError::BadPaxHeader(format!("non-numeric length prefix {len_text:?}")))?;
        if record_len == 0 || record_len > data.len() {
            return Err(TarError::BadPaxHeader(format!("length prefix {record_len} out of range")));
        }
        let record = &data[..record_len];
        if record.last() != Some(&b'\n') {
            return Err(TarError::BadPaxHeader("record missing trailing newline".into()));
        }
        let kv = &record[space + 1..record.len() - 1];
        let eq = kv
            .iter()
            .position(|&b| b == b'=')
            .ok_or_else(|| TarError::BadPaxHeader("missing '=' in record".into()))?;
        let key = String::from_utf8_lossy(&kv[..eq]).into_owned();
        let value = String::from_utf8_lossy(&kv[eq + 1..]).into_owned();
        merge_records(&mut records, vec![(key, value)]);
        data = &data[record_len..];
    }
    Ok(records)
}

/// Fold a PAX record set into `entry`, recognising the keys spec.md §4.7
/// names (`path`, `linkpath`, `size`, `mtime`, `uid`, `gid`, `uname`,
/// `gname`, `GNU.sparse.*`) and preserving the rest verbatim.
pub fn apply_pax_records(entry: &mut TarEntry, records: &[(String, String)]) -> TarResult<()> {
    let mut sparse_offsets: Vec<u64> = Vec::new();
    let mut sparse_numbytes: Vec<u64> = Vec::new();
    let mut real_size: Option<u64> = None;

    for (key, value) in records {
        match key.as_str() {
            "path" => entry.name = value.clone(),
            "linkpath" => entry.link_name = value.clone(),
            "size" => {
                entry.size = parse_pax_u64(value, "size")?;
            }
            "mtime" => {
                entry.mtime = parse_pax_time(value)?;
            }
            "uid" => entry.uid = parse_pax_u64(value, "uid")?,
            "gid" => entry.gid = parse_pax_u64(value, "gid")?,
            "uname" => entry.uname = value.clone(),
            "gname" => entry.gname = value.clone(),
            "GNU.sparse.realsize" | "GNU.sparse.size" => {
                real_size = Some(parse_pax_u64(value, "GNU.sparse.size")?);
            }
            "GNU.sparse.map" => {
                parse_gnu_sparse_map(value, &mut entry.sparse)?;
            }
            _ if key.starts_with("GNU.sparse.offset") => {
                sparse_offsets.push(parse_pax_u64(value, key)?);
            }
            _ if key.starts_with("GNU.sparse.numbytes") => {
                sparse_numbytes.push(parse_pax_u64(value, key)?);
            }
            "atime" | "ctime" => {
                entry.extra_pax_headers.insert(key.clone(), value.clone());
            }
            _ => {
                entry.extra_pax_headers.insert(key.clone(), value.clone());
            }
        }
    }

    if !sparse_offsets.is_empty() {
        entry.sparse = sparse_offsets.into_iter().zip(sparse_numbytes).collect();
    }
    if let Some(size) = real_size {
        entry.size = size;
    }
    Ok(())
}

fn parse_pax_u64(value: &str, field_name: &str) -> TarResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| TarError::BadPaxHeader(format!("{field_name} is not a valid integer: {value:?}")))
}

/// PAX `mtime` records are decimal seconds with an optional fractional part
/// (`"1234567890.123456789"`); fractional seconds are truncated since
/// [`TarEntry::mtime`] only tracks whole seconds.
fn parse_pax_time(value: &str) -> TarResult<u64> {
    let whole = value.split('.').next().unwrap_or(value);
    whole
        .trim()
        .parse()
        .map_err(|_| TarError::BadPaxHeader(format!("mtime is not a valid integer: {value:?}")))
}

/// Parse the `GNU.sparse.map` PAX record: `"offset,numbytes,offset,numbytes,..."`.
fn parse_gnu_sparse_map(value: &str, out: &mut Vec<(u64, u64)>) -> TarResult<()> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() % 2 != 0 {
        return Err(TarError::BadPaxHeader("GNU.sparse.map has an odd number of fields".into()));
    }
    out.clear();
    for pair in parts.chunks(2) {
        let offset: u64 = pair[0]
            .parse()
            .map_err(|_| TarError::BadPaxHeader(format!("invalid sparse offset {:?}", pair[0])))?;
        let numbytes: u64 = pair[1]
            .parse()
            .map_err(|_| TarError::BadPaxHeader(format!("invalid sparse numbytes {:?}", pair[1])))?;
        out.push((offset, numbytes));
    }
    Ok(())
}

/// Parse the old-format (pre-PAX) GNU sparse header's inline map: up to 4
/// `(offset, numbytes)` pairs in the header block itself, chained through
/// `isextended` + extension blocks holding 21 more pairs each.
pub fn parse_gnu_sparse_header_block(
    sparse_field: &[u8],
    is_extended: bool,
    real_size: u64,
    mut extensions: impl FnMut() -> std::io::Result<[u8; 512]>,
) -> TarResult<Vec<(u64, u64)>> {
    let mut entries = Vec::new();
    read_gnu_sparse_entries(sparse_field, &mut entries)?;

    let mut extended = is_extended;
    while extended {
        let block = extensions().map_err(TarError::from)?;
        read_gnu_sparse_entries(&block[..504], &mut entries)?;
        extended = block[504] != 0;
    }

    let total: u64 = entries.iter().map(|&(_, n)| n).sum();
    if total != real_size && real_size != 0 {
        return Err(TarError::CorruptedInput("GNU sparse map size does not match declared real size".into()));
    }
    Ok(entries)
}

fn read_gnu_sparse_entries(field: &[u8], out: &mut Vec<(u64, u64)>) -> TarResult<()> {
    for chunk in field.chunks(24) {
        if chunk.len() < 24 {
            break;
        }
        let offset = parse_sparse_number(&chunk[0..12])?;
        let numbytes = parse_sparse_number(&chunk[12..24])?;
        if offset == 0 && numbytes == 0 {
            continue;
        }
        out.push((offset, numbytes));
    }
    Ok(())
}

fn parse_sparse_number(raw: &[u8]) -> TarResult<u64> {
    let text: String = raw.iter().take_while(|&&b| b != 0).map(|&b| b as char).collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| TarError::CorruptedInput(format!("invalid GNU sparse numeric field {trimmed:?}")))
}
