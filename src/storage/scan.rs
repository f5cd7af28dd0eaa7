// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Cursor scans over raw RocksDB entries.
//!
//! Every function here consumes an iterator of raw `(key, value)` pairs as
//! produced by a RocksDB iterator (plain or snapshot), decodes the keys, and
//! returns them sorted with [`sort_keys`]. None of them touch the database
//! directly, which keeps them usable from both read snapshots and the write
//! path.

use super::key::{decode_physical, parse_key, sort_keys, version_prefix, BUCKET_SEPARATOR};
use super::{Key, StorageError};

/// Value stored against a bucket name in the top-level keyspace.
pub const BUCKET_MARKER: &[u8] = b"bucket";

/// A raw entry as yielded by a RocksDB iterator.
pub type RawEntry = Result<(Box<[u8]>, Box<[u8]>), rocksdb::Error>;

/// Decodes every entry of a bucket.
pub fn scan_all<I>(bucket: &str, entries: I) -> Result<Vec<Key>, StorageError>
where
    I: IntoIterator<Item = RawEntry>,
{
    let mut keys = Vec::new();
    for entry in entries {
        let (raw_key, _) = entry?;
        keys.push(decode_entry(bucket, &raw_key)?);
    }
    sort_keys(&mut keys);
    Ok(keys)
}

/// Decodes entries while their physical key starts with `prefix`.
///
/// The iterator must already be positioned at the first key `>= prefix`.
pub fn scan_prefix<I>(bucket: &str, prefix: &[u8], entries: I) -> Result<Vec<Key>, StorageError>
where
    I: IntoIterator<Item = RawEntry>,
{
    let mut keys = Vec::new();
    for entry in entries {
        let (raw_key, _) = entry?;
        if !raw_key.starts_with(prefix) {
            break;
        }
        keys.push(decode_entry(bucket, &raw_key)?);
    }
    sort_keys(&mut keys);
    Ok(keys)
}

/// Collects every stored version of `id`, oldest first.
///
/// The iterator must be positioned at [`version_prefix`]`(id)`.
pub fn scan_versions<I>(bucket: &str, id: &str, entries: I) -> Result<Vec<Key>, StorageError>
where
    I: IntoIterator<Item = RawEntry>,
{
    let mut versions = scan_prefix(bucket, &version_prefix(id), entries)?;
    versions.retain(|key| key.id == id);
    Ok(versions)
}

/// Selects bucket entries from the top-level keyspace.
///
/// Only entries whose value is [`BUCKET_MARKER`] name a bucket; anything else
/// at the top level is a plain record and is skipped.
pub fn scan_buckets<I>(entries: I) -> Result<Vec<String>, StorageError>
where
    I: IntoIterator<Item = RawEntry>,
{
    let mut keys = Vec::new();
    for entry in entries {
        let (raw_key, value) = entry?;
        if &*value != BUCKET_MARKER {
            continue;
        }
        let name = String::from_utf8_lossy(&raw_key);
        keys.push(parse_key(&format!("{name}{BUCKET_SEPARATOR}")));
    }
    sort_keys(&mut keys);
    Ok(keys.into_iter().map(|key| key.bucket).collect())
}

fn decode_entry(bucket: &str, raw_key: &[u8]) -> Result<Key, StorageError> {
    let (id, version) = decode_physical(raw_key)?;
    Ok(Key::new(bucket, id, version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::key::encode_physical;

    fn entries(keys: &[&str]) -> Vec<RawEntry> {
        let mut sorted: Vec<&str> = keys.to_vec();
        sorted.sort();
        sorted
            .into_iter()
            .map(|k| Ok((k.as_bytes().into(), b"v".to_vec().into_boxed_slice())))
            .collect()
    }

    fn from(prefix: &[u8], all: Vec<RawEntry>) -> Vec<RawEntry> {
        all.into_iter()
            .filter(|e| match e {
                Ok((k, _)) => &**k >= prefix,
                Err(_) => true,
            })
            .collect()
    }

    #[test]
    fn test_scan_all_sorts_numerically() {
        let raw: Vec<String> = (1..=10u64)
            .map(|v| String::from_utf8(encode_physical("x", v)).unwrap())
            .collect();
        let refs: Vec<&str> = raw.iter().map(String::as_str).collect();

        let keys = scan_all("b", entries(&refs)).unwrap();
        let versions: Vec<u64> = keys.iter().map(|k| k.version).collect();
        assert_eq!(versions, (1..=10u64).collect::<Vec<_>>());
        assert!(keys.iter().all(|k| k.bucket == "b" && k.id == "x"));
    }

    #[test]
    fn test_scan_all_malformed() {
        let result = scan_all("b", entries(&["x.v1", "garbage"]));
        assert!(matches!(result, Err(StorageError::MalformedKey(_))));
    }

    #[test]
    fn test_scan_prefix_stops_at_boundary() {
        let all = entries(&["aa.v1", "ab.v1", "ab.v2", "abc.v1", "b.v1"]);
        let keys = scan_prefix("b", b"ab", from(b"ab", all)).unwrap();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, ["b::ab.v1", "b::ab.v2", "b::abc.v1"]);
    }

    #[test]
    fn test_scan_versions_ignores_longer_identifiers() {
        let all = entries(&["a.v3", "a.v2.v1", "a.v10", "ab.v1"]);
        let versions = scan_versions("b", "a", from(b"a.v", all)).unwrap();
        let numbers: Vec<u64> = versions.iter().map(|k| k.version).collect();
        assert_eq!(numbers, [3u64, 10]);
    }

    #[test]
    fn test_scan_versions_empty() {
        let versions = scan_versions("b", "missing", Vec::new()).unwrap();
        assert!(versions.is_empty());
    }

    #[test]
    fn test_scan_buckets_selects_marked_entries() {
        let raw: Vec<RawEntry> = vec![
            Ok((b"docs".to_vec().into(), BUCKET_MARKER.to_vec().into())),
            Ok((b"leaf".to_vec().into(), b"payload".to_vec().into())),
            Ok((b"DEFAULT".to_vec().into(), BUCKET_MARKER.to_vec().into())),
        ];
        let buckets = scan_buckets(raw).unwrap();
        assert_eq!(buckets, ["DEFAULT", "docs"]);
    }
}
