// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Logical key encoding and decoding.
//!
//! A logical key is the triple `(bucket, id, version)`. Two renderings exist:
//!
//! - physical: `<id>.v<version>`, the only form stored as a RocksDB key. The
//!   bucket is not part of it; it selects the column family instead.
//! - display: `<bucket>::<id>.v<version>`, used for client-facing output.
//!
//! Version digits are not zero-padded, so RocksDB's byte order puts `x.v10`
//! before `x.v2`. Anything that returns history or listings must sort with
//! [`compare`] (or [`sort_keys`]) to get numeric version order.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::StorageError;

/// Separates the bucket from the rest of a display key.
pub const BUCKET_SEPARATOR: &str = "::";

/// Separates the identifier from its version.
pub const VERSION_SEPARATOR: &str = ".v";

/// Bucket substituted for an empty bucket name.
pub const DEFAULT_BUCKET: &str = "DEFAULT";

/// A logical key addressing one revision of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub bucket: String,
    pub id: String,
    pub version: u64,
}

impl Key {
    /// Creates a new key.
    pub fn new(bucket: impl Into<String>, id: impl Into<String>, version: u64) -> Self {
        Self {
            bucket: bucket.into(),
            id: id.into(),
            version,
        }
    }

    /// Returns a copy of this key carrying `version`.
    pub fn with_version(&self, version: u64) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    /// Replaces an empty bucket with [`DEFAULT_BUCKET`].
    pub fn with_default_bucket(mut self) -> Self {
        if self.bucket.is_empty() {
            self.bucket = DEFAULT_BUCKET.to_string();
        }
        self
    }

    /// Returns the physical RocksDB key for this revision.
    #[inline]
    pub fn physical(&self) -> Vec<u8> {
        encode_physical(&self.id, self.version)
    }

    /// Parses a display string. See [`parse_key`].
    pub fn parse(text: &str) -> Self {
        parse_key(text)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_display(&self.bucket, &self.id, self.version))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns the empty-bucket substitution applied at every store entry point.
#[inline]
pub fn bucket_or_default(bucket: &str) -> &str {
    if bucket.is_empty() {
        DEFAULT_BUCKET
    } else {
        bucket
    }
}

/// Encodes `(id, version)` as `<id>.v<version>`.
#[inline]
pub fn encode_physical(id: &str, version: u64) -> Vec<u8> {
    format!("{id}{VERSION_SEPARATOR}{version}").into_bytes()
}

/// Encodes a key as `<bucket>::<id>.v<version>`.
pub fn encode_display(bucket: &str, id: &str, version: u64) -> String {
    format!("{bucket}{BUCKET_SEPARATOR}{id}{VERSION_SEPARATOR}{version}")
}

/// Returns the prefix shared by every physical key of `id`.
///
/// Identifiers that extend `id` past the separator (`x.v2` for `x`) share it
/// too, so callers compare the decoded identifier before trusting a match.
#[inline]
pub fn version_prefix(id: &str) -> Vec<u8> {
    format!("{id}{VERSION_SEPARATOR}").into_bytes()
}

/// Parses a display string into a key.
///
/// Splits on the last bucket separator (if any), then on the last version
/// separator when it is followed by a decimal version. Never fails: a bare
/// identifier yields an empty bucket and version zero.
pub fn parse_key(text: &str) -> Key {
    let mut key = Key::default();

    let rest = match text.rsplit_once(BUCKET_SEPARATOR) {
        Some((bucket, rest)) => {
            key.bucket = bucket.to_string();
            rest
        }
        None => text,
    };

    match split_version(rest) {
        Some((id, version)) => {
            key.id = id.to_string();
            key.version = version;
        }
        None => key.id = rest.to_string(),
    }

    key
}

/// Decodes a physical key read from a column family.
///
/// Unlike [`parse_key`] this is strict: the key must be valid UTF-8 and end in
/// `.v<digits>`. The identifier may be empty, mirroring [`encode_physical`].
pub fn decode_physical(raw: &[u8]) -> Result<(String, u64), StorageError> {
    let malformed = || {
        let shown = String::from_utf8_lossy(raw).into_owned();
        tracing::warn!(key = %shown, "could not parse key");
        StorageError::MalformedKey(shown)
    };

    let text = std::str::from_utf8(raw).map_err(|_| malformed())?;
    match split_version(text) {
        Some((id, version)) => Ok((id.to_string(), version)),
        None => Err(malformed()),
    }
}

fn split_version(text: &str) -> Option<(&str, u64)> {
    let (id, digits) = text.rsplit_once(VERSION_SEPARATOR)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|version| (id, version))
}

/// Orders keys by bucket, then identifier, then numeric version.
pub fn compare(a: &Key, b: &Key) -> Ordering {
    a.bucket
        .cmp(&b.bucket)
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| a.version.cmp(&b.version))
}

/// Stable sort by [`compare`].
pub fn sort_keys(keys: &mut [Key]) {
    keys.sort_by(compare);
}
