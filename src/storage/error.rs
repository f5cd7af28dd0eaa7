// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Storage error types.

use std::path::PathBuf;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("bucket '{0}' not found")]
    BucketNotFound(String),

    #[error("key '{0}' not found")]
    KeyNotFound(String),

    #[error("stale key '{supplied}' should be '{current}'")]
    StaleVersion { supplied: u64, current: u64 },

    #[error("no versions left after key '{0}'")]
    VersionExhausted(String),

    #[error("malformed key '{0}'")]
    MalformedKey(String),

    #[error("value too large: {size} > {max}")]
    ValueTooLarge { size: usize, max: usize },

    #[error("could not decode payload: {0}")]
    Decode(String),

    #[error("could not open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rocksdb::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),
}

impl StorageError {
    /// Returns true for the not-found family (missing bucket or record).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BucketNotFound(_) | Self::KeyNotFound(_))
    }
}
