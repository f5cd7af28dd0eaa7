// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! RocksDB-backed versioned storage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, DBWithThreadMode, Direction, IteratorMode, MultiThreaded, Options,
    WriteBatch, WriteOptions, DEFAULT_COLUMN_FAMILY_NAME,
};
use tracing::{debug, error, info, instrument, warn};

use super::key::{bucket_or_default, version_prefix};
use super::scan::{scan_all, scan_buckets, scan_prefix, scan_versions, BUCKET_MARKER};
use super::{
    DurabilityMode, Key, StorageError, StoreConfig, Value, VersionedStore, MAX_VALUE_SIZE,
};

/// Prefix separating bucket column families from RocksDB's own.
const BUCKET_CF_PREFIX: &str = "bucket:";

type Db = DBWithThreadMode<MultiThreaded>;

/// RocksDB-backed versioned store.
///
/// Each bucket is a column family holding `<id>.v<version>` keys. The default
/// column family is the top-level keyspace and holds one catalog entry per
/// bucket. Writers are serialized by `write_lock` and commit through a single
/// `WriteBatch`; readers work against a snapshot.
pub struct RocksVersionedStore {
    db: Db,
    path: PathBuf,
    write_lock: Mutex<()>,
    write_opts: WriteOptions,
}

impl RocksVersionedStore {
    /// Opens the store described by `config`.
    ///
    /// When the configured location fails to open and `config.fallback` is
    /// set, the store is opened at `<cwd>/_default.db` instead.
    pub fn open(config: &StoreConfig) -> Result<Self, StorageError> {
        let path = config.path();
        match Self::open_at(&path, config.durability) {
            Ok(store) => Ok(store),
            Err(err) if config.fallback => {
                let cwd = std::env::current_dir()?;
                Self::open_fallback(config, &path, err, &cwd)
            }
            Err(err) => Err(err),
        }
    }

    /// Like [`open`](Self::open), with the fallback rooted at `fallback_dir`
    /// instead of the working directory.
    pub fn open_with_fallback_dir(
        config: &StoreConfig,
        fallback_dir: &Path,
    ) -> Result<Self, StorageError> {
        let path = config.path();
        match Self::open_at(&path, config.durability) {
            Ok(store) => Ok(store),
            Err(err) if config.fallback => Self::open_fallback(config, &path, err, fallback_dir),
            Err(err) => Err(err),
        }
    }

    fn open_fallback(
        config: &StoreConfig,
        path: &Path,
        err: StorageError,
        fallback_dir: &Path,
    ) -> Result<Self, StorageError> {
        let fallback = StoreConfig::fallback_path(fallback_dir);
        warn!(
            path = %path.display(),
            fallback = %fallback.display(),
            error = %err,
            "opening fallback store"
        );
        Self::open_at(&fallback, config.durability)
    }

    /// Opens or creates a store at exactly `path`.
    pub fn open_at(path: &Path, durability: DurabilityMode) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        // A fresh database has no column family list yet.
        let cf_names = Db::list_cf(&opts, path)
            .unwrap_or_else(|_| vec![DEFAULT_COLUMN_FAMILY_NAME.to_string()]);

        let db = Db::open_cf(&opts, path, &cf_names).map_err(|source| {
            error!(path = %path.display(), error = %source, "could not open store");
            StorageError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(durability == DurabilityMode::FsyncEveryWrite);

        info!(path = %path.display(), buckets = cf_names.len().saturating_sub(1), "opened store");

        Ok(Self {
            db,
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
            write_opts,
        })
    }

    /// Returns the on-disk location actually opened.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes memtables and closes the store.
    pub fn close(self) -> Result<(), StorageError> {
        let result = self.db.flush();
        if let Err(ref err) = result {
            error!(path = %self.path.display(), error = %err, "flush on close failed");
        }
        info!(path = %self.path.display(), "closed store");
        drop(self.db);
        result.map_err(StorageError::from)
    }

    fn bucket(&self, bucket: &str) -> Result<Arc<BoundColumnFamily<'_>>, StorageError> {
        self.db
            .cf_handle(&cf_name(bucket))
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))
    }

    /// Returns the bucket's column family, creating it if absent.
    ///
    /// Caller must hold `write_lock`.
    fn ensure_bucket(&self, bucket: &str) -> Result<Arc<BoundColumnFamily<'_>>, StorageError> {
        let name = cf_name(bucket);
        if self.db.cf_handle(&name).is_none() {
            self.db.create_cf(&name, &Options::default())?;
            info!(bucket, "created bucket");
        }
        self.bucket(bucket)
    }

    fn validate_value(value: &Value) -> Result<(), StorageError> {
        if value.len() > MAX_VALUE_SIZE {
            return Err(StorageError::ValueTooLarge {
                size: value.len(),
                max: MAX_VALUE_SIZE,
            });
        }
        Ok(())
    }

    /// Writes a record without any version checks.
    #[cfg(test)]
    fn insert_raw(&self, bucket: &str, physical: &[u8], value: &[u8]) {
        let _guard = self.write_lock.lock();
        let cf = self.ensure_bucket(bucket).unwrap();
        let mut batch = WriteBatch::default();
        batch.put(bucket.as_bytes(), BUCKET_MARKER);
        batch.put_cf(&cf, physical, value);
        self.db.write_opt(batch, &self.write_opts).unwrap();
    }
}

impl VersionedStore for RocksVersionedStore {
    #[instrument(skip_all, fields(key = %key))]
    fn put(&self, key: &Key, value: &Value) -> Result<Key, StorageError> {
        Self::validate_value(value)?;
        let key = key.clone().with_default_bucket();

        let _guard = self.write_lock.lock();
        let cf = self.ensure_bucket(&key.bucket)?;

        let prefix = version_prefix(&key.id);
        let versions = scan_versions(
            &key.bucket,
            &key.id,
            self.db
                .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward)),
        )?;

        let mut batch = WriteBatch::default();
        // Rewritten on every put so a lost catalog entry heals itself.
        batch.put(key.bucket.as_bytes(), BUCKET_MARKER);

        if let Some((newest, older)) = versions.split_last() {
            if key.version < newest.version {
                for stale in older {
                    batch.delete_cf(&cf, stale.physical());
                }
                self.db.write_opt(batch, &self.write_opts)?;
                warn!(
                    supplied = key.version,
                    current = newest.version,
                    pruned = older.len(),
                    "rejected stale write"
                );
                return Err(StorageError::StaleVersion {
                    supplied: key.version,
                    current: newest.version,
                });
            }
            for old in &versions {
                batch.delete_cf(&cf, old.physical());
            }
        }

        let next = key
            .version
            .checked_add(1)
            .ok_or_else(|| StorageError::VersionExhausted(key.to_string()))?;
        let stored = key.with_version(next);
        batch.put_cf(&cf, stored.physical(), value.as_bytes());
        self.db.write_opt(batch, &self.write_opts)?;

        debug!(stored = %stored, retired = versions.len(), "stored version");
        Ok(stored)
    }

    #[instrument(skip_all, fields(key = %key))]
    fn get(&self, key: &Key) -> Result<Value, StorageError> {
        let key = key.clone().with_default_bucket();
        let snapshot = self.db.snapshot();
        let cf = self.bucket(&key.bucket)?;

        match snapshot.get_cf(&cf, key.physical())? {
            Some(bytes) => Ok(Value::new(bytes)),
            None => Err(StorageError::KeyNotFound(key.to_string())),
        }
    }

    #[instrument(skip_all, fields(key = %key))]
    fn delete(&self, key: &Key) -> Result<(), StorageError> {
        let key = key.clone().with_default_bucket();

        let _guard = self.write_lock.lock();
        let cf = self.bucket(&key.bucket)?;

        let prefix = version_prefix(&key.id);
        let versions = scan_versions(
            &key.bucket,
            &key.id,
            self.db
                .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward)),
        )?;

        let mut batch = WriteBatch::default();
        for version in &versions {
            batch.delete_cf(&cf, version.physical());
        }
        self.db.write_opt(batch, &self.write_opts)?;

        debug!(removed = versions.len(), "deleted key");
        Ok(())
    }

    fn versions(&self, key: &Key) -> Result<Vec<Key>, StorageError> {
        let bucket = bucket_or_default(&key.bucket);
        let snapshot = self.db.snapshot();
        let cf = self.bucket(bucket)?;

        let prefix = version_prefix(&key.id);
        scan_versions(
            bucket,
            &key.id,
            snapshot.iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward)),
        )
    }

    fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let snapshot = self.db.snapshot();
        scan_buckets(snapshot.iterator(IteratorMode::Start))
    }

    fn list_keys(&self, bucket: &str) -> Result<Vec<Key>, StorageError> {
        let bucket = bucket_or_default(bucket);
        let snapshot = self.db.snapshot();
        let cf = self.bucket(bucket)?;

        scan_all(bucket, snapshot.iterator_cf(&cf, IteratorMode::Start))
    }

    fn search(&self, bucket: &str, prefix: &str) -> Result<Vec<Key>, StorageError> {
        if bucket.is_empty() || prefix.is_empty() {
            return Ok(Vec::new());
        }
        let snapshot = self.db.snapshot();
        let cf = self.bucket(bucket)?;

        let prefix = prefix.as_bytes();
        scan_prefix(
            bucket,
            prefix,
            snapshot.iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward)),
        )
    }
}

fn cf_name(bucket: &str) -> String {
    format!("{BUCKET_CF_PREFIX}{bucket}")
}
