// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Versioned key-value storage with optimistic concurrency.
//!
//! Records are addressed by a logical [`Key`] `(bucket, id, version)`. Each
//! bucket is a separate keyspace; inside it an identifier has exactly one
//! stored version after every successful write.
//!
//! # Write protocol
//!
//! A write carries the version the caller last observed. It is accepted only
//! if that version is not behind the stored one:
//!
//! - **Accepted**: every stored version is removed and the payload is stored
//!   under `version + 1`, in one atomic batch.
//! - **Stale**: all but the newest stored version are pruned and the write
//!   fails with [`StorageError::StaleVersion`].
//!
//! Writers are serialized, so the read-then-write sequence never interleaves
//! with another writer. Nothing is retried internally; a caller holding a
//! stale version re-reads [`VersionedStore::current_version`] and resubmits.
//!
//! # Example
//!
//! ```no_run
//! use sstore::storage::{Key, RocksVersionedStore, StoreConfig, Value, VersionedStore};
//!
//! let store = RocksVersionedStore::open(&StoreConfig::new("/tmp", "sstore")).unwrap();
//!
//! let key = store.new_key("docs");
//! let stored = store.put(&key, &Value::from("first")).unwrap();
//! assert_eq!(stored.version, key.version + 1);
//!
//! // Writing with the old version is rejected.
//! assert!(store.put(&key, &Value::from("late")).is_err());
//!
//! let current = store.current_version(&key).unwrap();
//! let value = store.get(&key.with_version(current)).unwrap();
//! assert_eq!(value.as_bytes(), b"first");
//! ```

mod config;
mod error;
pub mod key;
mod rocks;
mod scan;
mod store;
mod value;

pub use config::{DurabilityMode, StoreConfig, FALLBACK_FILE_NAME};
pub use error::StorageError;
pub use key::{
    compare, decode_physical, encode_display, encode_physical, parse_key, sort_keys, Key,
    BUCKET_SEPARATOR, DEFAULT_BUCKET, VERSION_SEPARATOR,
};
pub use rocks::RocksVersionedStore;
pub use scan::{scan_all, scan_buckets, scan_prefix, scan_versions, RawEntry, BUCKET_MARKER};
pub use store::{generate_id, VersionedStore, ID_RANDOM_BYTES};
pub use value::{Storable, Value, MAX_VALUE_SIZE};
