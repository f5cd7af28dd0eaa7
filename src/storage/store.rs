// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! The versioned store trait.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::RngCore;

use super::key::bucket_or_default;
use super::{Key, Storable, StorageError, Value};

/// Number of random bytes behind a generated identifier.
pub const ID_RANDOM_BYTES: usize = 6;

/// The versioned storage engine trait.
///
/// Each identifier in a bucket has exactly one stored version after any
/// successful write. Writes are accepted only when the caller's version is not
/// behind the stored one; each accepted write stores `version + 1` and retires
/// every older version in the same atomic batch.
///
/// An empty bucket name means [`DEFAULT_BUCKET`](super::DEFAULT_BUCKET) for
/// every operation except [`search`](VersionedStore::search).
pub trait VersionedStore: Send + Sync {
    /// Writes `value` under `key`.
    ///
    /// Returns the stored key, whose version is `key.version + 1`. Fails with
    /// [`StorageError::StaleVersion`] if `key.version` is below the stored
    /// version; in that case every version except the newest is pruned.
    fn put(&self, key: &Key, value: &Value) -> Result<Key, StorageError>;

    /// Reads the exact revision named by `key`.
    ///
    /// This does not resolve "latest"; ask [`current_version`] first.
    ///
    /// [`current_version`]: VersionedStore::current_version
    fn get(&self, key: &Key) -> Result<Value, StorageError>;

    /// Removes every stored version of `key.id`.
    fn delete(&self, key: &Key) -> Result<(), StorageError>;

    /// Returns the stored versions of `key.id`, oldest first.
    fn versions(&self, key: &Key) -> Result<Vec<Key>, StorageError>;

    /// Returns the newest stored version of `key.id`, or zero if none.
    fn current_version(&self, key: &Key) -> Result<u64, StorageError> {
        Ok(self.versions(key)?.last().map_or(0, |k| k.version))
    }

    /// Lists bucket names.
    fn list_buckets(&self) -> Result<Vec<String>, StorageError>;

    /// Lists every stored key in `bucket`.
    fn list_keys(&self, bucket: &str) -> Result<Vec<Key>, StorageError>;

    /// Lists keys whose physical form starts with `prefix`.
    ///
    /// Matching is on raw bytes of `<id>.v<version>`, so `prefix` may match
    /// several identifiers. Returns nothing when `bucket` or `prefix` is empty.
    fn search(&self, bucket: &str, prefix: &str) -> Result<Vec<Key>, StorageError>;

    /// Generates a fresh key with version 1. Performs no I/O.
    fn new_key(&self, bucket: &str) -> Key {
        Key::new(bucket_or_default(bucket), generate_id(), 1)
    }

    /// Writes any [`Storable`].
    fn put_storable<T: Storable>(&self, key: &Key, obj: &T) -> Result<Key, StorageError>
    where
        Self: Sized,
    {
        self.put(key, &Value::new(obj.encode()))
    }

    /// Reads into any [`Storable`].
    fn get_storable<T: Storable>(&self, key: &Key) -> Result<T, StorageError>
    where
        Self: Sized,
    {
        T::decode(self.get(key)?.as_bytes())
    }
}

/// Generates a random URL-safe identifier.
///
/// Collisions are not checked.
pub fn generate_id() -> String {
    let mut bytes = [0u8; ID_RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id();
        assert_eq!(id.len(), 8);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_generate_id_differs() {
        assert_ne!(generate_id(), generate_id());
    }
}
