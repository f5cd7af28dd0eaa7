// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Routes wire requests to a [`VersionedStore`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::storage::key::bucket_or_default;
use crate::storage::{Key, StorageError, Value, VersionedStore};
use crate::wire::{ErrorCode, RequestPayload, ResponsePayload};

/// Stateless dispatcher from requests to store operations.
///
/// Every call blocks on the store; async callers run it on a blocking thread.
pub struct StoreService<S> {
    store: Arc<S>,
}

impl<S> Clone for StoreService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: VersionedStore> StoreService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Handles one request.
    ///
    /// Unary operations yield exactly one payload. Streaming operations
    /// yield their items followed by [`ResponsePayload::EndOfStream`], or a
    /// single [`ResponsePayload::Error`] if the query failed.
    pub fn handle(&self, request: RequestPayload) -> Vec<ResponsePayload> {
        let op = request.name();
        debug!(op, "dispatching request");

        let streaming = request.is_streaming();
        match self.dispatch(request) {
            Ok(mut items) => {
                if streaming {
                    items.push(ResponsePayload::EndOfStream);
                }
                items
            }
            Err(e) => {
                warn!(op, error = %e, "request failed");
                vec![ResponsePayload::from(&e)]
            }
        }
    }

    fn dispatch(&self, request: RequestPayload) -> Result<Vec<ResponsePayload>, StorageError> {
        let store = self.store.as_ref();

        match request {
            RequestPayload::GetNewKey { bucket } => {
                Ok(vec![ResponsePayload::Key(store.new_key(&bucket))])
            }

            RequestPayload::ListBuckets => Ok(store
                .list_buckets()?
                .into_iter()
                .map(ResponsePayload::Bucket)
                .collect()),

            RequestPayload::ListKeys { bucket } => Ok(store
                .list_keys(&bucket)?
                .into_iter()
                .map(ResponsePayload::Key)
                .collect()),

            RequestPayload::Search { key } => Ok(store
                .search(bucket_or_default(&key.bucket), &key.id)?
                .into_iter()
                .map(ResponsePayload::Key)
                .collect()),

            RequestPayload::Version { key } => {
                let current = store.current_version(&key)?;
                Ok(vec![ResponsePayload::Key(key.with_version(current))])
            }

            RequestPayload::Put { key, payload } => {
                let stored = store.put(&key, &Value::new(payload))?;
                Ok(vec![ResponsePayload::Key(stored)])
            }

            RequestPayload::Get { key } => {
                let value = store.get(&key)?;
                if value.is_empty() {
                    return Ok(vec![not_found(&key)]);
                }
                Ok(vec![ResponsePayload::Object {
                    key,
                    payload: value.into_bytes(),
                }])
            }

            RequestPayload::Delete { key } => {
                store.delete(&key)?;
                Ok(vec![ResponsePayload::Deleted])
            }
        }
    }
}

fn not_found(key: &Key) -> ResponsePayload {
    ResponsePayload::error(ErrorCode::NotFound, format!("key '{key}' not found"))
}
