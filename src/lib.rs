// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! sstore: a versioned key-value store with optimistic concurrency
//!
//! Records live in named buckets and are addressed by `(bucket, id, version)`.
//! A write names the version it was based on and is rejected when another
//! writer got there first. The store is embedded (RocksDB) and can be served
//! to remote clients over a framed binary protocol with optional TLS.

pub mod client;
pub mod security;
pub mod server;
pub mod service;
pub mod storage;
pub mod wire;

pub use client::{Client, ClientConfig, ClientError};
pub use server::{Server, ServerConfig, ServerError};
pub use service::StoreService;
pub use storage::{
    Key, RocksVersionedStore, Storable, StorageError, StoreConfig, Value, VersionedStore,
};
