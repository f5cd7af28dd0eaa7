// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Network server for the versioned store.
//!
//! ```text
//! ┌────────────┐   ┌──────────────────┐   ┌──────────────┐   ┌─────────────────┐
//! │  Listener  │ → │  Connection task │ → │ StoreService │ → │ VersionedStore  │
//! │ (TCP/TLS)  │   │  (frame loop)    │   │  (blocking)  │   │  (RocksDB)      │
//! └────────────┘   └──────────────────┘   └──────────────┘   └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sstore::server::{Server, ServerConfig};
//! use sstore::storage::{RocksVersionedStore, StoreConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksVersionedStore::open(&StoreConfig::default())?);
//! let server = Server::bind(ServerConfig::default(), store).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod connection;
mod error;
#[allow(clippy::module_inception)]
mod server;

pub use config::{ServerConfig, DEFAULT_ADDRESS};
pub use error::{ServerError, ServerResult};
pub use server::Server;
