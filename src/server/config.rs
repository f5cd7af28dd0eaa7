// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Server configuration.

use crate::security::TlsConfig;

/// Default listen address.
pub const DEFAULT_ADDRESS: &str = "localhost:9001";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on, `host:port`.
    pub address: String,
    /// Serves TLS instead of plain TCP when set.
    pub tls: Option<TlsConfig>,
    /// Connections beyond this are closed on accept.
    pub max_connections: usize,
    /// Initial read buffer per connection.
    pub read_buffer_size: usize,
}

impl ServerConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            tls: None,
            max_connections: 1024,
            read_buffer_size: 64 * 1024,
        }
    }
}
