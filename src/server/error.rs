// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Server error types.

use crate::security::SecurityError;
use crate::wire::WireError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
