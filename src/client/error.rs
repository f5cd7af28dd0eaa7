// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Client error types.

use crate::security::SecurityError;
use crate::storage::StorageError;
use crate::wire::{ErrorCode, WireError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// The server answered with an error.
    #[error("server error ({code:?}): {message}")]
    Server { code: ErrorCode, message: String },

    #[error("response ID {received} does not match request ID {expected}")]
    ResponseMismatch { expected: u64, received: u64 },

    #[error("unexpected response type: expected {expected}, got {actual}")]
    UnexpectedResponse { expected: String, actual: String },

    #[error("timed out waiting for the server")]
    Timeout,

    /// A payload could not be decoded into the requested type.
    #[error("decode error: {0}")]
    Decode(#[source] StorageError),
}

impl ClientError {
    /// Creates a server error from an error code and message.
    pub fn server(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: message.into(),
        }
    }

    /// Returns the server's error code, if the server rejected the request.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(ErrorCode::NotFound)
    }

    pub fn is_stale(&self) -> bool {
        self.code() == Some(ErrorCode::StaleVersion)
    }
}
