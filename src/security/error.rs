// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Security error types.

use std::path::PathBuf;

/// Errors raised while setting up or running TLS.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    /// Certificate loading failed.
    #[error("failed to load certificate from {path}: {reason}")]
    CertificateLoad { path: PathBuf, reason: String },

    /// Private key loading failed.
    #[error("failed to load private key from {path}: {reason}")]
    PrivateKeyLoad { path: PathBuf, reason: String },

    /// TLS configuration error.
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// The name to verify the server certificate against is not valid.
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// TLS handshake failed.
    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),
}

impl From<rustls::Error> for SecurityError {
    fn from(err: rustls::Error) -> Self {
        SecurityError::TlsConfig(err.to_string())
    }
}
