// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Wire protocol error types.

/// Result type for wire protocol operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while framing or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("invalid magic: expected 0x53535431, got 0x{0:08x}")]
    InvalidMagic(u32),

    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u16),

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: u32, max: u32 },

    #[error("checksum mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("connection closed mid-frame ({buffered} bytes buffered)")]
    TruncatedFrame { buffered: usize },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for WireError {
    fn from(e: bincode::Error) -> Self {
        WireError::Deserialization(e.to_string())
    }
}
