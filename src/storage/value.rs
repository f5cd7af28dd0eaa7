// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Stored payloads.
//!
//! Payloads are opaque bytes. Anything that can turn itself into bytes and back
//! implements [`Storable`]; the store itself only ever sees [`Value`].

use super::StorageError;

/// Maximum payload size in bytes.
pub const MAX_VALUE_SIZE: usize = 64 * 1024 * 1024; // 64MB

/// Capability of being stored as an opaque payload.
pub trait Storable: Sized {
    /// Encodes `self` into payload bytes.
    fn encode(&self) -> Vec<u8>;

    /// Decodes a payload produced by [`Storable::encode`].
    fn decode(bytes: &[u8]) -> Result<Self, StorageError>;
}

/// An opaque payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value(pub Vec<u8>);

impl Value {
    /// Creates a new value from bytes.
    #[inline]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the value bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the value, returning its bytes.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the length of the value.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the value is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Storable for Value {
    fn encode(&self) -> Vec<u8> {
        self.0.clone()
    }

    fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        Ok(Self(bytes.to_vec()))
    }
}

impl Storable for String {
    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| StorageError::Decode(e.to_string()))
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Value {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
