// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Request and response messages.
//!
//! Every message is carried in its own [`Frame`]. Operations that return a
//! sequence (listing buckets, listing keys, searching) answer with one
//! response per item followed by [`ResponsePayload::EndOfStream`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::error::{WireError, WireResult};
use super::frame::Frame;
use crate::storage::{Key, StorageError};

/// Correlates a response with its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl RequestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub payload: RequestPayload,
}

impl Request {
    pub fn new(id: RequestId, payload: RequestPayload) -> Self {
        Self { id, payload }
    }

    pub fn to_frame(&self) -> WireResult<Frame> {
        to_frame(self)
    }

    pub fn from_frame(frame: &Frame) -> WireResult<Self> {
        from_frame(frame)
    }
}

/// Operations a client can ask of the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestPayload {
    /// Mint a fresh key in `bucket` (empty means the default bucket).
    GetNewKey { bucket: String },
    /// Stream every bucket name.
    ListBuckets,
    /// Stream every stored key in `bucket`.
    ListKeys { bucket: String },
    /// Stream stored keys whose encoded form starts with `key.id`.
    Search { key: Key },
    /// Current stored version of `key.bucket` / `key.id`.
    Version { key: Key },
    Put { key: Key, payload: Vec<u8> },
    Get { key: Key },
    Delete { key: Key },
}

impl RequestPayload {
    /// True for operations answered with a terminated stream.
    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            Self::ListBuckets | Self::ListKeys { .. } | Self::Search { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetNewKey { .. } => "get_new_key",
            Self::ListBuckets => "list_buckets",
            Self::ListKeys { .. } => "list_keys",
            Self::Search { .. } => "search",
            Self::Version { .. } => "version",
            Self::Put { .. } => "put",
            Self::Get { .. } => "get",
            Self::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub request_id: RequestId,
    pub payload: ResponsePayload,
}

impl Response {
    pub fn new(request_id: RequestId, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            payload,
        }
    }

    pub fn error(request_id: RequestId, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(request_id, ResponsePayload::error(code, message))
    }

    pub fn to_frame(&self) -> WireResult<Frame> {
        to_frame(self)
    }

    pub fn from_frame(frame: &Frame) -> WireResult<Self> {
        from_frame(frame)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponsePayload {
    /// A key: minted, echoed with its current version, or one stream item.
    Key(Key),
    /// One bucket name in a bucket stream.
    Bucket(String),
    /// A stored payload. An empty payload means nothing was stored.
    Object { key: Key, payload: Vec<u8> },
    Deleted,
    /// Terminates a stream.
    EndOfStream,
    Error(ErrorResponse),
}

impl ResponsePayload {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error(ErrorResponse {
            code,
            message: message.into(),
        })
    }
}

impl From<&StorageError> for ResponsePayload {
    fn from(e: &StorageError) -> Self {
        Self::error(ErrorCode::from(e), e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    NotFound,
    StaleVersion,
    MalformedKey,
    InvalidRequest,
    Storage,
    Internal,
}

impl From<&StorageError> for ErrorCode {
    fn from(e: &StorageError) -> Self {
        match e {
            StorageError::BucketNotFound(_) | StorageError::KeyNotFound(_) => Self::NotFound,
            StorageError::StaleVersion { .. } => Self::StaleVersion,
            StorageError::MalformedKey(_) => Self::MalformedKey,
            StorageError::ValueTooLarge { .. }
            | StorageError::VersionExhausted(_)
            | StorageError::Decode(_) => Self::InvalidRequest,
            StorageError::Open { .. } | StorageError::Io(_) | StorageError::RocksDb(_) => {
                Self::Storage
            }
        }
    }
}

fn to_frame<T: Serialize>(message: &T) -> WireResult<Frame> {
    let payload =
        bincode::serialize(message).map_err(|e| WireError::Serialization(e.to_string()))?;
    Ok(Frame::new(Bytes::from(payload)))
}

fn from_frame<T: serde::de::DeserializeOwned>(frame: &Frame) -> WireResult<T> {
    Ok(bincode::deserialize(&frame.payload)?)
}
