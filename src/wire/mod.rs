// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Binary protocol between the store server and its clients.
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬────────────────────┐
//! │  Magic   │ Version  │  Length  │ Checksum │      Payload       │
//! │ (4 bytes)│ (2 bytes)│ (4 bytes)│ (4 bytes)│  (Length bytes)    │
//! └──────────┴──────────┴──────────┴──────────┴────────────────────┘
//! ```
//!
//! Header fields are big-endian. The checksum is CRC32 of the payload, and
//! the payload is a bincode-encoded [`Request`] or [`Response`].

mod error;
mod frame;
mod message;

pub use error::{WireError, WireResult};
pub use frame::{
    read_frame, write_frame, Frame, FrameHeader, FRAME_HEADER_SIZE, MAGIC, MAX_PAYLOAD_SIZE,
    PROTOCOL_VERSION,
};
pub use message::{
    ErrorCode, ErrorResponse, Request, RequestId, RequestPayload, Response, ResponsePayload,
};
