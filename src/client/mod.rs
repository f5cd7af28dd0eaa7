// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Remote client for the store server.
//!
//! [`Client`] speaks the framed protocol in [`crate::wire`] over TCP, or TLS
//! when [`ClientConfig::tls`] is set. Server-side failures come back as
//! [`ClientError::Server`] carrying the server's [`ErrorCode`](crate::wire::ErrorCode).

#[allow(clippy::module_inception)]
mod client;
mod error;
#[cfg(test)]
mod tests;

pub use client::{Client, ClientConfig};
pub use error::{ClientError, ClientResult};
