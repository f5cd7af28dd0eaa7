// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transport security for the store server and client.
//!
//! Connections are plain TCP unless TLS is configured. The server takes a
//! [`TlsConfig`] (certificate, key, and an optional client CA for mutual TLS);
//! the client takes a [`ClientTlsConfig`] naming the server and, optionally,
//! a private CA and a client identity.
//!
//! ```text
//!   Client ── ClientTlsConfig ──► TlsConnector ─┐
//!                                               │  rustls, TLS 1.3
//!   Server ── TlsConfig ────────► TlsAcceptor ◄─┘
//! ```

mod error;
mod tls;

pub use error::SecurityError;
pub use tls::{
    create_tls_acceptor, create_tls_connector, ClientIdentity, ClientTlsConfig, TlsConfig,
};

#[cfg(test)]
pub(crate) use tls::tests as tls_fixtures;
