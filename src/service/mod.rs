// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Service adapter between the wire protocol and the storage engine.
//!
//! The adapter holds no state of its own. It translates each
//! [`RequestPayload`](crate::wire::RequestPayload) into a store call and
//! each outcome into response payloads, mapping storage failures to
//! [`ErrorCode`](crate::wire::ErrorCode)s.

mod adapter;

pub use adapter::StoreService;
