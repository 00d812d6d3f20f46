// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cw-engine: the durable workflow engine consumed as a black box.
//!
//! Translates control-plane vocabulary into Temporal's client API. The
//! production client speaks the HTTP/JSON gateway; tests swap in
//! `FakeEngine` via the `test-support` feature.

pub mod args;
pub mod client;
pub mod error;
pub mod payload;
pub mod temporal;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use args::marshal_args;
pub use client::EngineClient;
pub use error::EngineError;
pub use temporal::{TemporalClient, TemporalConfig};
pub use types::{RunDescription, RunSummary};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeEngine;
