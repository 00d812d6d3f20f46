// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cw-daemon: the Crashwise control-plane process.
//!
//! One long-lived process serving the HTTP/WS/SSE surface while a
//! background task brings the durable engine connection up with backoff.
//! The surface is always reachable for introspection; endpoints that need
//! the engine answer with a structured "initializing" body until bootstrap
//! reaches ready.

pub mod bootstrap;
pub mod env;
pub mod progress;
pub mod server;
pub mod submit;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use bootstrap::{BootstrapConfig, BootstrapSnapshot, BootstrapState, BootstrapStatus};
pub use progress::{ProgressError, ProgressEvent, ProgressStore};
pub use server::{router, AppCtx};
