// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Engine failure taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine endpoint is unreachable (bootstrap retries on this).
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The run (or namespace object) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport-level failure on an established connection.
    #[error("engine transport error: {0}")]
    Transport(String),

    /// The engine accepted the request but reports a failure.
    #[error("engine error: {0}")]
    Engine(String),

    /// `result` did not complete within the caller's deadline.
    #[error("timed out waiting for workflow result")]
    Timeout,

    /// A response payload could not be decoded.
    #[error("payload decode error: {0}")]
    Decode(String),
}
