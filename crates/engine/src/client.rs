// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! The `EngineClient` seam.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use cw_core::RunId;

use crate::error::EngineError;
use crate::types::{RunDescription, RunSummary};

/// Submit, observe, and cancel workflow runs on the durable engine.
///
/// All methods may fail with `EngineError::Unavailable` before bootstrap
/// completes, or with an engine-side error afterwards.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Start a workflow instance. `args` are positional payloads; the retry
    /// policy is fixed at the engine boundary.
    async fn start(
        &self,
        entry_type: &str,
        args: Vec<Value>,
        run_id: &RunId,
        task_queue: &str,
        execution_timeout: Option<Duration>,
    ) -> Result<(), EngineError>;

    /// Current status and timestamps of a run.
    async fn describe(&self, run_id: &RunId) -> Result<RunDescription, EngineError>;

    /// Block until the run closes and return its result value. Honours the
    /// caller's timeout.
    async fn result(&self, run_id: &RunId, timeout: Option<Duration>)
        -> Result<Value, EngineError>;

    /// Request cancellation of a running workflow.
    async fn cancel(&self, run_id: &RunId) -> Result<(), EngineError>;

    /// List recent runs, optionally filtered by an engine-side query.
    async fn list(&self, filter: Option<&str>, limit: usize)
        -> Result<Vec<RunSummary>, EngineError>;
}
