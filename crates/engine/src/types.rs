// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Views of engine state held by this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cw_core::{RunId, RunStatus};

/// Fixed retry policy applied at the engine boundary for every start.
pub mod retry_policy {
    pub const INITIAL_INTERVAL_SECS: u64 = 1;
    pub const MAXIMUM_INTERVAL_SECS: u64 = 60;
    pub const MAXIMUM_ATTEMPTS: u32 = 3;
    pub const BACKOFF_COEFFICIENT: f64 = 2.0;
}

/// Result of describing one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDescription {
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub task_queue: String,
}

/// One row of a run listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    /// Engine-side workflow type name.
    pub entry_type: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub task_queue: String,
}
