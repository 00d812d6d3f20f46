// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Fuzzing progress DTOs pushed by workers and fanned out to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::run_id::RunId;

/// Point-in-time snapshot of a fuzzing campaign.
///
/// `executions`, `crashes`, `unique_crashes` and `elapsed_seconds` are
/// monotonic across successive posts for the same run; a push that
/// regresses any of them is rejected at the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzingStats {
    pub run_id: RunId,
    pub workflow: String,
    #[serde(default)]
    pub executions: u64,
    #[serde(default)]
    pub executions_per_sec: f64,
    #[serde(default)]
    pub crashes: u64,
    #[serde(default)]
    pub unique_crashes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
    #[serde(default)]
    pub corpus_size: u64,
    #[serde(default)]
    pub elapsed_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_crash_at: Option<DateTime<Utc>>,
}

impl FuzzingStats {
    /// Zeroed stats for a freshly submitted run.
    pub fn new(run_id: RunId, workflow: impl Into<String>) -> Self {
        Self {
            run_id,
            workflow: workflow.into(),
            executions: 0,
            executions_per_sec: 0.0,
            crashes: 0,
            unique_crashes: 0,
            coverage: None,
            corpus_size: 0,
            elapsed_seconds: 0,
            last_crash_at: None,
        }
    }

    /// Name of the first monotonic counter that would regress if `next`
    /// replaced `self`, or `None` when the replacement is valid.
    pub fn regression(&self, next: &FuzzingStats) -> Option<&'static str> {
        if next.executions < self.executions {
            Some("executions")
        } else if next.crashes < self.crashes {
            Some("crashes")
        } else if next.unique_crashes < self.unique_crashes {
            Some("unique_crashes")
        } else if next.elapsed_seconds < self.elapsed_seconds {
            Some("elapsed_seconds")
        } else {
            None
        }
    }
}

fn default_severity() -> String {
    "medium".to_string()
}

/// One crash observed by a fuzzing worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashReport {
    pub run_id: RunId,
    pub crash_id: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crash_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reproducer: Option<String>,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploitability: Option<String>,
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
