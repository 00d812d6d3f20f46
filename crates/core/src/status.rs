// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Run status as observed through the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a workflow run. Terminal statuses are forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
    /// Anything the engine reports that we do not model (terminated,
    /// timed out, continued-as-new, or an unreadable status).
    Unknown,
}

impl RunStatus {
    /// A run in a terminal status never changes again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    pub fn is_failed(self) -> bool {
        self == Self::Failed
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
