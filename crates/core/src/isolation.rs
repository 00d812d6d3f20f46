// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Target-sharing strategy for concurrent runs on one worker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a worker lays out downloaded targets across concurrent runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IsolationMode {
    /// All runs share one workspace per target.
    #[default]
    Shared,
    /// Per-run directory. Required for write-heavy workflows.
    Isolated,
    /// Shared download, per-run copy.
    CopyOnWrite,
}

impl fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Shared => "shared",
            Self::Isolated => "isolated",
            Self::CopyOnWrite => "copy-on-write",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_kebab_case() {
        assert_eq!(serde_json::to_string(&IsolationMode::CopyOnWrite).unwrap(), "\"copy-on-write\"");
        let m: IsolationMode = serde_json::from_str("\"isolated\"").unwrap();
        assert_eq!(m, IsolationMode::Isolated);
    }
}
