// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Capability label attached to every workflow.
//!
//! The vertical decides which task queue a run is placed on and which
//! worker image serves it.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Capability label (e.g. `secrets`, `android`, `ossfuzz`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertical(pub String);

impl Vertical {
    pub fn new(v: impl Into<String>) -> Self {
        Self(v.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Engine task queue this vertical's runs are dispatched to.
    pub fn task_queue(&self) -> String {
        format!("{}-queue", self.0)
    }

    /// Compose service name of the worker that serves this vertical.
    pub fn worker_service(&self) -> String {
        format!("worker-{}", self.0)
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Vertical {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Vertical {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for Vertical {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "vertical_tests.rs"]
mod tests;
