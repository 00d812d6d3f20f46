// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Workflow run identifier.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of one workflow run: `<workflow_name>-<8 hex>`.
///
/// The suffix is random, so two submissions of the same workflow always
/// yield distinct run IDs. The workflow name is recoverable from the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    /// Wrap an existing run ID string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh run ID for the given workflow name.
    pub fn generate(workflow_name: &str) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", workflow_name, &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Workflow name embedded in the run ID: everything before the last `-`.
    ///
    /// Returns "unknown" for IDs without a separator.
    pub fn workflow_name(&self) -> &str {
        match self.0.rsplit_once('-') {
            Some((name, _)) => name,
            None => "unknown",
        }
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for RunId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "run_id_tests.rs"]
mod tests;
