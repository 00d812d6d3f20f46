// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Structured error envelope returned on every non-2xx response.
//!
//! CLI tooling renders `suggestions` verbatim, so each error kind carries a
//! baseline suggestion list; callers prepend context-specific hints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of error kinds used in the envelope's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    WorkflowNotFound,
    MissingVertical,
    ValidationError,
    InvalidParameters,
    FileTooLarge,
    VolumeError,
    ImageError,
    ResourceError,
    WorkflowError,
    WorkflowSubmissionError,
    EngineUnavailable,
    StorageError,
    NotFound,
}

impl ErrorKind {
    /// Baseline human-oriented suggestions for this kind.
    pub fn suggestions(self) -> Vec<String> {
        let lines: &[&str] = match self {
            Self::WorkflowNotFound => &[
                "Use GET /workflows/ to see all available workflows",
                "Check workflow name spelling and case sensitivity",
            ],
            Self::MissingVertical => &[
                "Check workflow metadata.yaml for 'vertical' field",
                "Contact the workflow author for support",
            ],
            Self::ValidationError => &[
                "Check parameter types and values",
                "Use GET /workflows/{workflow_name}/parameters for the schema",
                "Ensure all required parameters are provided",
            ],
            Self::InvalidParameters => &["Ensure parameters is a valid JSON object"],
            Self::FileTooLarge => &[
                "Reduce the size of your target directory",
                "Exclude unnecessary files (build artifacts, dependencies, etc.)",
                "Consider splitting into smaller analysis targets",
            ],
            Self::VolumeError => &[
                "Check if the target path exists and is accessible",
                "Verify file permissions",
                "Try using an absolute path instead of a relative path",
            ],
            Self::ImageError => &[
                "Check if the workflow image exists",
                "Verify container registry access",
                "Try rebuilding the workflow image",
            ],
            Self::ResourceError => &[
                "Check system memory and CPU availability",
                "Consider reducing resource limits or dataset size",
                "Increase container memory limits if needed",
            ],
            Self::WorkflowError => &[
                "Check if the Temporal server is running and accessible",
                "Verify workflow workers are running",
                "Check if the workflow is registered with the correct vertical",
            ],
            Self::WorkflowSubmissionError => &[
                "Check backend logs for details",
                "Verify all services are running (docker compose up -d)",
                "Try restarting the workflow deployment",
            ],
            Self::EngineUnavailable => &[
                "The backend is still initializing; retry shortly",
                "Check that the Temporal server is reachable",
            ],
            Self::StorageError => &[
                "Verify object storage is accessible",
                "Check backend logs for detailed error information",
            ],
            Self::NotFound => &["Check the identifier and try again"],
        };
        lines.iter().map(|s| s.to_string()).collect()
    }
}

/// Payload of the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// `{"error": {...}}` wrapper, the shape every failure response uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    /// Envelope with the kind's baseline suggestions.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                kind,
                message: message.into(),
                timestamp: Utc::now(),
                workflow_name: None,
                run_id: None,
                container: None,
                deployment: None,
                suggestions: kind.suggestions(),
            },
        }
    }

    pub fn with_workflow(mut self, name: impl Into<String>) -> Self {
        self.error.workflow_name = Some(name.into());
        self
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.error.run_id = Some(run_id.into());
        self
    }

    /// Replace the suggestion list entirely.
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.error.suggestions = suggestions;
        self
    }

    /// Prepend one context-specific suggestion ahead of the baseline.
    pub fn prepend_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.error.suggestions.insert(0, suggestion.into());
        self
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
