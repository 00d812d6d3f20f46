// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! HTTP error layer: every failure renders the structured envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use cw_core::{ErrorEnvelope, ErrorKind};
use cw_engine::EngineError;
use cw_storage::StorageError;

use crate::progress::ProgressError;

/// A failed request: status code plus envelope body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub envelope: ErrorEnvelope,
}

impl ApiError {
    pub fn new(status: StatusCode, envelope: ErrorEnvelope) -> Self {
        Self { status, envelope }
    }

    /// 404 with the currently registered names as the leading hint.
    pub fn workflow_not_found(name: &str, known: &[String]) -> Self {
        let envelope = ErrorEnvelope::new(
            ErrorKind::WorkflowNotFound,
            format!("Workflow '{name}' not found"),
        )
        .with_workflow(name)
        .prepend_suggestion(format!("Available workflows: {}", known.join(", ")));
        Self::new(StatusCode::NOT_FOUND, envelope)
    }

    pub fn run_not_found(run_id: &str) -> Self {
        let envelope = ErrorEnvelope::new(ErrorKind::NotFound, format!("Run not found: {run_id}"))
            .with_run_id(run_id);
        Self::new(StatusCode::NOT_FOUND, envelope)
    }

    pub fn fuzzing_run_not_found(run_id: &str) -> Self {
        let envelope =
            ErrorEnvelope::new(ErrorKind::NotFound, format!("Fuzzing run not found: {run_id}"))
                .with_run_id(run_id);
        Self::new(StatusCode::NOT_FOUND, envelope)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorEnvelope::new(ErrorKind::ValidationError, message),
        )
    }

    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorEnvelope::new(ErrorKind::InvalidParameters, message),
        )
    }

    pub fn file_too_large(cap_bytes: u64) -> Self {
        let cap_gib = cap_bytes as f64 / (1024.0 * 1024.0 * 1024.0);
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorEnvelope::new(
                ErrorKind::FileTooLarge,
                format!("File size exceeds maximum allowed size of {cap_gib:.1} GB"),
            ),
        )
    }

    /// Attach workflow context to whatever this error already is.
    pub fn for_workflow(mut self, name: &str) -> Self {
        self.envelope = self.envelope.with_workflow(name);
        self
    }

    pub fn for_run(mut self, run_id: &str) -> Self {
        self.envelope = self.envelope.with_run_id(run_id);
        self
    }

    /// Carry the bootstrap snapshot so clients can poll for readiness.
    pub fn with_bootstrap(mut self, snapshot: &crate::bootstrap::BootstrapSnapshot) -> Self {
        if let Ok(v) = serde_json::to_value(snapshot) {
            self.envelope.error.deployment = Some(v);
        }
        self
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        if e.is_not_found() {
            Self::new(
                StatusCode::NOT_FOUND,
                ErrorEnvelope::new(ErrorKind::NotFound, e.to_string()),
            )
        } else {
            Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorEnvelope::new(ErrorKind::StorageError, e.to_string()),
            )
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::NotFound(what) => Self::new(
                StatusCode::NOT_FOUND,
                ErrorEnvelope::new(ErrorKind::NotFound, format!("Run not found: {what}")),
            ),
            EngineError::Unavailable(msg) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorEnvelope::new(ErrorKind::EngineUnavailable, msg),
            ),
            other => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorEnvelope::new(ErrorKind::WorkflowSubmissionError, other.to_string()),
            ),
        }
    }
}

impl From<ProgressError> for ApiError {
    fn from(e: ProgressError) -> Self {
        match e {
            ProgressError::UnknownRun(run_id) => Self::fuzzing_run_not_found(run_id.as_str()),
            ProgressError::Regression { .. } => Self::validation(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
