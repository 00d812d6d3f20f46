// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Submission pipeline: bind a workflow request to a run.
//!
//! Both submit endpoints converge here once a target is on disk: upload to
//! the object store, merge parameters, marshal positional args, start on
//! the vertical's queue, and initialize progress tracking for fuzzing
//! workflows.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use cw_core::{ErrorEnvelope, ErrorKind, RunId, RunStatus};
use cw_engine::{args, EngineClient, EngineError};
use cw_registry::WorkflowDefinition;

use crate::server::{ApiError, AppCtx};

/// Body returned on a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub run_id: RunId,
    pub status: RunStatus,
    pub workflow: String,
    pub message: String,
    /// Set only on the legacy path-based endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

/// Parse the `parameters` form field: must be a JSON object when present.
pub fn parse_user_params(raw: Option<&str>) -> Result<Map<String, Value>, ApiError> {
    let Some(raw) = raw else { return Ok(Map::new()) };
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ApiError::invalid_parameters(format!("Invalid parameters JSON: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::invalid_parameters("Parameters must be a JSON object")),
    }
}

/// Classify an engine-side start failure into the closed error-kind set,
/// pattern-matching the failure text the way operators read it.
pub fn classify_start_failure(message: &str) -> ErrorKind {
    let lower = message.to_lowercase();
    if lower.contains("workflow") && lower.contains("not found") {
        ErrorKind::WorkflowError
    } else if lower.contains("volume") || lower.contains("mount") {
        ErrorKind::VolumeError
    } else if lower.contains("memory") || lower.contains("resource") {
        ErrorKind::ResourceError
    } else if lower.contains("image") {
        ErrorKind::ImageError
    } else {
        ErrorKind::WorkflowSubmissionError
    }
}

/// Upload the target, start the workflow, and initialize progress tracking.
pub async fn submit_target(
    ctx: &Arc<AppCtx>,
    engine: &Arc<dyn EngineClient>,
    def: &WorkflowDefinition,
    target_path: &Path,
    upload_metadata: HashMap<String, String>,
    user_params: &Map<String, Value>,
    timeout: Option<Duration>,
) -> Result<SubmitResponse, ApiError> {
    let target_id = ctx
        .store
        .upload_target(target_path, "api-user", upload_metadata)
        .await
        .map_err(|e| ApiError::from(e).for_workflow(&def.name))?;
    info!(workflow = %def.name, target_id = %target_id, "target uploaded");

    let params = args::effective_params(def, user_params);
    let positional = args::marshal_args(def, &target_id, &params);

    let run_id = RunId::generate(&def.name);
    let task_queue = def.vertical.task_queue();

    engine
        .start(&def.entry_type, positional, &run_id, &task_queue, timeout)
        .await
        .map_err(|e| start_error(ctx, &def.name, e))?;
    info!(run_id = %run_id, queue = %task_queue, "workflow started");

    if def.is_fuzzing() {
        ctx.progress.init(&run_id, &def.name);
    }

    Ok(SubmitResponse {
        run_id,
        status: RunStatus::Running,
        workflow: def.name.clone(),
        message: format!("Workflow '{}' submitted successfully", def.name),
        deprecated: None,
    })
}

fn start_error(ctx: &Arc<AppCtx>, workflow: &str, e: EngineError) -> ApiError {
    warn!(workflow, error = %e, "workflow start failed");
    match e {
        // Carry the bootstrap snapshot so clients can poll for readiness
        EngineError::Unavailable(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorEnvelope::new(ErrorKind::EngineUnavailable, msg).with_workflow(workflow),
        )
        .with_bootstrap(&ctx.bootstrap_snapshot()),
        other => {
            let message = format!("Failed to submit workflow: {other}");
            let kind = classify_start_failure(&message);
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorEnvelope::new(kind, message).with_workflow(workflow),
            )
        }
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
