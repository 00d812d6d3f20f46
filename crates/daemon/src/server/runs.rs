// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Run status and findings: a thin query layer over the engine client.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use cw_core::RunId;
use cw_engine::EngineError;

use crate::server::{ApiError, AppCtx};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<usize>,
    /// Restrict to one workflow's runs via its engine-side type.
    #[serde(default)]
    pub workflow: Option<String>,
}

/// `GET /runs/`: recent runs, newest first.
pub async fn list(
    State(ctx): State<Arc<AppCtx>>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let engine = match ctx.engine() {
        Err(not_ready) => return Ok(not_ready.body(json!({"runs": []})).into_response()),
        Ok(engine) => engine,
    };
    let limit = params.limit.unwrap_or(100).clamp(1, 100);

    // A workflow filter maps to the engine's type query
    let filter = params.workflow.as_deref().and_then(|name| {
        ctx.registry
            .snapshot()
            .get(name)
            .map(|def| format!("WorkflowType=\"{}\"", def.entry_type))
    });

    let summaries = engine
        .list(filter.as_deref(), limit)
        .await
        .map_err(ApiError::from)?;

    let runs: Vec<Value> = summaries
        .iter()
        .map(|s| {
            json!({
                "run_id": s.run_id,
                "workflow": s.run_id.workflow_name(),
                "status": s.status,
                "is_completed": s.status.is_terminal(),
                "is_running": s.status.is_running(),
                "is_failed": s.status.is_failed(),
                "created_at": s.start_time,
                "updated_at": s.close_time,
                "task_queue": s.task_queue,
            })
        })
        .collect();

    Ok(Json(json!({"runs": runs, "temporal": ctx.bootstrap_snapshot()})).into_response())
}

/// `GET /runs/{run_id}/status`
pub async fn status(
    State(ctx): State<Arc<AppCtx>>,
    Path(run_id): Path<String>,
) -> Result<Response, ApiError> {
    let engine = match ctx.engine() {
        Err(not_ready) => return Ok(not_ready.body(json!({})).into_response()),
        Ok(engine) => engine,
    };
    let run = RunId::new(&run_id);

    let desc = engine.describe(&run).await.map_err(|e| match e {
        EngineError::NotFound(_) => ApiError::run_not_found(&run_id),
        other => ApiError::from(other).for_run(&run_id),
    })?;

    Ok(Json(json!({
        "run_id": run,
        "workflow": run.workflow_name(),
        "status": desc.status,
        "is_completed": desc.status.is_terminal(),
        "is_failed": desc.status.is_failed(),
        "is_running": desc.status.is_running(),
        "created_at": desc.start_time,
        "updated_at": desc.close_time.or(desc.execution_time),
    }))
    .into_response())
}

/// `GET /runs/{run_id}/findings`
pub async fn findings(
    State(ctx): State<Arc<AppCtx>>,
    Path(run_id): Path<String>,
) -> Result<Response, ApiError> {
    let engine = match ctx.engine() {
        Err(not_ready) => return Ok(not_ready.body(json!({})).into_response()),
        Ok(engine) => engine,
    };
    findings_for(engine, &run_id).await
}

/// `GET /runs/{workflow_name}/findings/{run_id}`: alternative path that
/// names the workflow for clarity, then delegates.
pub async fn workflow_findings(
    State(ctx): State<Arc<AppCtx>>,
    Path((workflow_name, run_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let engine = match ctx.engine() {
        Err(not_ready) => return Ok(not_ready.body(json!({})).into_response()),
        Ok(engine) => engine,
    };
    let snapshot = ctx.registry.snapshot();
    if snapshot.get(&workflow_name).is_none() {
        return Err(ApiError::workflow_not_found(&workflow_name, &snapshot.names()));
    }
    findings_for(engine, &run_id).await
}

async fn findings_for(
    engine: Arc<dyn cw_engine::EngineClient>,
    run_id: &str,
) -> Result<Response, ApiError> {
    let run = RunId::new(run_id);

    let desc = engine.describe(&run).await.map_err(|e| match e {
        EngineError::NotFound(_) => ApiError::run_not_found(run_id),
        other => ApiError::from(other).for_run(run_id),
    })?;

    if !desc.status.is_terminal() {
        let message = if desc.status.is_running() {
            format!("Run {run_id} is still running. Current status: {}", desc.status)
        } else {
            format!("Run {run_id} not completed. Status: {}", desc.status)
        };
        return Err(ApiError::validation(message).for_run(run_id));
    }
    if desc.status.is_failed() {
        return Err(ApiError::validation(format!(
            "Run {run_id} failed. Status: {}",
            desc.status
        ))
        .for_run(run_id));
    }

    let result = engine
        .result(&run, None)
        .await
        .map_err(|e| ApiError::from(e).for_run(run_id))?;

    let sarif = match &result {
        Value::Object(map) => map.get("sarif").cloned().unwrap_or_else(|| json!({})),
        _ => json!({}),
    };

    Ok(Json(json!({
        "workflow": run.workflow_name(),
        "run_id": run,
        "sarif": sarif,
        "metadata": {
            "completion_time": desc.close_time,
            "workflow_version": "unknown",
        },
    }))
    .into_response())
}

/// `POST /runs/{run_id}/cancel`
pub async fn cancel(
    State(ctx): State<Arc<AppCtx>>,
    Path(run_id): Path<String>,
) -> Result<Response, ApiError> {
    let engine = match ctx.engine() {
        Err(not_ready) => return Ok(not_ready.body(json!({})).into_response()),
        Ok(engine) => engine,
    };
    let run = RunId::new(&run_id);

    engine.cancel(&run).await.map_err(|e| match e {
        EngineError::NotFound(_) => ApiError::run_not_found(&run_id),
        other => ApiError::from(other).for_run(&run_id),
    })?;

    Ok(Json(json!({
        "run_id": run,
        "message": format!("Cancellation requested for run {run_id}"),
    }))
    .into_response())
}

#[cfg(test)]
#[path = "runs_tests.rs"]
mod tests;
