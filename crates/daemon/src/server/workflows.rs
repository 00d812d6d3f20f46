// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Workflow listing, metadata, and the two submission endpoints.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use cw_core::{ErrorEnvelope, ErrorKind};
use cw_registry::WorkflowDefinition;

use crate::server::{ApiError, AppCtx};
use crate::submit::{parse_user_params, submit_target};

fn lookup(
    ctx: &AppCtx,
    name: &str,
) -> Result<Arc<WorkflowDefinition>, ApiError> {
    let snapshot = ctx.registry.snapshot();
    snapshot
        .get(name)
        .cloned()
        .ok_or_else(|| ApiError::workflow_not_found(name, &snapshot.names()))
}

fn summary(def: &WorkflowDefinition) -> Value {
    let default_target_path = def
        .default_target_path
        .clone()
        .or_else(|| {
            def.default_parameters
                .get("target_path")
                .and_then(Value::as_str)
                .map(String::from)
        });
    json!({
        "name": def.name,
        "version": def.version,
        "description": def.description,
        "author": def.author,
        "tags": def.tags,
        "default_target_path": default_target_path,
    })
}

/// `GET /workflows/`
pub async fn list(State(ctx): State<Arc<AppCtx>>) -> Response {
    match ctx.engine() {
        Err(not_ready) => not_ready.body(json!({"workflows": []})).into_response(),
        Ok(_) => {
            let snapshot = ctx.registry.snapshot();
            let mut workflows: Vec<Value> =
                snapshot.iter().map(|(_, def)| summary(def)).collect();
            workflows.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
            Json(json!({
                "workflows": workflows,
                "temporal": ctx.bootstrap_snapshot(),
            }))
            .into_response()
        }
    }
}

/// `GET /workflows/metadata/schema`: static, never gated.
pub async fn schema() -> Json<Value> {
    Json(cw_registry::metadata_schema())
}

/// `GET /workflows/{name}/metadata`
pub async fn metadata(
    State(ctx): State<Arc<AppCtx>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    if let Err(not_ready) = ctx.engine() {
        return Ok(not_ready.body(json!({})).into_response());
    }
    let def = lookup(&ctx, &name)?;
    Ok(Json(json!({
        "name": def.name,
        "version": def.version,
        "description": def.description,
        "author": def.author,
        "tags": def.tags,
        "parameters": def.parameters,
        "default_parameters": def.default_parameters,
        "required_modules": def.required_modules,
    }))
    .into_response())
}

/// `GET /workflows/{name}/parameters`
pub async fn parameters(
    State(ctx): State<Arc<AppCtx>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    if let Err(not_ready) = ctx.engine() {
        return Ok(not_ready.body(json!({})).into_response());
    }
    let def = lookup(&ctx, &name)?;

    // Fold the effective default into each parameter's schema
    let mut properties = Map::new();
    let mut required = Vec::new();
    for (key, spec) in &def.parameters.properties {
        let mut schema = serde_json::to_value(spec).unwrap_or_else(|_| json!({}));
        if let Some(default) = def.default_parameters.get(key) {
            schema["default"] = default.clone();
        }
        if spec.required {
            required.push(key.clone());
        }
        properties.insert(key.clone(), schema);
    }

    Ok(Json(json!({
        "workflow": def.name,
        "parameters": properties,
        "default_parameters": def.default_parameters,
        "required_parameters": required,
    }))
    .into_response())
}

/// `GET /workflows/{name}/worker-info`
pub async fn worker_info(
    State(ctx): State<Arc<AppCtx>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    if let Err(not_ready) = ctx.engine() {
        return Ok(not_ready.body(json!({})).into_response());
    }
    let def = lookup(&ctx, &name)?;

    // Discovery enforces a non-empty vertical; a definition constructed any
    // other way still gets a structured configuration-bug response.
    if def.vertical.as_str().trim().is_empty() {
        return Err(ApiError::new(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ErrorEnvelope::new(
                ErrorKind::MissingVertical,
                format!("Workflow '{name}' does not specify a vertical in metadata"),
            )
            .with_workflow(&name),
        ));
    }

    Ok(Json(json!({
        "workflow": def.name,
        "vertical": def.vertical,
        "worker_service": def.vertical.worker_service(),
        "task_queue": def.vertical.task_queue(),
        "required": true,
    }))
    .into_response())
}

/// Body of the legacy path-based submission.
#[derive(Debug, Deserialize)]
pub struct WorkflowSubmission {
    #[serde(default)]
    pub target_path: Option<String>,
    #[serde(default)]
    pub parameters: Option<Value>,
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// `POST /workflows/{name}/submit`: deprecated server-local-path variant;
/// kept for compatibility and marked as such in the response.
pub async fn submit(
    State(ctx): State<Arc<AppCtx>>,
    Path(name): Path<String>,
    Json(submission): Json<WorkflowSubmission>,
) -> Result<Response, ApiError> {
    let engine = match ctx.engine() {
        Err(not_ready) => return Ok(not_ready.body(json!({})).into_response()),
        Ok(engine) => engine,
    };
    let def = lookup(&ctx, &name)?;

    let target_path = submission
        .target_path
        .or_else(|| def.default_target_path.clone())
        .map(PathBuf::from)
        .ok_or_else(|| {
            ApiError::new(
                axum::http::StatusCode::BAD_REQUEST,
                ErrorEnvelope::new(ErrorKind::VolumeError, "No target path provided")
                    .with_workflow(&name),
            )
        })?;
    if !target_path.exists() {
        return Err(ApiError::new(
            axum::http::StatusCode::BAD_REQUEST,
            ErrorEnvelope::new(
                ErrorKind::VolumeError,
                format!("Target path does not exist: {}", target_path.display()),
            )
            .with_workflow(&name),
        ));
    }

    let user_params = match submission.parameters {
        None => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(
                ApiError::invalid_parameters("Parameters must be a JSON object")
                    .for_workflow(&name),
            )
        }
    };

    let mut upload_metadata = HashMap::new();
    upload_metadata.insert("workflow".to_string(), name.clone());
    upload_metadata.insert("upload_method".to_string(), "path".to_string());

    let mut resp = submit_target(
        &ctx,
        &engine,
        &def,
        &target_path,
        upload_metadata,
        &user_params,
        submission.timeout.map(Duration::from_secs),
    )
    .await?;
    resp.deprecated = Some(true);
    resp.message = format!(
        "{} (path-based submission is deprecated; use upload-and-submit)",
        resp.message
    );
    Ok(Json(resp).into_response())
}

/// `POST /workflows/{name}/upload-and-submit`: multipart tarball upload,
/// the recommended remote submission path.
pub async fn upload_and_submit(
    State(ctx): State<Arc<AppCtx>>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let engine = match ctx.engine() {
        Err(not_ready) => return Ok(not_ready.body(json!({})).into_response()),
        Ok(engine) => engine,
    };
    let def = lookup(&ctx, &name)?;

    let mut spooled: Option<(tempfile::NamedTempFile, Option<String>)> = None;
    let mut raw_params: Option<String> = None;
    let mut timeout: Option<Duration> = None;

    loop {
        let field = multipart.next_field().await.map_err(|e| {
            ApiError::validation(format!("Malformed multipart body: {e}")).for_workflow(&name)
        })?;
        let Some(mut field) = field else { break };

        let field_name = field.name().map(String::from);
        match field_name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(String::from);
                let tmp = spool_field(&mut field, ctx.upload_max_bytes)
                    .await
                    .map_err(|e| e.for_workflow(&name))?;
                spooled = Some((tmp, filename));
            }
            Some("parameters") => {
                raw_params = Some(field.text().await.map_err(|e| {
                    ApiError::validation(format!("Unreadable parameters field: {e}"))
                })?);
            }
            Some("timeout") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::validation(format!("Unreadable timeout field: {e}"))
                })?;
                let secs = text.trim().parse::<u64>().map_err(|_| {
                    ApiError::validation(format!("Invalid timeout value: {text}"))
                })?;
                timeout = Some(Duration::from_secs(secs));
            }
            _ => {}
        }
    }

    let (tmp, original_filename) = spooled.ok_or_else(|| {
        ApiError::validation("Missing 'file' field in multipart body").for_workflow(&name)
    })?;

    let user_params = parse_user_params(raw_params.as_deref())
        .map_err(|e| e.for_workflow(&name))?;

    let mut upload_metadata = HashMap::new();
    upload_metadata.insert("workflow".to_string(), name.clone());
    upload_metadata.insert("upload_method".to_string(), "multipart".to_string());
    if let Some(filename) = &original_filename {
        upload_metadata.insert("original_filename".to_string(), filename.clone());
    }

    let resp = submit_target(
        &ctx,
        &engine,
        &def,
        tmp.path(),
        upload_metadata,
        &user_params,
        timeout,
    )
    .await?;
    // tmp drops here, removing the spooled upload
    Ok(Json(resp).into_response())
}

/// Stream one multipart field to a temp file, enforcing the byte cap.
///
/// The `NamedTempFile` unlinks on drop, so the partial file disappears on
/// every exit path, including the 413 one.
async fn spool_field(
    field: &mut axum::extract::multipart::Field<'_>,
    cap_bytes: u64,
) -> Result<tempfile::NamedTempFile, ApiError> {
    let tmp = tempfile::Builder::new()
        .prefix("crashwise-upload-")
        .suffix(".tar.gz")
        .tempfile()
        .map_err(|e| ApiError::from(cw_storage::StorageError::Io(e)))?;

    let mut file = tokio::fs::File::create(tmp.path())
        .await
        .map_err(|e| ApiError::from(cw_storage::StorageError::Io(e)))?;

    let mut received: u64 = 0;
    loop {
        let chunk = field.chunk().await.map_err(|e| {
            warn!(error = %e, "upload stream aborted");
            ApiError::validation(format!("Upload stream failed: {e}"))
        })?;
        let Some(chunk) = chunk else { break };

        received += chunk.len() as u64;
        if received > cap_bytes {
            return Err(ApiError::file_too_large(cap_bytes));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::from(cw_storage::StorageError::Io(e)))?;
    }
    file.flush()
        .await
        .map_err(|e| ApiError::from(cw_storage::StorageError::Io(e)))?;

    info!(bytes = received, "upload spooled");
    Ok(tmp)
}

#[cfg(test)]
#[path = "workflows_tests.rs"]
mod tests;
