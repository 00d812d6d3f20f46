// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Introspection endpoints: always reachable, never engine-gated.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::env;
use crate::server::AppCtx;

/// `GET /`: service identity plus the bootstrap snapshot.
pub async fn root(State(ctx): State<Arc<AppCtx>>) -> Json<Value> {
    let snapshot = ctx.bootstrap_snapshot();
    Json(json!({
        "name": "Crashwise API",
        "version": env::VERSION,
        "status": if snapshot.ready { "ready" } else { "initializing" },
        "workflows_loaded": snapshot.workflows_loaded,
        "temporal": snapshot,
    }))
}

/// `GET /health`
pub async fn health(State(ctx): State<Arc<AppCtx>>) -> Json<Value> {
    let status = if ctx.bootstrap.is_ready() { "healthy" } else { "initializing" };
    Json(json!({"status": status}))
}

/// `GET /system/info`: host paths the CLI needs to drive docker compose.
pub async fn info() -> Json<Value> {
    let host_root = env::host_root().unwrap_or_default();
    let (compose, workers) = if host_root.is_empty() {
        (String::new(), String::new())
    } else {
        (
            format!("{host_root}/docker-compose.yml"),
            format!("{host_root}/workers"),
        )
    };
    Json(json!({
        "host_root": host_root,
        "docker_compose_path": compose,
        "workers_dir": workers,
    }))
}
