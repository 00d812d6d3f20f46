// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! HTTP surface: routing, shared context, and the readiness gate.

mod error;
mod fuzzing;
mod runs;
mod system;
mod workflows;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use cw_engine::EngineClient;
use cw_registry::Registry;
use cw_storage::ObjectStore;

use crate::bootstrap::{BootstrapSnapshot, BootstrapState};
use crate::progress::ProgressStore;

pub use error::ApiError;

/// Shared daemon context for all request handlers.
pub struct AppCtx {
    pub registry: Registry,
    pub store: Arc<dyn ObjectStore>,
    pub bootstrap: BootstrapState,
    pub progress: ProgressStore,
    pub upload_max_bytes: u64,
    pub ws_heartbeat: Duration,
    pub sse_poll: Duration,
    /// Present once bootstrap has connected; cleared on every retry.
    engine: RwLock<Option<Arc<dyn EngineClient>>>,
}

impl AppCtx {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            registry: Registry::new(),
            store,
            bootstrap: BootstrapState::new(),
            progress: ProgressStore::new(),
            upload_max_bytes: crate::env::upload_max_bytes(),
            ws_heartbeat: crate::env::ws_heartbeat(),
            sse_poll: crate::env::sse_poll_interval(),
            engine: RwLock::new(None),
        }
    }

    pub fn set_engine(&self, engine: Arc<dyn EngineClient>) {
        *self.engine.write() = Some(engine);
    }

    pub fn clear_engine(&self) {
        *self.engine.write() = None;
    }

    /// Bootstrap snapshot including the workflow count.
    pub fn bootstrap_snapshot(&self) -> BootstrapSnapshot {
        self.bootstrap.snapshot(self.registry.snapshot().len())
    }

    /// The engine, or the soft "initializing" rejection for gated endpoints.
    pub fn engine(&self) -> Result<Arc<dyn EngineClient>, NotReady> {
        if !self.bootstrap.is_ready() {
            return Err(NotReady { snapshot: self.bootstrap_snapshot() });
        }
        self.engine
            .read()
            .clone()
            .ok_or_else(|| NotReady { snapshot: self.bootstrap_snapshot() })
    }
}

/// Rejection for engine-gated endpoints while bootstrap is incomplete.
///
/// Renders as HTTP 200 with the bootstrap snapshot rather than a 5xx, so
/// clients can poll without raising.
pub struct NotReady {
    pub snapshot: BootstrapSnapshot,
}

impl NotReady {
    /// Soft body, optionally merged with endpoint-specific empty fields.
    pub fn body(&self, extra: Value) -> Json<Value> {
        let mut body = json!({
            "temporal": self.snapshot,
            "message": "Temporal infrastructure is still initializing",
        });
        if let (Some(merged), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                merged.insert(k.clone(), v.clone());
            }
        }
        Json(body)
    }
}

/// Assemble the full route table.
pub fn router(ctx: Arc<AppCtx>) -> Router {
    let upload_limit = usize::try_from(ctx.upload_max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(1024 * 1024);

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/system/info", get(system::info))
        .route("/workflows/", get(workflows::list))
        .route("/workflows/metadata/schema", get(workflows::schema))
        .route("/workflows/:name/metadata", get(workflows::metadata))
        .route("/workflows/:name/parameters", get(workflows::parameters))
        .route("/workflows/:name/worker-info", get(workflows::worker_info))
        .route("/workflows/:name/submit", post(workflows::submit))
        .route(
            "/workflows/:name/upload-and-submit",
            post(workflows::upload_and_submit).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // The leading segment is a run ID except on the alternative findings
        // path, where it names the workflow; extraction is positional.
        .route("/runs/", get(runs::list))
        .route("/runs/:id/status", get(runs::status))
        .route("/runs/:id/findings", get(runs::findings))
        .route("/runs/:id/findings/:run_id", get(runs::workflow_findings))
        .route("/runs/:id/cancel", post(runs::cancel))
        .route("/fuzzing/:run_id/stats", get(fuzzing::get_stats).post(fuzzing::post_stats))
        .route("/fuzzing/:run_id/crashes", get(fuzzing::get_crashes))
        .route("/fuzzing/:run_id/crash", post(fuzzing::post_crash))
        .route("/fuzzing/:run_id/stream", get(fuzzing::sse_stream))
        .route("/fuzzing/:run_id/live", get(fuzzing::ws_live))
        .route("/fuzzing/:run_id", delete(fuzzing::purge))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Bind and serve until the cancellation token fires.
pub async fn serve(
    ctx: Arc<AppCtx>,
    addr: &str,
    cancel: tokio_util::sync::CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr, "http surface listening");
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}
