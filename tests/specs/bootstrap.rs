// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Bootstrap gating specs: the surface is reachable before the engine is.

use std::sync::Arc;

use cw_daemon::test_support::force_ready;
use cw_daemon::router;
use cw_engine::FakeEngine;
use cw_registry::WorkflowDefinition;

use super::prelude::*;

#[tokio::test]
async fn workflows_list_soft_gates_then_populates_when_ready() {
    // Engine unavailable: 200 with an empty list and the bootstrap snapshot
    let ctx = cold_ctx();
    let (status, body) = get_json(router(ctx.clone()), "/workflows/").await;
    assert_eq!(status, 200);
    assert!(body["workflows"].as_array().unwrap().is_empty());
    assert_eq!(body["temporal"]["ready"], false);
    assert!(body["message"].as_str().unwrap().contains("initializing"));

    // Engine comes up: the next call sees the populated registry
    let def = gitleaks_definition();
    ctx.registry.publish(
        [(def.name.clone(), Arc::new(def))].into_iter().collect::<std::collections::HashMap<String, Arc<WorkflowDefinition>>>(),
    );
    ctx.set_engine(Arc::new(FakeEngine::new()));
    force_ready(&ctx);

    let (status, body) = get_json(router(ctx), "/workflows/").await;
    assert_eq!(status, 200);
    assert_eq!(body["workflows"][0]["name"], "gitleaks_detection");
    assert_eq!(body["temporal"]["ready"], true);
}

#[tokio::test]
async fn root_and_health_always_answer() {
    let ctx = cold_ctx();
    let (status, body) = get_json(router(ctx.clone()), "/").await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Crashwise API");
    assert_eq!(body["status"], "initializing");
    assert_eq!(body["temporal"]["status"], "not_started");

    let (status, body) = get_json(router(ctx), "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "initializing");
}

#[tokio::test]
async fn ready_backend_reports_healthy() {
    let (ctx, _engine, _store) = test_ctx();
    let (_status, body) = get_json(router(ctx.clone()), "/health").await;
    assert_eq!(body["status"], "healthy");

    let (_status, body) = get_json(router(ctx), "/").await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["workflows_loaded"], 2);
}
