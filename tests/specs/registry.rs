// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Discovery-to-surface specs: a toolbox sweep ends up on the wire.

use std::fs;
use std::sync::Arc;

use cw_daemon::router;
use cw_daemon::test_support::force_ready;
use cw_engine::FakeEngine;
use tempfile::TempDir;

use super::prelude::*;

fn toolbox() -> TempDir {
    let root = TempDir::new().unwrap();
    let write = |dir: &str, yaml: &str| {
        let path = root.path().join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("metadata.yaml"), yaml).unwrap();
    };

    write(
        "gitleaks_detection",
        r#"
name: gitleaks_detection
version: "1.2.0"
description: Detect hardcoded secrets
vertical: secrets
entry_type: GitleaksDetectionWorkflow
tags: [secrets]
"#,
    );
    write(
        "ossfuzz_campaign",
        r#"
name: ossfuzz_campaign
version: "0.3.0"
description: Long-running fuzzing campaign
vertical: ossfuzz
entry_type: OssFuzzCampaignWorkflow
tags: [fuzzing]
"#,
    );
    // This one is malformed and must not abort the sweep
    write("broken", "name: [unterminated");
    root
}

#[tokio::test]
async fn swept_toolbox_is_served_with_worker_routing() {
    let toolbox = toolbox();
    let found = cw_registry::discover(toolbox.path());
    assert_eq!(found.len(), 2);

    let ctx = cold_ctx();
    ctx.registry.publish(found);
    ctx.set_engine(Arc::new(FakeEngine::new()));
    force_ready(&ctx);

    let (_status, body) = get_json(router(ctx.clone()), "/workflows/").await;
    let names: Vec<&str> = body["workflows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["gitleaks_detection", "ossfuzz_campaign"]);

    let (_status, info) =
        get_json(router(ctx), "/workflows/ossfuzz_campaign/worker-info").await;
    assert_eq!(info["vertical"], "ossfuzz");
    assert_eq!(info["task_queue"], "ossfuzz-queue");
    assert_eq!(info["worker_service"], "worker-ossfuzz");
}

#[tokio::test]
async fn schema_endpoint_matches_the_sweep_contract() {
    let (ctx, _engine, _store) = test_ctx();
    let (_status, schema) = get_json(router(ctx), "/workflows/metadata/schema").await;

    // Every field the sweep requires is required by the published schema
    let required: Vec<&str> = schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    for field in ["name", "vertical", "entry_type"] {
        assert!(required.contains(&field), "{field} missing from schema");
    }
}
