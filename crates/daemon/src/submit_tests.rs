// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

use super::*;
use crate::test_support::test_ctx;
use serde_json::json;
use yare::parameterized;

#[test]
fn parse_params_accepts_objects_and_empty() {
    assert!(parse_user_params(None).unwrap().is_empty());
    assert!(parse_user_params(Some("")).unwrap().is_empty());

    let map = parse_user_params(Some(r#"{"no_git": true}"#)).unwrap();
    assert_eq!(map["no_git"], json!(true));
}

#[parameterized(
    syntax = { "{not json" },
    array_root = { "[1, 2]" },
    string_root = { "\"flat\"" },
)]
fn parse_params_rejects_non_objects(raw: &str) {
    let err = parse_user_params(Some(raw)).unwrap_err();
    assert_eq!(err.envelope.error.kind, cw_core::ErrorKind::InvalidParameters);
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[parameterized(
    workflow_missing = { "workflow GitleaksDetection not found on queue", cw_core::ErrorKind::WorkflowError },
    volume = { "failed to mount volume /targets", cw_core::ErrorKind::VolumeError },
    memory = { "container killed: out of memory", cw_core::ErrorKind::ResourceError },
    image = { "image worker-secrets missing", cw_core::ErrorKind::ImageError },
    other = { "something odd happened", cw_core::ErrorKind::WorkflowSubmissionError },
)]
fn start_failures_classify(message: &str, expected: cw_core::ErrorKind) {
    assert_eq!(classify_start_failure(message), expected);
}

#[tokio::test]
async fn submit_starts_on_vertical_queue_with_marshalled_args() {
    let (ctx, engine, _store) = test_ctx();
    let def = crate::test_support::gitleaks_definition();

    let dir = tempfile::TempDir::new().unwrap();
    let tarball = dir.path().join("target.tar.gz");
    tokio::fs::write(&tarball, vec![0u8; 1024]).await.unwrap();

    let user: Map<String, Value> =
        [("no_git".to_string(), json!(true))].into_iter().collect();

    let resp = submit_target(
        &ctx,
        &(engine.clone() as Arc<dyn EngineClient>),
        &def,
        &tarball,
        HashMap::new(),
        &user,
        None,
    )
    .await
    .unwrap();

    assert_eq!(resp.status, RunStatus::Running);
    assert!(resp.run_id.as_str().starts_with("gitleaks_detection-"));

    let started = engine.started();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].task_queue, "secrets-queue");
    assert_eq!(started[0].entry_type, "GitleaksDetectionWorkflow");
    // [target_id, "detect", true, false] in schema order
    assert_eq!(started[0].args.len(), 4);
    assert_eq!(started[0].args[1], json!("detect"));
    assert_eq!(started[0].args[2], json!(true));
    assert_eq!(started[0].args[3], json!(false));
}

#[tokio::test]
async fn two_submissions_get_distinct_run_ids() {
    let (ctx, engine, _store) = test_ctx();
    let def = crate::test_support::gitleaks_definition();

    let dir = tempfile::TempDir::new().unwrap();
    let tarball = dir.path().join("t.tar.gz");
    tokio::fs::write(&tarball, b"bytes").await.unwrap();

    let engine_dyn = engine.clone() as Arc<dyn EngineClient>;
    let a = submit_target(&ctx, &engine_dyn, &def, &tarball, HashMap::new(), &Map::new(), None)
        .await
        .unwrap();
    let b = submit_target(&ctx, &engine_dyn, &def, &tarball, HashMap::new(), &Map::new(), None)
        .await
        .unwrap();
    assert_ne!(a.run_id, b.run_id);
}

#[tokio::test]
async fn fuzzing_workflows_get_a_progress_track() {
    let (ctx, engine, _store) = test_ctx();
    let def = crate::test_support::fuzzing_definition();

    let dir = tempfile::TempDir::new().unwrap();
    let tarball = dir.path().join("t.tar.gz");
    tokio::fs::write(&tarball, b"bytes").await.unwrap();

    let resp = submit_target(
        &ctx,
        &(engine as Arc<dyn EngineClient>),
        &def,
        &tarball,
        HashMap::new(),
        &Map::new(),
        None,
    )
    .await
    .unwrap();

    assert!(ctx.progress.is_tracked(&resp.run_id));
    assert_eq!(ctx.progress.read_stats(&resp.run_id).unwrap().workflow, def.name);
}

#[tokio::test]
async fn non_fuzzing_workflows_are_untracked() {
    let (ctx, engine, _store) = test_ctx();
    let def = crate::test_support::gitleaks_definition();

    let dir = tempfile::TempDir::new().unwrap();
    let tarball = dir.path().join("t.tar.gz");
    tokio::fs::write(&tarball, b"bytes").await.unwrap();

    let resp = submit_target(
        &ctx,
        &(engine as Arc<dyn EngineClient>),
        &def,
        &tarball,
        HashMap::new(),
        &Map::new(),
        None,
    )
    .await
    .unwrap();
    assert!(!ctx.progress.is_tracked(&resp.run_id));
}
