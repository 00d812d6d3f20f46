// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Submission specs: the happy path and its failure envelope.

use serde_json::json;

use cw_core::TargetId;
use cw_daemon::router;

use super::prelude::*;

#[tokio::test]
async fn happy_submit_routes_to_the_vertical_queue_with_positional_args() {
    let (ctx, engine, store) = test_ctx();
    let app = router(ctx);

    // 1 KiB tarball, one user-supplied parameter
    let (status, body) = post_multipart(
        app,
        "/workflows/gitleaks_detection/upload-and-submit",
        &[0u8; 1024],
        Some(r#"{"no_git": true}"#),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "RUNNING");
    let run_id = body["run_id"].as_str().unwrap();
    assert!(run_id.starts_with("gitleaks_detection-"));
    let suffix = run_id.rsplit('-').next().unwrap();
    assert_eq!(suffix.len(), 8);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));

    // Engine started on `secrets-queue` with args [target_id, "detect", true, false]
    let started = engine.started();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].task_queue, "secrets-queue");
    assert_eq!(started[0].entry_type, "GitleaksDetectionWorkflow");
    assert_eq!(started[0].args.len(), 4);
    assert_eq!(started[0].args[1], json!("detect"));
    assert_eq!(started[0].args[2], json!(true));
    assert_eq!(started[0].args[3], json!(false));

    // The leading arg names the blob the store actually holds
    let target_id = TargetId::new(started[0].args[0].as_str().unwrap());
    assert_eq!(store.target_bytes(&target_id).unwrap(), vec![0u8; 1024]);
    let metadata = store.target_metadata(&target_id).unwrap();
    assert_eq!(metadata.get("workflow").map(String::as_str), Some("gitleaks_detection"));
    assert_eq!(metadata.get("upload_method").map(String::as_str), Some("multipart"));
}

#[tokio::test]
async fn unknown_workflow_is_a_404_envelope_naming_alternatives() {
    let (ctx, _engine, _store) = test_ctx();
    let (status, body) =
        post_multipart(router(ctx), "/workflows/nope/upload-and-submit", b"x", None).await;

    assert_eq!(status, 404);
    assert_eq!(body["error"]["type"], "WorkflowNotFound");
    let first = body["error"]["suggestions"][0].as_str().unwrap();
    assert!(first.contains("Available"));
    assert!(first.contains("gitleaks_detection"));
    assert!(body["error"]["timestamp"].is_string());
}

#[tokio::test]
async fn oversized_upload_is_rejected_before_any_side_effect() {
    let (ctx, engine, store) = ready_ctx_with(
        vec![gitleaks_definition(), fuzzing_definition()],
        |ctx| ctx.upload_max_bytes = 4096,
    );

    let (status, body) = post_multipart(
        router(ctx),
        "/workflows/gitleaks_detection/upload-and-submit",
        &[7u8; 8192],
        None,
    )
    .await;

    assert_eq!(status, 413);
    assert_eq!(body["error"]["type"], "FileTooLarge");
    assert_eq!(store.target_count(), 0);
    assert!(engine.started().is_empty());
}

#[tokio::test]
async fn repeated_submissions_never_collide() {
    let (ctx, engine, _store) = test_ctx();

    for _ in 0..5 {
        let (status, _body) = post_multipart(
            router(ctx.clone()),
            "/workflows/gitleaks_detection/upload-and-submit",
            b"bytes",
            None,
        )
        .await;
        assert_eq!(status, 200);
    }

    let started = engine.started();
    let mut ids: Vec<String> =
        started.iter().map(|s| s.run_id.to_string()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}
