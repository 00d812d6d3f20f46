// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

use super::*;
use serde_json::json;

#[tokio::test]
async fn start_records_and_describe_reports_running() {
    let engine = FakeEngine::new();
    let run = RunId::new("wf-1234");

    engine
        .start("Entry", vec![json!("t")], &run, "secrets-queue", None)
        .await
        .unwrap();

    let started = engine.started();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].task_queue, "secrets-queue");
    assert_eq!(engine.describe(&run).await.unwrap().status, RunStatus::Running);
}

#[tokio::test]
async fn cancel_moves_to_cancelled() {
    let engine = FakeEngine::new();
    let run = RunId::new("wf-1234");
    engine.start("Entry", vec![], &run, "q", None).await.unwrap();
    engine.cancel(&run).await.unwrap();

    let desc = engine.describe(&run).await.unwrap();
    assert_eq!(desc.status, RunStatus::Cancelled);
    assert!(desc.close_time.is_some());
}

#[tokio::test]
async fn offline_engine_is_unavailable() {
    let engine = FakeEngine::new();
    engine.set_available(false);
    let err = engine.describe(&RunId::new("x")).await.unwrap_err();
    assert!(matches!(err, EngineError::Unavailable(_)));
}

#[tokio::test]
async fn unknown_run_is_not_found() {
    let engine = FakeEngine::new();
    assert!(matches!(
        engine.describe(&RunId::new("ghost")).await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        engine.result(&RunId::new("ghost"), None).await,
        Err(EngineError::NotFound(_))
    ));
}
