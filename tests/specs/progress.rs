// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Progress fan-out specs: per-subscriber ordering across the store.

use cw_core::{CrashReport, FuzzingStats, RunId};
use cw_daemon::ProgressEvent;

use super::prelude::*;

fn stats(run: &RunId, executions: u64) -> FuzzingStats {
    let mut s = FuzzingStats::new(run.clone(), "atheris_fuzzing");
    s.executions = executions;
    s
}

fn crash(run: &RunId, id: &str) -> CrashReport {
    CrashReport {
        run_id: run.clone(),
        crash_id: id.to_string(),
        timestamp: chrono_now(),
        signal: Some("SIGSEGV".to_string()),
        crash_type: None,
        stack_trace: None,
        input_file: None,
        reproducer: None,
        severity: "medium".to_string(),
        exploitability: None,
    }
}

fn chrono_now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

#[tokio::test]
async fn both_subscribers_observe_stats_then_crash_then_bumped_stats() {
    let (ctx, _engine, _store) = test_ctx();
    let run = RunId::new("atheris_fuzzing-0badc0de");
    ctx.progress.init(&run, "atheris_fuzzing");

    let (_a, mailbox_a, _snap) = ctx.progress.subscribe(&run).unwrap();
    let (_b, mailbox_b, _snap) = ctx.progress.subscribe(&run).unwrap();

    ctx.progress.put_stats(&run, stats(&run, 100)).unwrap();
    ctx.progress.append_crash(&run, crash(&run, "c1"));

    for mailbox in [mailbox_a, mailbox_b] {
        match mailbox.recv().await.unwrap() {
            ProgressEvent::Stats(s) => assert_eq!(s.executions, 100),
            other => panic!("expected stats first, got {other:?}"),
        }
        match mailbox.recv().await.unwrap() {
            ProgressEvent::Crash(c) => assert_eq!(c.crash_id, "c1"),
            other => panic!("expected crash second, got {other:?}"),
        }
        match mailbox.recv().await.unwrap() {
            ProgressEvent::Stats(s) => assert_eq!(s.crashes, 1),
            other => panic!("expected bumped stats third, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn monotonic_counters_never_regress_for_any_observer() {
    let (ctx, _engine, _store) = test_ctx();
    let run = RunId::new("atheris_fuzzing-0badc0de");
    ctx.progress.init(&run, "atheris_fuzzing");
    let (_id, mailbox, _snap) = ctx.progress.subscribe(&run).unwrap();

    ctx.progress.put_stats(&run, stats(&run, 10)).unwrap();
    assert!(ctx.progress.put_stats(&run, stats(&run, 5)).is_err());
    ctx.progress.put_stats(&run, stats(&run, 20)).unwrap();

    let mut last = 0;
    for _ in 0..2 {
        if let Some(ProgressEvent::Stats(s)) = mailbox.recv().await {
            assert!(s.executions >= last);
            last = s.executions;
        }
    }
    assert_eq!(last, 20);
}

#[tokio::test]
async fn purge_ends_every_subscriber_stream() {
    let (ctx, _engine, _store) = test_ctx();
    let run = RunId::new("atheris_fuzzing-0badc0de");
    ctx.progress.init(&run, "atheris_fuzzing");

    let (_a, mailbox_a, _snap) = ctx.progress.subscribe(&run).unwrap();
    let (_b, mailbox_b, _snap) = ctx.progress.subscribe(&run).unwrap();

    ctx.progress.purge(&run).unwrap();
    assert!(mailbox_a.recv().await.is_none());
    assert!(mailbox_b.recv().await.is_none());
    assert!(ctx.progress.purge(&run).is_err());
}
