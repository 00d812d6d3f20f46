// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

use super::*;

fn stats(executions: u64, crashes: u64, elapsed: u64) -> FuzzingStats {
    FuzzingStats {
        executions,
        crashes,
        elapsed_seconds: elapsed,
        ..FuzzingStats::new(RunId::new("fuzz-00000000"), "fuzz")
    }
}

#[test]
fn new_stats_are_zeroed() {
    let s = FuzzingStats::new(RunId::new("fuzz-00000000"), "fuzz");
    assert_eq!(s.executions, 0);
    assert_eq!(s.crashes, 0);
    assert_eq!(s.corpus_size, 0);
    assert!(s.coverage.is_none());
    assert!(s.last_crash_at.is_none());
}

#[test]
fn regression_detects_decreasing_counters() {
    let prev = stats(100, 2, 30);
    assert_eq!(prev.regression(&stats(99, 2, 30)), Some("executions"));
    assert_eq!(prev.regression(&stats(100, 1, 30)), Some("crashes"));
    assert_eq!(prev.regression(&stats(100, 2, 29)), Some("elapsed_seconds"));
    assert_eq!(prev.regression(&stats(100, 2, 30)), None);
    assert_eq!(prev.regression(&stats(101, 3, 31)), None);
}

#[test]
fn crash_report_defaults_fill_in() {
    let json = r#"{"run_id": "fuzz-00000000", "crash_id": "c1"}"#;
    let crash: CrashReport = serde_json::from_str(json).unwrap();
    assert_eq!(crash.severity, "medium");
    assert!(crash.signal.is_none());
    assert!(crash.timestamp <= Utc::now());
}

#[test]
fn stats_tolerate_partial_worker_payloads() {
    let json = r#"{"run_id": "fuzz-00000000", "workflow": "fuzz", "executions": 42}"#;
    let s: FuzzingStats = serde_json::from_str(json).unwrap();
    assert_eq!(s.executions, 42);
    assert_eq!(s.crashes, 0);
}
