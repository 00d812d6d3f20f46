// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

use super::*;
use yare::parameterized;

#[parameterized(
    first = { 1, 5, 60, 5 },
    second = { 2, 5, 60, 10 },
    third = { 3, 5, 60, 20 },
    fourth = { 4, 5, 60, 40 },
    capped = { 5, 5, 60, 60 },
    deep = { 30, 5, 60, 60 },
    tiny_cap = { 1, 5, 3, 3 },
)]
fn backoff_doubles_until_cap(attempt: u32, base_secs: u64, cap_secs: u64, expected_secs: u64) {
    let delay = backoff(
        attempt,
        Duration::from_secs(base_secs),
        Duration::from_secs(cap_secs),
    );
    assert_eq!(delay, Duration::from_secs(expected_secs));
}

#[test]
fn backoff_survives_huge_attempt_counts() {
    let delay = backoff(u32::MAX, Duration::from_secs(5), Duration::from_secs(60));
    assert_eq!(delay, Duration::from_secs(60));
}

#[test]
fn state_machine_progression() {
    let state = BootstrapState::new();
    let snap = state.snapshot(0);
    assert_eq!(snap.status, BootstrapStatus::NotStarted);
    assert!(!snap.ready);
    assert_eq!(snap.attempt, 0);

    assert_eq!(state.begin_attempt(), 1);
    let snap = state.snapshot(0);
    assert_eq!(snap.status, BootstrapStatus::Starting);
    assert!(snap.task_running);

    state.mark_error("engine unreachable".to_string());
    let snap = state.snapshot(0);
    assert_eq!(snap.status, BootstrapStatus::Error);
    assert_eq!(snap.last_error.as_deref(), Some("engine unreachable"));

    // The next attempt clears the error
    assert_eq!(state.begin_attempt(), 2);
    assert!(state.snapshot(0).last_error.is_none());

    state.mark_ready();
    let snap = state.snapshot(3);
    assert!(snap.ready);
    assert_eq!(snap.workflows_loaded, 3);
    assert!(!snap.task_running);
    assert!(state.is_ready());
}

#[test]
fn cancellation_from_any_state() {
    let state = BootstrapState::new();
    state.begin_attempt();
    state.mark_cancelled();
    let snap = state.snapshot(0);
    assert_eq!(snap.status, BootstrapStatus::Cancelled);
    assert!(!snap.ready);
}

#[test]
fn snapshot_serializes_snake_case_status() {
    let state = BootstrapState::new();
    state.begin_attempt();
    let v = serde_json::to_value(state.snapshot(0)).unwrap();
    assert_eq!(v["status"], "starting");
    assert_eq!(v["ready"], false);
}
