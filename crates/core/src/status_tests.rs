// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

use super::*;
use yare::parameterized;

#[parameterized(
    running = { RunStatus::Running, false },
    completed = { RunStatus::Completed, true },
    failed = { RunStatus::Failed, true },
    cancelled = { RunStatus::Cancelled, true },
    unknown = { RunStatus::Unknown, false },
)]
fn terminality(status: RunStatus, terminal: bool) {
    assert_eq!(status.is_terminal(), terminal);
}

#[test]
fn serde_uses_screaming_snake() {
    assert_eq!(serde_json::to_string(&RunStatus::Cancelled).unwrap(), "\"CANCELLED\"");
    let s: RunStatus = serde_json::from_str("\"RUNNING\"").unwrap();
    assert_eq!(s, RunStatus::Running);
}

#[test]
fn display_matches_serde() {
    for s in [
        RunStatus::Running,
        RunStatus::Completed,
        RunStatus::Failed,
        RunStatus::Cancelled,
        RunStatus::Unknown,
    ] {
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json.trim_matches('"'), s.to_string());
    }
}
