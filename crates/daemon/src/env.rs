// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

/// Service version reported on `/`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP bind address (default `0.0.0.0:8000`).
pub fn http_addr() -> String {
    std::env::var("CWD_HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string())
}

/// Root of the workflow toolbox swept at bootstrap.
pub fn workflows_dir() -> PathBuf {
    std::env::var("CRASHWISE_WORKFLOWS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("toolbox/workflows"))
}

/// Crashwise installation directory on the host, surfaced via `/system/info`
/// so the CLI can find the compose file. Set by the compose stack.
pub fn host_root() -> Option<String> {
    std::env::var("CRASHWISE_HOST_ROOT").ok().filter(|s| !s.is_empty())
}

/// Base delay of the bootstrap backoff (default 5s, floor 1s).
pub fn startup_retry() -> Duration {
    let secs = std::env::var("CRASHWISE_STARTUP_RETRY_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(5)
        .max(1);
    Duration::from_secs(secs)
}

/// Ceiling of the bootstrap backoff (default 60s, never below the base).
pub fn startup_retry_max() -> Duration {
    let base = startup_retry();
    let secs = std::env::var("CRASHWISE_STARTUP_RETRY_MAX_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(60);
    Duration::from_secs(secs).max(base)
}

/// Streamed upload cap in bytes (default 10 GiB).
pub fn upload_max_bytes() -> u64 {
    const DEFAULT: u64 = 10 * 1024 * 1024 * 1024;
    std::env::var("CRASHWISE_UPLOAD_MAX_BYTES")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT)
}

/// WebSocket heartbeat interval (default 30s).
pub fn ws_heartbeat() -> Duration {
    std::env::var("CRASHWISE_WS_HEARTBEAT_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30))
}

/// SSE poll cadence (fixed 5s unless overridden for tests).
pub fn sse_poll_interval() -> Duration {
    std::env::var("CRASHWISE_SSE_POLL_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_max_never_undercuts_base() {
        // With no env overrides the defaults hold this; the clamp in
        // startup_retry_max is what the assertion actually exercises.
        assert!(startup_retry_max() >= startup_retry());
    }

    #[test]
    fn upload_cap_default_is_10_gib() {
        if std::env::var("CRASHWISE_UPLOAD_MAX_BYTES").is_err() {
            assert_eq!(upload_max_bytes(), 10 * 1024 * 1024 * 1024);
        }
    }
}
