// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Durable bootstrap state machine.
//!
//! Brings the registry sweep and the engine connection up in the background
//! so the HTTP surface can serve introspection before the runtime is ready.
//! `not_started -> starting -> {ready | error}`; from `error` the task
//! retries with delay `min(base * 2^(attempt-1), cap)`. Shutdown moves to
//! `cancelled` from any state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use cw_engine::{EngineClient, TemporalClient, TemporalConfig};

use crate::server::AppCtx;

/// Lifecycle phase of the bootstrap task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapStatus {
    NotStarted,
    Starting,
    Ready,
    Error,
    Cancelled,
}

#[derive(Debug)]
struct Inner {
    status: BootstrapStatus,
    last_error: Option<String>,
    attempt: u32,
    task_running: bool,
}

/// Bootstrap progress, one mutex around a small struct. Reads are cheap.
#[derive(Debug)]
pub struct BootstrapState {
    inner: Mutex<Inner>,
}

/// Serializable snapshot surfaced on `/`, `/health`, and every
/// "initializing" response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapSnapshot {
    pub ready: bool,
    pub status: BootstrapStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub attempt: u32,
    pub task_running: bool,
    pub workflows_loaded: usize,
}

impl BootstrapState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                status: BootstrapStatus::NotStarted,
                last_error: None,
                attempt: 0,
                task_running: false,
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock().status == BootstrapStatus::Ready
    }

    pub fn snapshot(&self, workflows_loaded: usize) -> BootstrapSnapshot {
        let inner = self.inner.lock();
        BootstrapSnapshot {
            ready: inner.status == BootstrapStatus::Ready,
            status: inner.status,
            last_error: inner.last_error.clone(),
            attempt: inner.attempt,
            task_running: inner.task_running,
            workflows_loaded,
        }
    }

    pub(crate) fn begin_attempt(&self) -> u32 {
        let mut inner = self.inner.lock();
        inner.attempt += 1;
        inner.status = BootstrapStatus::Starting;
        inner.last_error = None;
        inner.task_running = true;
        inner.attempt
    }

    pub(crate) fn mark_ready(&self) {
        let mut inner = self.inner.lock();
        inner.status = BootstrapStatus::Ready;
        inner.task_running = false;
    }

    fn mark_error(&self, message: String) {
        let mut inner = self.inner.lock();
        inner.status = BootstrapStatus::Error;
        inner.last_error = Some(message);
    }

    fn mark_cancelled(&self) {
        let mut inner = self.inner.lock();
        inner.status = BootstrapStatus::Cancelled;
        inner.task_running = false;
    }
}

impl Default for BootstrapState {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs of the bootstrap loop.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub workflows_dir: PathBuf,
    pub temporal: TemporalConfig,
    pub retry_base: Duration,
    pub retry_cap: Duration,
}

impl BootstrapConfig {
    pub fn from_env() -> Self {
        Self {
            workflows_dir: crate::env::workflows_dir(),
            temporal: TemporalConfig::from_env(),
            retry_base: crate::env::startup_retry(),
            retry_cap: crate::env::startup_retry_max(),
        }
    }
}

/// Delay before retry `attempt` (1-based): `min(base * 2^(attempt-1), cap)`.
pub fn backoff(attempt: u32, base: Duration, cap: Duration) -> Duration {
    let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.checked_mul(factor).map_or(cap, |d| d.min(cap))
}

/// Retry loop run as a background task until ready or cancelled.
pub async fn run(ctx: Arc<AppCtx>, config: BootstrapConfig, cancel: CancellationToken) {
    loop {
        if cancel.is_cancelled() {
            ctx.bootstrap.mark_cancelled();
            info!("bootstrap cancelled");
            return;
        }

        let attempt = ctx.bootstrap.begin_attempt();
        // A stale partial snapshot must never be observable
        ctx.registry.clear();
        ctx.clear_engine();

        info!(attempt, "bootstrapping engine infrastructure");
        match attempt_once(&ctx, &config).await {
            Ok(engine) => {
                ctx.set_engine(engine);
                ctx.bootstrap.mark_ready();
                info!(
                    workflows = ctx.registry.snapshot().len(),
                    "engine infrastructure ready"
                );
                return;
            }
            Err(e) => {
                error!(attempt, error = %e, "bootstrap failed");
                ctx.bootstrap.mark_error(e);
                ctx.registry.clear();

                let delay = backoff(attempt, config.retry_base, config.retry_cap);
                info!(delay_secs = delay.as_secs(), "retrying bootstrap");
                tokio::select! {
                    _ = cancel.cancelled() => {
                        ctx.bootstrap.mark_cancelled();
                        info!("bootstrap cancelled during backoff");
                        return;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

async fn attempt_once(
    ctx: &AppCtx,
    config: &BootstrapConfig,
) -> Result<Arc<dyn EngineClient>, String> {
    let workflows = cw_registry::discover(&config.workflows_dir);
    if workflows.is_empty() {
        info!(dir = %config.workflows_dir.display(), "no workflows discovered");
    }
    ctx.registry.publish(workflows);

    let engine = TemporalClient::connect(config.temporal.clone())
        .await
        .map_err(|e| e.to_string())?;
    Ok(Arc::new(engine))
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
