// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Per-run fuzzing progress: current stats, crash history, subscribers.
//!
//! State is keyed by run ID with one lock per run. Subscriber delivery is a
//! non-blocking mailbox push, so a slow WebSocket client can never stall a
//! worker's stats post.

mod mailbox;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use cw_core::{CrashReport, FuzzingStats, RunId};

pub use mailbox::Mailbox;

/// Default mailbox depth per subscriber.
const SUBSCRIBER_QUEUE_DEPTH: usize = 256;

/// One event as fanned out to subscribers.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Stats(FuzzingStats),
    Crash(CrashReport),
}

impl ProgressEvent {
    /// WebSocket frame body: `{type, data}`.
    pub fn ws_frame(&self) -> serde_json::Value {
        match self {
            Self::Stats(stats) => json!({"type": "stats_update", "data": stats}),
            Self::Crash(crash) => json!({"type": "crash_report", "data": crash}),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ProgressError {
    #[error("fuzzing run not found: {0}")]
    UnknownRun(RunId),

    #[error("stats regression: {field} decreased")]
    Regression { field: &'static str },
}

#[derive(Debug)]
struct TrackState {
    stats: FuzzingStats,
    crashes: Vec<CrashReport>,
    subscribers: HashMap<u64, Mailbox>,
}

#[derive(Debug)]
struct RunTrack {
    state: Mutex<TrackState>,
}

impl RunTrack {
    fn new(run_id: RunId, workflow: &str) -> Self {
        Self {
            state: Mutex::new(TrackState {
                stats: FuzzingStats::new(run_id, workflow),
                crashes: Vec::new(),
                subscribers: HashMap::new(),
            }),
        }
    }
}

/// Handle returned by `subscribe`; unsubscribing needs both pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

/// Process-local progress store for all tracked runs.
#[derive(Debug, Default)]
pub struct ProgressStore {
    runs: Mutex<HashMap<RunId, Arc<RunTrack>>>,
    next_subscriber: AtomicU64,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&self, run_id: &RunId) -> Result<Arc<RunTrack>, ProgressError> {
        self.runs
            .lock()
            .get(run_id)
            .cloned()
            .ok_or_else(|| ProgressError::UnknownRun(run_id.clone()))
    }

    /// Create an empty track. Idempotent: an existing track is untouched.
    pub fn init(&self, run_id: &RunId, workflow: &str) {
        let mut runs = self.runs.lock();
        runs.entry(run_id.clone())
            .or_insert_with(|| Arc::new(RunTrack::new(run_id.clone(), workflow)));
        debug!(run_id = %run_id, workflow, "progress track initialized");
    }

    pub fn is_tracked(&self, run_id: &RunId) -> bool {
        self.runs.lock().contains_key(run_id)
    }

    /// Replace the current stats snapshot and notify subscribers.
    ///
    /// Rejects unknown runs and pushes whose monotonic counters regress.
    pub fn put_stats(&self, run_id: &RunId, stats: FuzzingStats) -> Result<(), ProgressError> {
        let track = self.track(run_id)?;
        let mut state = track.state.lock();
        if let Some(field) = state.stats.regression(&stats) {
            return Err(ProgressError::Regression { field });
        }
        state.stats = stats.clone();
        // Mailbox pushes are non-blocking; holding the run lock here is what
        // guarantees every subscriber observes posts in acceptance order.
        for mailbox in state.subscribers.values() {
            mailbox.push(ProgressEvent::Stats(stats.clone()));
        }
        Ok(())
    }

    /// Append a crash, bump the crash counter, stamp `last_crash_at`, and
    /// notify. Unknown runs are initialized on the fly: crash reports from a
    /// worker are never dropped because the submission predates the track.
    pub fn append_crash(&self, run_id: &RunId, crash: CrashReport) {
        {
            let runs = self.runs.lock();
            if !runs.contains_key(run_id) {
                drop(runs);
                self.init(run_id, run_id.workflow_name());
            }
        }
        // Invariant: track exists after init; a racing purge loses the crash,
        // which is the semantics of purging.
        let Ok(track) = self.track(run_id) else { return };

        let mut state = track.state.lock();
        state.stats.crashes += 1;
        state.stats.last_crash_at = Some(crash.timestamp);
        state.crashes.push(crash.clone());

        let stats = state.stats.clone();
        for mailbox in state.subscribers.values() {
            mailbox.push(ProgressEvent::Crash(crash.clone()));
            mailbox.push(ProgressEvent::Stats(stats.clone()));
        }
        info!(run_id = %run_id, crash_id = %crash.crash_id, "crash recorded");
    }

    pub fn read_stats(&self, run_id: &RunId) -> Result<FuzzingStats, ProgressError> {
        Ok(self.track(run_id)?.state.lock().stats.clone())
    }

    pub fn read_crashes(&self, run_id: &RunId) -> Result<Vec<CrashReport>, ProgressError> {
        Ok(self.track(run_id)?.state.lock().crashes.clone())
    }

    /// Crashes newer than `watermark`, for the SSE poll loop.
    pub fn crashes_since(
        &self,
        run_id: &RunId,
        watermark: chrono::DateTime<Utc>,
    ) -> Result<Vec<CrashReport>, ProgressError> {
        let track = self.track(run_id)?;
        let state = track.state.lock();
        Ok(state.crashes.iter().filter(|c| c.timestamp > watermark).cloned().collect())
    }

    /// Register a subscriber. Returns its id, mailbox, and the snapshot to
    /// push before live events.
    pub fn subscribe(
        &self,
        run_id: &RunId,
    ) -> Result<(SubscriberId, Mailbox, FuzzingStats), ProgressError> {
        let track = self.track(run_id)?;
        let id = SubscriberId(self.next_subscriber.fetch_add(1, Ordering::Relaxed));
        let mailbox = Mailbox::new(SUBSCRIBER_QUEUE_DEPTH);

        let mut state = track.state.lock();
        state.subscribers.insert(id.0, mailbox.clone());
        Ok((id, mailbox, state.stats.clone()))
    }

    /// Remove and close one subscriber. Safe to call twice.
    pub fn unsubscribe(&self, run_id: &RunId, id: SubscriberId) {
        if let Ok(track) = self.track(run_id) {
            if let Some(mailbox) = track.state.lock().subscribers.remove(&id.0) {
                mailbox.close();
            }
        }
    }

    /// Delete a run's track and close every subscriber channel.
    pub fn purge(&self, run_id: &RunId) -> Result<(), ProgressError> {
        let track = self
            .runs
            .lock()
            .remove(run_id)
            .ok_or_else(|| ProgressError::UnknownRun(run_id.clone()))?;
        let mut state = track.state.lock();
        for (_, mailbox) in state.subscribers.drain() {
            mailbox.close();
        }
        info!(run_id = %run_id, "progress track purged");
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
