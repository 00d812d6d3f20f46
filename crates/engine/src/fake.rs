// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! In-memory `EngineClient` for tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;

use cw_core::{RunId, RunStatus};

use crate::client::EngineClient;
use crate::error::EngineError;
use crate::types::{RunDescription, RunSummary};

/// One recorded start call, for assertions.
#[derive(Debug, Clone)]
pub struct StartedRun {
    pub run_id: RunId,
    pub entry_type: String,
    pub task_queue: String,
    pub args: Vec<Value>,
    pub execution_timeout: Option<Duration>,
}

#[derive(Default)]
struct Inner {
    started: Vec<StartedRun>,
    descriptions: HashMap<RunId, RunDescription>,
    results: HashMap<RunId, Value>,
    available: bool,
}

/// Test double recording starts and serving scripted descriptions/results.
pub struct FakeEngine {
    inner: Mutex<Inner>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { available: true, ..Inner::default() }) }
    }

    /// Make every call fail with `Unavailable`, as before bootstrap.
    pub fn set_available(&self, available: bool) {
        self.inner.lock().available = available;
    }

    /// Script a run's status, as the engine would report it.
    pub fn set_status(&self, run_id: &RunId, status: RunStatus) {
        let mut inner = self.inner.lock();
        let entry = inner.descriptions.entry(run_id.clone()).or_insert_with(|| RunDescription {
            status,
            start_time: Some(Utc::now()),
            execution_time: None,
            close_time: None,
            task_queue: String::new(),
        });
        entry.status = status;
        if status.is_terminal() {
            entry.close_time = Some(Utc::now());
        }
    }

    /// Script the value `result` resolves to.
    pub fn set_result(&self, run_id: &RunId, result: Value) {
        self.inner.lock().results.insert(run_id.clone(), result);
    }

    /// Every start call observed so far.
    pub fn started(&self) -> Vec<StartedRun> {
        self.inner.lock().started.clone()
    }

    fn check_available(&self) -> Result<(), EngineError> {
        if self.inner.lock().available {
            Ok(())
        } else {
            Err(EngineError::Unavailable("fake engine offline".to_string()))
        }
    }
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineClient for FakeEngine {
    async fn start(
        &self,
        entry_type: &str,
        args: Vec<Value>,
        run_id: &RunId,
        task_queue: &str,
        execution_timeout: Option<Duration>,
    ) -> Result<(), EngineError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        inner.started.push(StartedRun {
            run_id: run_id.clone(),
            entry_type: entry_type.to_string(),
            task_queue: task_queue.to_string(),
            args,
            execution_timeout,
        });
        inner.descriptions.insert(
            run_id.clone(),
            RunDescription {
                status: RunStatus::Running,
                start_time: Some(Utc::now()),
                execution_time: Some(Utc::now()),
                close_time: None,
                task_queue: task_queue.to_string(),
            },
        );
        Ok(())
    }

    async fn describe(&self, run_id: &RunId) -> Result<RunDescription, EngineError> {
        self.check_available()?;
        self.inner
            .lock()
            .descriptions
            .get(run_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(run_id.to_string()))
    }

    async fn result(
        &self,
        run_id: &RunId,
        _timeout: Option<Duration>,
    ) -> Result<Value, EngineError> {
        self.check_available()?;
        self.inner
            .lock()
            .results
            .get(run_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(run_id.to_string()))
    }

    async fn cancel(&self, run_id: &RunId) -> Result<(), EngineError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        match inner.descriptions.get_mut(run_id) {
            Some(desc) => {
                desc.status = RunStatus::Cancelled;
                desc.close_time = Some(Utc::now());
                Ok(())
            }
            None => Err(EngineError::NotFound(run_id.to_string())),
        }
    }

    async fn list(
        &self,
        _filter: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RunSummary>, EngineError> {
        self.check_available()?;
        let inner = self.inner.lock();
        Ok(inner
            .started
            .iter()
            .rev()
            .take(limit)
            .map(|s| {
                let desc = inner.descriptions.get(&s.run_id);
                RunSummary {
                    run_id: s.run_id.clone(),
                    entry_type: s.entry_type.clone(),
                    status: desc.map(|d| d.status).unwrap_or(RunStatus::Unknown),
                    start_time: desc.and_then(|d| d.start_time),
                    close_time: desc.and_then(|d| d.close_time),
                    task_queue: s.task_queue.clone(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
