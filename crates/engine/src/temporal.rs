// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Temporal client over the HTTP/JSON gateway.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};

use cw_core::{RunId, RunStatus};

use crate::client::EngineClient;
use crate::error::EngineError;
use crate::payload;
use crate::types::{retry_policy, RunDescription, RunSummary};

/// Where the engine lives.
#[derive(Debug, Clone)]
pub struct TemporalConfig {
    /// Base URL of the HTTP API (e.g. `http://localhost:7243`).
    pub base_url: String,
    pub namespace: String,
}

impl TemporalConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("TEMPORAL_ADDRESS")
                .unwrap_or_else(|_| "http://localhost:7243".to_string()),
            namespace: std::env::var("TEMPORAL_NAMESPACE")
                .unwrap_or_else(|_| "default".to_string()),
        }
    }
}

/// Production engine client.
pub struct TemporalClient {
    http: reqwest::Client,
    base_url: String,
    namespace: String,
}

impl TemporalClient {
    /// Connect and verify the engine is reachable. Bootstrap retries on the
    /// `Unavailable` this returns while the engine is still coming up.
    pub async fn connect(config: TemporalConfig) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let client = Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            namespace: config.namespace,
        };

        let probe = format!("{}/api/v1/system-info", client.base_url);
        client
            .http
            .get(&probe)
            .send()
            .await
            .map_err(|e| EngineError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

        info!(base_url = %client.base_url, namespace = %client.namespace, "connected to Temporal");
        Ok(client)
    }

    fn workflow_url(&self, run_id: &RunId) -> String {
        format!(
            "{}/api/v1/namespaces/{}/workflows/{}",
            self.base_url, self.namespace, run_id
        )
    }

    async fn read_json(resp: reqwest::Response, context: &str) -> Result<Value, EngineError> {
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EngineError::NotFound(context.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::Engine(format!("{context}: HTTP {status}: {body}")));
        }
        resp.json().await.map_err(|e| EngineError::Transport(e.to_string()))
    }

    /// One long-poll against the close-event history filter. Empty `events`
    /// means the run is still open.
    async fn poll_close_event(&self, run_id: &RunId) -> Result<Option<Value>, EngineError> {
        let url = format!("{}/history", self.workflow_url(run_id));
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("historyEventFilterType", "EVENT_FILTER_TYPE_CLOSE_EVENT"),
                ("waitNewEvent", "true"),
            ])
            .send()
            .await
            .map_err(map_reqwest)?;

        let body = Self::read_json(resp, run_id.as_str()).await?;
        let event = body
            .get("history")
            .and_then(|h| h.get("events"))
            .or_else(|| body.get("events"))
            .and_then(Value::as_array)
            .and_then(|events| events.last())
            .cloned();
        Ok(event)
    }

    fn result_from_close_event(run_id: &RunId, event: &Value) -> Result<Value, EngineError> {
        let event_type = event.get("eventType").and_then(Value::as_str).unwrap_or_default();
        match event_type {
            "EVENT_TYPE_WORKFLOW_EXECUTION_COMPLETED" => {
                let payloads = event
                    .pointer("/workflowExecutionCompletedEventAttributes/result/payloads")
                    .and_then(Value::as_array);
                match payloads.and_then(|p| p.first()) {
                    Some(p) => payload::decode(p),
                    None => Ok(Value::Null),
                }
            }
            "EVENT_TYPE_WORKFLOW_EXECUTION_FAILED" => {
                let message = event
                    .pointer("/workflowExecutionFailedEventAttributes/failure/message")
                    .and_then(Value::as_str)
                    .unwrap_or("workflow failed");
                Err(EngineError::Engine(format!("run {run_id} failed: {message}")))
            }
            "EVENT_TYPE_WORKFLOW_EXECUTION_CANCELED" => {
                Err(EngineError::Engine(format!("run {run_id} was cancelled")))
            }
            "EVENT_TYPE_WORKFLOW_EXECUTION_TERMINATED" => {
                Err(EngineError::Engine(format!("run {run_id} was terminated")))
            }
            "EVENT_TYPE_WORKFLOW_EXECUTION_TIMED_OUT" => {
                Err(EngineError::Engine(format!("run {run_id} timed out")))
            }
            other => Err(EngineError::Decode(format!("unexpected close event: {other}"))),
        }
    }
}

/// Map the engine's status vocabulary onto ours.
pub(crate) fn map_status(status: &str) -> RunStatus {
    match status {
        "WORKFLOW_EXECUTION_STATUS_RUNNING" => RunStatus::Running,
        "WORKFLOW_EXECUTION_STATUS_COMPLETED" => RunStatus::Completed,
        "WORKFLOW_EXECUTION_STATUS_FAILED" => RunStatus::Failed,
        "WORKFLOW_EXECUTION_STATUS_CANCELED" => RunStatus::Cancelled,
        _ => RunStatus::Unknown,
    }
}

fn map_reqwest(e: reqwest::Error) -> EngineError {
    if e.is_connect() || e.is_timeout() {
        EngineError::Unavailable(e.to_string())
    } else {
        EngineError::Transport(e.to_string())
    }
}

fn parse_time(v: Option<&Value>) -> Option<DateTime<Utc>> {
    v.and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

#[async_trait]
impl EngineClient for TemporalClient {
    async fn start(
        &self,
        entry_type: &str,
        args: Vec<Value>,
        run_id: &RunId,
        task_queue: &str,
        execution_timeout: Option<Duration>,
    ) -> Result<(), EngineError> {
        let payloads = args
            .iter()
            .map(payload::encode)
            .collect::<Result<Vec<_>, _>>()?;

        let mut body = json!({
            "workflowId": run_id.as_str(),
            "workflowType": {"name": entry_type},
            "taskQueue": {"name": task_queue},
            "input": {"payloads": payloads},
            "requestId": uuid::Uuid::new_v4().to_string(),
            "retryPolicy": {
                "initialInterval": format!("{}s", retry_policy::INITIAL_INTERVAL_SECS),
                "maximumInterval": format!("{}s", retry_policy::MAXIMUM_INTERVAL_SECS),
                "maximumAttempts": retry_policy::MAXIMUM_ATTEMPTS,
                "backoffCoefficient": retry_policy::BACKOFF_COEFFICIENT,
            },
        });
        if let Some(timeout) = execution_timeout {
            body["workflowExecutionTimeout"] = json!(format!("{}s", timeout.as_secs()));
        }

        debug!(run_id = %run_id, entry_type, task_queue, "starting workflow");
        let resp = self
            .http
            .post(self.workflow_url(run_id))
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest)?;
        Self::read_json(resp, run_id.as_str()).await?;

        info!(run_id = %run_id, task_queue, "workflow started");
        Ok(())
    }

    async fn describe(&self, run_id: &RunId) -> Result<RunDescription, EngineError> {
        let resp = self
            .http
            .get(self.workflow_url(run_id))
            .send()
            .await
            .map_err(map_reqwest)?;
        let body = Self::read_json(resp, run_id.as_str()).await?;

        let info = body
            .get("workflowExecutionInfo")
            .ok_or_else(|| EngineError::Decode("describe response has no execution info".into()))?;

        let status = info
            .get("status")
            .and_then(Value::as_str)
            .map(map_status)
            .unwrap_or(RunStatus::Unknown);

        let task_queue = body
            .pointer("/executionConfig/taskQueue/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(RunDescription {
            status,
            start_time: parse_time(info.get("startTime")),
            execution_time: parse_time(info.get("executionTime")),
            close_time: parse_time(info.get("closeTime")),
            task_queue,
        })
    }

    async fn result(
        &self,
        run_id: &RunId,
        timeout: Option<Duration>,
    ) -> Result<Value, EngineError> {
        let wait = async {
            loop {
                if let Some(event) = self.poll_close_event(run_id).await? {
                    return Self::result_from_close_event(run_id, &event);
                }
            }
        };

        match timeout {
            Some(t) => tokio::time::timeout(t, wait).await.map_err(|_| EngineError::Timeout)?,
            None => wait.await,
        }
    }

    async fn cancel(&self, run_id: &RunId) -> Result<(), EngineError> {
        let url = format!("{}/cancel", self.workflow_url(run_id));
        let resp = self.http.post(&url).json(&json!({})).send().await.map_err(map_reqwest)?;
        Self::read_json(resp, run_id.as_str()).await?;
        info!(run_id = %run_id, "workflow cancelled");
        Ok(())
    }

    async fn list(
        &self,
        filter: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RunSummary>, EngineError> {
        let url = format!("{}/api/v1/namespaces/{}/workflows", self.base_url, self.namespace);
        let mut req = self.http.get(&url).query(&[("pageSize", limit.to_string())]);
        if let Some(query) = filter {
            req = req.query(&[("query", query)]);
        }
        let resp = req.send().await.map_err(map_reqwest)?;
        let body = Self::read_json(resp, "list workflows").await?;

        let mut runs = Vec::new();
        if let Some(executions) = body.get("executions").and_then(Value::as_array) {
            for exec in executions.iter().take(limit) {
                let run_id = exec
                    .pointer("/execution/workflowId")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                runs.push(RunSummary {
                    run_id: RunId::new(run_id),
                    entry_type: exec
                        .pointer("/type/name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    status: exec
                        .get("status")
                        .and_then(Value::as_str)
                        .map(map_status)
                        .unwrap_or(RunStatus::Unknown),
                    start_time: parse_time(exec.get("startTime")),
                    close_time: parse_time(exec.get("closeTime")),
                    task_queue: exec
                        .get("taskQueue")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                });
            }
        }
        Ok(runs)
    }
}

#[cfg(test)]
#[path = "temporal_tests.rs"]
mod tests;
