// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Thin client for the backend HTTP API.
//!
//! Failure bodies are the structured envelope; suggestions are rendered
//! verbatim for the user.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use cw_core::ErrorEnvelope;

pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: String) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self { base: base.trim_end_matches('/').to_string(), http }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let resp = self
            .http
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .with_context(|| format!("backend unreachable at {}", self.base))?;
        Self::read(resp).await
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        let mut req = self.http.post(format!("{}{}", self.base, path));
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("backend unreachable at {}", self.base))?;
        Self::read(resp).await
    }

    async fn read(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if status.is_success() {
            return serde_json::from_str(&text).context("backend returned non-JSON body");
        }
        // Render the envelope the way the backend wrote it
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) {
            let mut message = format!("{:?}: {}", envelope.error.kind, envelope.error.message);
            for suggestion in &envelope.error.suggestions {
                message.push_str(&format!("\n  - {suggestion}"));
            }
            return Err(anyhow!(message));
        }
        Err(anyhow!("backend error (HTTP {status}): {text}"))
    }

    pub async fn system_info(&self) -> Result<Value> {
        self.get("/system/info").await
    }

    pub async fn list_workflows(&self) -> Result<Value> {
        self.get("/workflows/").await
    }

    pub async fn workflow_parameters(&self, workflow: &str) -> Result<Value> {
        self.get(&format!("/workflows/{workflow}/parameters")).await
    }

    pub async fn worker_info(&self, workflow: &str) -> Result<Value> {
        self.get(&format!("/workflows/{workflow}/worker-info")).await
    }

    pub async fn run_status(&self, run_id: &str) -> Result<Value> {
        self.get(&format!("/runs/{run_id}/status")).await
    }

    pub async fn run_findings(&self, run_id: &str) -> Result<Value> {
        self.get(&format!("/runs/{run_id}/findings")).await
    }

    pub async fn cancel_run(&self, run_id: &str) -> Result<Value> {
        self.post(&format!("/runs/{run_id}/cancel"), None).await
    }

    pub async fn fuzzing_stats(&self, run_id: &str) -> Result<Value> {
        self.get(&format!("/fuzzing/{run_id}/stats")).await
    }

    pub async fn fuzzing_crashes(&self, run_id: &str) -> Result<Value> {
        self.get(&format!("/fuzzing/{run_id}/crashes")).await
    }

    /// Multipart upload to `upload-and-submit`.
    pub async fn upload_and_submit(
        &self,
        workflow: &str,
        target: &Path,
        parameters: Option<&str>,
        timeout: Option<u64>,
    ) -> Result<Value> {
        let bytes = tokio::fs::read(target)
            .await
            .with_context(|| format!("cannot read target {}", target.display()))?;
        let filename = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "target.tar.gz".to_string());

        let mut form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes)
                .file_name(filename)
                .mime_str("application/gzip")
                .context("invalid mime type")?,
        );
        if let Some(parameters) = parameters {
            form = form.text("parameters", parameters.to_string());
        }
        if let Some(timeout) = timeout {
            form = form.text("timeout", timeout.to_string());
        }

        let resp = self
            .http
            .post(format!("{}/workflows/{workflow}/upload-and-submit", self.base))
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("backend unreachable at {}", self.base))?;
        Self::read(resp).await
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
