// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! The submit command: worker bring-up, upload, and run handoff.

use std::path::Path;

use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::worker_manager::{WorkerInfo, WorkerManager};

pub async fn run(
    api: &ApiClient,
    workflow: &str,
    target: &Path,
    parameters: Option<&str>,
    timeout: Option<u64>,
    auto_start: bool,
) -> Result<()> {
    // Make sure the vertical's worker can actually serve the run
    let info_body = api.worker_info(workflow).await?;
    if let Ok(info) = serde_json::from_value::<WorkerInfo>(info_body.clone()) {
        match WorkerManager::detect(api).await {
            Ok(manager) => {
                if !manager.ensure_worker_running(&info, auto_start).await? {
                    anyhow::bail!(
                        "worker {} is not running (pass --auto-start to start it)",
                        info.worker_service()
                    );
                }
            }
            Err(e) => {
                // Submission still works when the worker is managed elsewhere
                tracing::warn!(error = %e, "worker manager unavailable, submitting anyway");
            }
        }
    }

    let response = api
        .upload_and_submit(workflow, target, parameters, timeout)
        .await
        .context("submission failed")?;

    if let Some(run_id) = response.get("run_id").and_then(|v| v.as_str()) {
        println!("run submitted: {run_id}");
        println!("  status:   cw status {run_id}");
        println!("  findings: cw findings {run_id}");
    } else {
        // Initializing backend returns the bootstrap snapshot instead
        println!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
    }
    Ok(())
}
