// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! On-demand worker lifecycle over docker compose.
//!
//! Workers are per-vertical containers the engine dispatches activities to.
//! This module finds the compose stack, picks a host-appropriate build file,
//! starts workers on demand, waits for health, and stops them individually
//! (never via a broad compose-down, which would take core services with it).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::api::ApiClient;

/// Container name prefix shared by every Crashwise service.
const PROJECT_PREFIX: &str = "crashwise";

/// Worker info as served by `GET /workflows/{name}/worker-info`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerInfo {
    pub vertical: String,
    #[serde(default)]
    pub worker_service: Option<String>,
}

impl WorkerInfo {
    pub fn worker_service(&self) -> String {
        self.worker_service
            .clone()
            .unwrap_or_else(|| format!("worker-{}", self.vertical))
    }
}

/// Per-platform build declaration in a worker's `metadata.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformSpec {
    #[serde(default)]
    pub dockerfile: Option<String>,
}

/// Worker build metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkerMetadata {
    #[serde(default)]
    pub platforms: HashMap<String, PlatformSpec>,
    #[serde(default)]
    pub default_platform: Option<String>,
}

/// Normalize a host architecture to a compose platform label. Unknown
/// architectures fall back to amd64 with a warning.
pub fn normalize_arch(machine: &str) -> &'static str {
    match machine.to_lowercase().as_str() {
        "x86_64" | "amd64" | "x64" => "linux/amd64",
        "arm64" | "aarch64" | "armv8" | "arm64v8" => "linux/arm64",
        other => {
            warn!(arch = other, "unknown architecture, falling back to linux/amd64");
            "linux/amd64"
        }
    }
}

/// Pick the build file for a platform: exact match, declared default
/// platform, then the bare `Dockerfile`.
pub fn select_dockerfile(metadata: &WorkerMetadata, platform: &str) -> String {
    if metadata.platforms.is_empty() {
        return "Dockerfile".to_string();
    }
    if let Some(spec) = metadata.platforms.get(platform) {
        return spec.dockerfile.clone().unwrap_or_else(|| "Dockerfile".to_string());
    }
    let default_platform = metadata.default_platform.as_deref().unwrap_or("linux/amd64");
    warn!(platform, default_platform, "platform not declared, using default");
    if let Some(spec) = metadata.platforms.get(default_platform) {
        return spec.dockerfile.clone().unwrap_or_else(|| "Dockerfile.amd64".to_string());
    }
    "Dockerfile".to_string()
}

/// Compose service name -> container name (`worker-python` ->
/// `crashwise-worker-python`).
pub fn container_name(service: &str) -> String {
    format!("{PROJECT_PREFIX}-{service}")
}

/// Pure location logic: first strategy yielding an existing compose file
/// wins. Strategies in order: backend hint, `.crashwise` marker walk from
/// `start_dir`, explicit root, `start_dir` itself.
pub fn locate_compose(
    backend_hint: Option<&Path>,
    start_dir: &Path,
    env_root: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(hint) = backend_hint {
        if hint.exists() {
            return Some(hint.to_path_buf());
        }
    }

    let mut dir = Some(start_dir);
    while let Some(current) = dir {
        if current.join(".crashwise").exists() {
            let compose = current.join("docker-compose.yml");
            if compose.exists() {
                return Some(compose);
            }
        }
        dir = current.parent();
    }

    if let Some(root) = env_root {
        let compose = root.join("docker-compose.yml");
        if compose.exists() {
            return Some(compose);
        }
    }

    let compose = start_dir.join("docker-compose.yml");
    compose.exists().then_some(compose)
}

/// Manages worker containers for one compose stack.
pub struct WorkerManager {
    compose_file: PathBuf,
    workers_dir: PathBuf,
    startup_timeout: Duration,
    health_check_interval: Duration,
}

impl WorkerManager {
    /// Locate the compose stack: ask the backend, walk for the `.crashwise`
    /// marker, honour `CRASHWISE_ROOT`, then fall back to the cwd.
    pub async fn detect(api: &ApiClient) -> Result<Self> {
        let backend_hint = match api.system_info().await {
            Ok(info) => info
                .get("docker_compose_path")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            Err(e) => {
                debug!(error = %e, "backend not reachable for path lookup");
                None
            }
        };

        let cwd = std::env::current_dir().context("cannot read current directory")?;
        let env_root = std::env::var("CRASHWISE_ROOT").ok().map(PathBuf::from);

        let compose_file =
            locate_compose(backend_hint.as_deref(), &cwd, env_root.as_deref()).context(
                "Cannot find docker-compose.yml. Ensure the backend is running, run from the \
                 Crashwise directory, or set CRASHWISE_ROOT.",
            )?;

        let workers_dir = compose_file
            .parent()
            .map(|p| p.join("workers"))
            .unwrap_or_else(|| PathBuf::from("workers"));

        info!(compose = %compose_file.display(), "worker manager ready");
        Ok(Self::new(compose_file, workers_dir))
    }

    pub fn new(compose_file: PathBuf, workers_dir: PathBuf) -> Self {
        Self {
            compose_file,
            workers_dir,
            startup_timeout: Duration::from_secs(60),
            health_check_interval: Duration::from_secs(2),
        }
    }

    fn read_worker_metadata(&self, vertical: &str) -> WorkerMetadata {
        let path = self.workers_dir.join(vertical).join("metadata.yaml");
        match std::fs::read_to_string(&path) {
            Ok(yaml) => serde_yaml::from_str(&yaml).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "unreadable worker metadata");
                WorkerMetadata::default()
            }),
            Err(_) => WorkerMetadata::default(),
        }
    }

    async fn compose(&self, args: &[&str], env: &[(String, String)]) -> Result<std::process::Output> {
        let mut cmd = Command::new("docker");
        cmd.arg("compose").arg("-f").arg(&self.compose_file).args(args);
        for (key, value) in env {
            cmd.env(key, value);
        }
        debug!(?args, "running docker compose");
        cmd.output().await.context("failed to invoke docker compose")
    }

    async fn inspect(&self, container: &str, format: &str) -> Option<String> {
        let output = Command::new("docker")
            .args(["inspect", "-f", format, container])
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// True iff the container's state is `running`.
    pub async fn is_worker_running(&self, service: &str) -> bool {
        self.inspect(&container_name(service), "{{.State.Running}}")
            .await
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    async fn container_state(&self, service: &str) -> String {
        self.inspect(&container_name(service), "{{.State.Status}}")
            .await
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Health status: `healthy`, `unhealthy`, `starting`, `none` (no health
    /// check defined), or `unknown`.
    async fn health_status(&self, container: &str) -> String {
        match self.inspect(container, "{{.State.Health.Status}}").await {
            None => "unknown".to_string(),
            Some(s) if s.is_empty() || s == "<no value>" => "none".to_string(),
            Some(s) => s,
        }
    }

    /// Bring the service up with the platform-appropriate build file.
    pub async fn start_worker(&self, service: &str) -> Result<bool> {
        let vertical = service.strip_prefix("worker-").unwrap_or(service);
        let platform = normalize_arch(std::env::consts::ARCH);
        let metadata = self.read_worker_metadata(vertical);
        let dockerfile = select_dockerfile(&metadata, platform);

        let env_var = format!("{}_DOCKERFILE", vertical.to_uppercase());
        info!(service, platform, dockerfile = %dockerfile, "starting worker");

        let output = self
            .compose(
                &["up", "-d", "--build", service],
                &[(env_var, dockerfile)],
            )
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(service, %stderr, "worker start failed");
            eprintln!("failed to start worker: {stderr}");
            eprintln!("hint: start it manually with `docker compose up -d {service}`");
            return Ok(false);
        }
        Ok(true)
    }

    /// Poll container state and health until ready or timeout.
    ///
    /// Ready means state is `running` and health is `healthy`, or no health
    /// check is defined. Returns false on timeout without raising; the
    /// worker may still come up later, it is just no longer observed.
    pub async fn wait_for_worker_ready(&self, service: &str, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or(self.startup_timeout);
        let container = container_name(service);
        let started = tokio::time::Instant::now();

        while started.elapsed() < timeout {
            let state = self.container_state(service).await;
            if state == "running" {
                match self.health_status(&container).await.as_str() {
                    "healthy" | "none" => {
                        info!(service, elapsed = started.elapsed().as_secs(), "worker ready");
                        return true;
                    }
                    health => {
                        debug!(service, state = %state, health, "waiting for worker health")
                    }
                }
            } else {
                debug!(service, state = %state, "waiting for worker container");
            }
            tokio::time::sleep(self.health_check_interval).await;
        }

        warn!(service, timeout_secs = timeout.as_secs(), "worker did not become ready");
        false
    }

    /// Stop one worker via compose.
    pub async fn stop_worker(&self, service: &str) -> Result<()> {
        let output = self.compose(&["stop", service], &[]).await?;
        if !output.status.success() {
            bail!(
                "failed to stop worker {service}: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
        info!(service, "worker stopped");
        Ok(())
    }

    /// Stop every running worker container individually. `docker stop` per
    /// container keeps core services (engine, storage, backend) untouched.
    pub async fn stop_all_workers(&self) -> Result<()> {
        let output = Command::new("docker")
            .args([
                "ps",
                "--filter",
                &format!("name={PROJECT_PREFIX}-worker-"),
                "--format",
                "{{.Names}}",
            ])
            .output()
            .await
            .context("failed to list worker containers")?;

        let names: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();

        if names.is_empty() {
            println!("no workers running");
            return Ok(());
        }

        let mut failed = Vec::new();
        for name in &names {
            info!(container = %name, "stopping worker");
            let result = Command::new("docker").args(["stop", name]).output().await;
            match result {
                Ok(output) if output.status.success() => println!("stopped {name}"),
                Ok(output) => {
                    warn!(container = %name, stderr = %String::from_utf8_lossy(&output.stderr), "stop failed");
                    failed.push(name.clone());
                }
                Err(e) => {
                    warn!(container = %name, error = %e, "stop failed");
                    failed.push(name.clone());
                }
            }
        }

        if !failed.is_empty() {
            bail!("{} worker(s) failed to stop: {}", failed.len(), failed.join(", "));
        }
        println!("all workers stopped");
        Ok(())
    }

    /// Ensure the worker behind `info` is running, starting it when allowed.
    pub async fn ensure_worker_running(&self, info: &WorkerInfo, auto_start: bool) -> Result<bool> {
        let service = info.worker_service();
        if self.is_worker_running(&service).await {
            debug!(service = %service, "worker already running");
            return Ok(true);
        }
        if !auto_start {
            return Ok(false);
        }
        if !self.start_worker(&service).await? {
            return Ok(false);
        }
        Ok(self.wait_for_worker_ready(&service, None).await)
    }
}

#[cfg(test)]
#[path = "worker_manager_tests.rs"]
mod tests;
