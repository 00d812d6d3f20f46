// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! `cw`: Crashwise command-line client.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod api;
mod submit;
mod worker_manager;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use api::ApiClient;
use worker_manager::WorkerManager;

#[derive(Parser)]
#[command(name = "cw", about = "Crashwise security-scan orchestration client")]
struct Cli {
    /// Backend API base URL
    #[arg(long, env = "CRASHWISE_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available workflows
    Workflows,
    /// Show a workflow's parameter schema and defaults
    Parameters { workflow: String },
    /// Upload a target tarball and submit a workflow run
    Submit {
        workflow: String,
        /// Target file or tarball to analyze
        target: PathBuf,
        /// JSON object of workflow parameters
        #[arg(long)]
        parameters: Option<String>,
        /// Execution timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Start the required worker if it is not running
        #[arg(long)]
        auto_start: bool,
    },
    /// Show status of a run
    Status { run_id: String },
    /// Fetch SARIF findings of a finished run
    Findings { run_id: String },
    /// Request cancellation of a run
    Cancel { run_id: String },
    /// Fuzzing progress queries
    Fuzzing {
        #[command(subcommand)]
        command: FuzzingCommand,
    },
    /// Worker lifecycle management
    Worker {
        #[command(subcommand)]
        command: WorkerCommand,
    },
}

#[derive(Subcommand)]
enum FuzzingCommand {
    /// Current statistics for a fuzzing run
    Stats { run_id: String },
    /// Crash reports collected for a fuzzing run
    Crashes { run_id: String },
}

#[derive(Subcommand)]
enum WorkerCommand {
    /// Start the worker serving a vertical
    Start { vertical: String },
    /// Stop the worker serving a vertical
    Stop { vertical: String },
    /// Stop all Crashwise workers
    StopAll,
    /// Check whether a vertical's worker is running
    Status { vertical: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let api = ApiClient::new(cli.api_url.clone());

    match cli.command {
        Command::Workflows => {
            let body = api.list_workflows().await?;
            print_json(&body);
        }
        Command::Parameters { workflow } => {
            let body = api.workflow_parameters(&workflow).await?;
            print_json(&body);
        }
        Command::Submit { workflow, target, parameters, timeout, auto_start } => {
            submit::run(&api, &workflow, &target, parameters.as_deref(), timeout, auto_start)
                .await?;
        }
        Command::Status { run_id } => {
            let body = api.run_status(&run_id).await?;
            print_json(&body);
        }
        Command::Findings { run_id } => {
            let body = api.run_findings(&run_id).await?;
            print_json(&body);
        }
        Command::Cancel { run_id } => {
            let body = api.cancel_run(&run_id).await?;
            print_json(&body);
        }
        Command::Fuzzing { command } => match command {
            FuzzingCommand::Stats { run_id } => {
                let body = api.fuzzing_stats(&run_id).await?;
                print_json(&body);
            }
            FuzzingCommand::Crashes { run_id } => {
                let body = api.fuzzing_crashes(&run_id).await?;
                print_json(&body);
            }
        },
        Command::Worker { command } => {
            let manager = WorkerManager::detect(&api).await?;
            match command {
                WorkerCommand::Start { vertical } => {
                    let service = format!("worker-{vertical}");
                    if !manager.start_worker(&service).await? {
                        anyhow::bail!("worker {service} failed to start");
                    }
                    if !manager.wait_for_worker_ready(&service, None).await {
                        anyhow::bail!("worker {service} did not become ready");
                    }
                    println!("worker ready: {service}");
                }
                WorkerCommand::Stop { vertical } => {
                    let service = format!("worker-{vertical}");
                    manager.stop_worker(&service).await?;
                    println!("worker stopped: {service}");
                }
                WorkerCommand::StopAll => {
                    manager.stop_all_workers().await?;
                }
                WorkerCommand::Status { vertical } => {
                    let service = format!("worker-{vertical}");
                    let running = manager.is_worker_running(&service).await;
                    println!("{service}: {}", if running { "running" } else { "stopped" });
                }
            }
        }
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}
