// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! `cwd`: the Crashwise control-plane daemon.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cw_daemon::{bootstrap, env, server};
use cw_storage::{S3CachedStore, S3Config};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!(version = env::VERSION, "starting crashwise backend");

    let store = match S3CachedStore::connect(S3Config::from_env()).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "failed to initialize object storage");
            return ExitCode::FAILURE;
        }
    };

    let ctx = Arc::new(server::AppCtx::new(store));
    let cancel = CancellationToken::new();

    // Engine bring-up runs in the background; the surface serves
    // introspection immediately.
    let bootstrap_task = tokio::spawn(bootstrap::run(
        Arc::clone(&ctx),
        bootstrap::BootstrapConfig::from_env(),
        cancel.clone(),
    ));

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    let addr = env::http_addr();
    if let Err(e) = server::serve(Arc::clone(&ctx), &addr, cancel.clone()).await {
        error!(error = %e, addr, "http surface failed");
        cancel.cancel();
        let _ = bootstrap_task.await;
        return ExitCode::FAILURE;
    }

    cancel.cancel();
    let _ = bootstrap_task.await;
    info!("crashwise backend stopped");
    ExitCode::SUCCESS
}
