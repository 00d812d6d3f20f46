// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Fuzzing progress endpoints: worker-side pushes, client-side reads, and
//! the two streaming presentations (WebSocket and SSE) of the store.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, Stream, StreamExt};
use futures_util::SinkExt;
use serde_json::json;
use tracing::{debug, warn};

use cw_core::{CrashReport, FuzzingStats, RunId};

use crate::progress::ProgressEvent;
use crate::server::{ApiError, AppCtx};

/// `GET /fuzzing/{run_id}/stats`
pub async fn get_stats(
    State(ctx): State<Arc<AppCtx>>,
    Path(run_id): Path<String>,
) -> Result<Json<FuzzingStats>, ApiError> {
    Ok(Json(ctx.progress.read_stats(&RunId::new(run_id))?))
}

/// `POST /fuzzing/{run_id}/stats`: worker-side push.
pub async fn post_stats(
    State(ctx): State<Arc<AppCtx>>,
    Path(run_id): Path<String>,
    Json(mut stats): Json<FuzzingStats>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let run = RunId::new(run_id);
    // The path is authoritative; a worker cannot post into another run
    stats.run_id = run.clone();

    debug!(
        run_id = %run,
        executions = stats.executions,
        eps = stats.executions_per_sec,
        crashes = stats.crashes,
        corpus = stats.corpus_size,
        "stats update received"
    );
    ctx.progress.put_stats(&run, stats)?;
    Ok(Json(json!({"message": "stats updated"})))
}

/// `GET /fuzzing/{run_id}/crashes`
pub async fn get_crashes(
    State(ctx): State<Arc<AppCtx>>,
    Path(run_id): Path<String>,
) -> Result<Json<Vec<CrashReport>>, ApiError> {
    Ok(Json(ctx.progress.read_crashes(&RunId::new(run_id))?))
}

/// `POST /fuzzing/{run_id}/crash`: worker-side push.
pub async fn post_crash(
    State(ctx): State<Arc<AppCtx>>,
    Path(run_id): Path<String>,
    Json(mut crash): Json<CrashReport>,
) -> Json<serde_json::Value> {
    let run = RunId::new(run_id);
    crash.run_id = run.clone();
    ctx.progress.append_crash(&run, crash);
    Json(json!({"message": "crash recorded"}))
}

/// `DELETE /fuzzing/{run_id}`: purge the progress track.
pub async fn purge(
    State(ctx): State<Arc<AppCtx>>,
    Path(run_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let run = RunId::new(&run_id);
    ctx.progress.purge(&run)?;
    Ok(Json(json!({"message": format!("Cleaned up fuzzing run {run_id}")})))
}

/// `GET /fuzzing/{run_id}/live`: WebSocket stream.
pub async fn ws_live(
    State(ctx): State<Arc<AppCtx>>,
    Path(run_id): Path<String>,
    upgrade: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let run = RunId::new(&run_id);
    if !ctx.progress.is_tracked(&run) {
        return Err(ApiError::fuzzing_run_not_found(&run_id));
    }
    Ok(upgrade.on_upgrade(move |socket| handle_ws(ctx, run, socket)))
}

async fn handle_ws(ctx: Arc<AppCtx>, run: RunId, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();

    // Register before pushing the snapshot so no event can slip between
    let Ok((subscriber, mailbox, snapshot)) = ctx.progress.subscribe(&run) else {
        let _ = sender.close().await;
        return;
    };

    let snapshot_frame = ProgressEvent::Stats(snapshot).ws_frame().to_string();
    if sender.send(Message::Text(snapshot_frame)).await.is_err() {
        ctx.progress.unsubscribe(&run, subscriber);
        return;
    }

    loop {
        tokio::select! {
            event = mailbox.recv() => {
                let Some(event) = event else { break };
                let frame = event.ws_frame().to_string();
                if sender.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) if text == "ping" => {
                        if sender.send(Message::Text("pong".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(run_id = %run, error = %e, "websocket error");
                        break;
                    }
                    // Binary frames and pongs are ignored
                    Some(Ok(_)) => {}
                }
            }
            _ = tokio::time::sleep(ctx.ws_heartbeat) => {
                let heartbeat = json!({"type": "heartbeat"}).to_string();
                if sender.send(Message::Text(heartbeat)).await.is_err() {
                    break;
                }
            }
        }
    }

    // Single exit point: the subscriber is removed exactly once
    ctx.progress.unsubscribe(&run, subscriber);
    let _ = sender.close().await;
    debug!(run_id = %run, "websocket subscriber disconnected");
}

/// `GET /fuzzing/{run_id}/stream`: Server-Sent Events.
///
/// Polls current state on a fixed cadence and emits fresh stats plus any
/// crashes newer than the last emit watermark. Ends when the run is purged
/// or the client disconnects.
pub async fn sse_stream(
    State(ctx): State<Arc<AppCtx>>,
    Path(run_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let run = RunId::new(&run_id);
    if !ctx.progress.is_tracked(&run) {
        return Err(ApiError::fuzzing_run_not_found(&run_id));
    }

    struct PollState {
        ctx: Arc<AppCtx>,
        run: RunId,
        watermark: DateTime<Utc>,
        first: bool,
    }

    let state = PollState { ctx, run, watermark: Utc::now(), first: true };

    let ticks = stream::unfold(state, |mut state| async move {
        if !state.first {
            tokio::time::sleep(state.ctx.sse_poll).await;
        }
        state.first = false;

        let stats = state.ctx.progress.read_stats(&state.run).ok()?;
        let fresh = state
            .ctx
            .progress
            .crashes_since(&state.run, state.watermark)
            .unwrap_or_default();
        state.watermark = Utc::now();

        let mut events = Vec::with_capacity(1 + fresh.len());
        events.push(Ok(Event::default()
            .data(json!({"type": "stats", "data": stats}).to_string())));
        for crash in fresh {
            events.push(Ok(Event::default()
                .data(json!({"type": "crash", "data": crash}).to_string())));
        }
        Some((stream::iter(events), state))
    })
    .flatten();

    Ok(Sse::new(ticks).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
#[path = "fuzzing_tests.rs"]
mod tests;
