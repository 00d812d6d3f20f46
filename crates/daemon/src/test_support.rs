// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Builders and fixtures shared by this crate's tests and the workspace
//! integration specs.

use std::sync::Arc;

use cw_engine::FakeEngine;
use cw_registry::WorkflowDefinition;
use cw_storage::MemoryStore;

use crate::server::AppCtx;

/// Context wired to in-memory fakes, marked ready, with the given
/// workflows published.
pub fn ready_ctx(defs: Vec<WorkflowDefinition>) -> (Arc<AppCtx>, Arc<FakeEngine>, Arc<MemoryStore>)
{
    ready_ctx_with(defs, |_| {})
}

/// `ready_ctx` with a hook to adjust context knobs (upload cap, heartbeat,
/// poll cadence) before it is shared.
pub fn ready_ctx_with(
    defs: Vec<WorkflowDefinition>,
    configure: impl FnOnce(&mut AppCtx),
) -> (Arc<AppCtx>, Arc<FakeEngine>, Arc<MemoryStore>) {
    let engine = Arc::new(FakeEngine::new());
    let store = Arc::new(MemoryStore::new());
    let mut ctx = AppCtx::new(store.clone());
    configure(&mut ctx);
    let ctx = Arc::new(ctx);

    ctx.registry.publish(
        defs.into_iter().map(|d| (d.name.clone(), Arc::new(d))).collect(),
    );
    ctx.set_engine(engine.clone());
    force_ready(&ctx);

    (ctx, engine, store)
}

/// `ready_ctx` with the standard gitleaks + fuzzing fixtures.
pub fn test_ctx() -> (Arc<AppCtx>, Arc<FakeEngine>, Arc<MemoryStore>) {
    ready_ctx(vec![gitleaks_definition(), fuzzing_definition()])
}

/// Context whose bootstrap never ran: every gated endpoint answers with the
/// initializing body.
pub fn cold_ctx() -> Arc<AppCtx> {
    Arc::new(AppCtx::new(Arc::new(MemoryStore::new())))
}

/// Drive the bootstrap state machine to ready without running the task.
pub fn force_ready(ctx: &AppCtx) {
    ctx.bootstrap.begin_attempt();
    ctx.bootstrap.mark_ready();
}

/// The S1 fixture: secrets vertical, three ordered parameters.
pub fn gitleaks_definition() -> WorkflowDefinition {
    parse_definition(
        r#"
name: gitleaks_detection
version: "1.2.0"
description: Detect hardcoded secrets with gitleaks
author: crashwise
tags: [secrets, detection]
vertical: secrets
entry_type: GitleaksDetectionWorkflow
parameters:
  type: object
  properties:
    scan_mode:
      type: string
      default: detect
    no_git:
      type: boolean
      default: true
    redact:
      type: boolean
      default: false
"#,
    )
}

/// A fuzzing-tagged workflow for progress-tracking paths.
pub fn fuzzing_definition() -> WorkflowDefinition {
    parse_definition(
        r#"
name: atheris_fuzzing
version: "0.9.0"
description: Coverage-guided fuzzing campaign
tags: [fuzzing]
vertical: python
entry_type: AtherisFuzzingWorkflow
parameters:
  type: object
  properties:
    duration_seconds:
      type: integer
      default: 3600
    fuzz_config:
      type: object
"#,
    )
}

fn parse_definition(yaml: &str) -> WorkflowDefinition {
    match WorkflowDefinition::from_yaml(yaml) {
        Ok(def) => def,
        Err(e) => unreachable!("fixture yaml is valid: {e}"),
    }
}
