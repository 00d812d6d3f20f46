// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Positional argument marshalling.
//!
//! Workflow entries take `[target_id, param_1, param_2, ...]` in the order
//! the parameter schema declares its properties. Values resolve as:
//! submitter's value, else the metadata default, else null. A `_config`
//! key resolving to null becomes an empty mapping (some workflow entries
//! assume a dict-shaped argument).

use serde_json::{Map, Value};

use cw_core::TargetId;
use cw_registry::WorkflowDefinition;

/// Merge defaults with the submitter's parameters; the submitter wins on
/// key conflicts.
pub fn effective_params(
    def: &WorkflowDefinition,
    user_params: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = def.default_parameters.clone();
    for (k, v) in user_params {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

/// Assemble the positional argument vector for an engine start call.
pub fn marshal_args(
    def: &WorkflowDefinition,
    target_id: &TargetId,
    params: &Map<String, Value>,
) -> Vec<Value> {
    let mut args = Vec::with_capacity(1 + def.parameters.properties.len());
    args.push(Value::String(target_id.to_string()));

    for (key, spec) in &def.parameters.properties {
        let mut value = params
            .get(key)
            .cloned()
            .or_else(|| spec.default.clone())
            .unwrap_or(Value::Null);

        if key.ends_with("_config") && value.is_null() {
            value = Value::Object(Map::new());
        }

        args.push(value);
    }

    args
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
