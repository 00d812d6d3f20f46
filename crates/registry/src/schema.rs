// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! JSON Schema describing the `metadata.yaml` manifests workflow authors
//! must provide.

use serde_json::{json, Value};

/// The schema served at `GET /workflows/metadata/schema`.
pub fn metadata_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Workflow Metadata",
        "description": "Manifest accompanying each workflow directory",
        "type": "object",
        "required": ["name", "version", "description", "vertical", "entry_type"],
        "properties": {
            "name": {
                "type": "string",
                "description": "Unique workflow name",
                "minLength": 1
            },
            "version": {
                "type": "string",
                "description": "Semantic version of the workflow",
                "pattern": "^\\d+\\.\\d+\\.\\d+"
            },
            "description": {
                "type": "string",
                "description": "Human-readable summary"
            },
            "author": {
                "type": "string"
            },
            "tags": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Free-form labels; 'fuzzing' enables progress tracking"
            },
            "vertical": {
                "type": "string",
                "description": "Capability label; selects the task queue and worker image",
                "minLength": 1
            },
            "entry_type": {
                "type": "string",
                "description": "Engine-side workflow type identifier",
                "minLength": 1
            },
            "parameters": {
                "type": "object",
                "description": "JSON-Schema-like parameter declarations",
                "properties": {
                    "type": {"const": "object"},
                    "properties": {
                        "type": "object",
                        "additionalProperties": {
                            "type": "object",
                            "properties": {
                                "type": {
                                    "enum": ["string", "boolean", "integer", "number", "array", "object"]
                                },
                                "description": {"type": "string"},
                                "default": {},
                                "enum": {"type": "array"},
                                "required": {"type": "boolean"}
                            }
                        }
                    }
                }
            },
            "default_parameters": {
                "type": "object",
                "description": "Values used when the submitter omits a parameter"
            },
            "required_modules": {
                "type": "array",
                "items": {"type": "string"}
            },
            "default_target_path": {
                "type": "string",
                "description": "Fallback target path for path-based submission"
            },
            "supported_isolation_modes": {
                "type": "array",
                "items": {"enum": ["shared", "isolated", "copy-on-write"]}
            }
        }
    })
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
