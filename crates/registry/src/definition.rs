// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Workflow definition parsed from a `metadata.yaml` manifest.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cw_core::{IsolationMode, Vertical};

use crate::error::MetadataError;

/// Schema of one workflow parameter.
///
/// The shape is JSON-Schema-like but deliberately loose: unknown keys are
/// tolerated so workflow authors can annotate freely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Declared JSON type: string, boolean, integer, number, array, object.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Allowed values, when the parameter is an enumeration.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    #[serde(default)]
    pub required: bool,
}

impl ParamSpec {
    /// Check that `value` matches the declared type and enum membership.
    pub fn accepts(&self, value: &Value) -> bool {
        if let Some(ty) = self.param_type.as_deref() {
            let ok = match ty {
                "string" => value.is_string(),
                "boolean" => value.is_boolean(),
                "integer" => value.is_i64() || value.is_u64(),
                "number" => value.is_number(),
                "array" => value.is_array(),
                "object" => value.is_object(),
                // Unknown declared type: accept anything
                _ => true,
            };
            if !ok {
                return false;
            }
        }
        if let Some(choices) = &self.choices {
            return choices.contains(value);
        }
        true
    }
}

/// Parameter block of a manifest. Declaration order of `properties` is
/// preserved: positional argument marshalling follows it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, ParamSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// One workflow as discovered from its manifest. Immutable after discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub vertical: Vertical,
    /// Engine-side workflow type identifier. An explicit manifest field:
    /// the orchestrator stores strings, never class objects.
    pub entry_type: String,
    #[serde(default)]
    pub parameters: ParameterSchema,
    #[serde(default)]
    pub default_parameters: serde_json::Map<String, Value>,
    #[serde(default)]
    pub required_modules: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_target_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_isolation_modes: Vec<IsolationMode>,
}

fn default_version() -> String {
    "0.6.0".to_string()
}

impl WorkflowDefinition {
    /// Parse a manifest without validating it.
    pub fn from_yaml(yaml: &str) -> Result<Self, MetadataError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Enforce the registry invariants: non-empty name and vertical, and
    /// every default belonging to its declared type/enum.
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.name.trim().is_empty() {
            return Err(MetadataError::MissingName);
        }
        if self.vertical.as_str().trim().is_empty() {
            return Err(MetadataError::MissingVertical { name: self.name.clone() });
        }
        if self.entry_type.trim().is_empty() {
            return Err(MetadataError::MissingEntryType { name: self.name.clone() });
        }

        for (key, spec) in &self.parameters.properties {
            if let Some(default) = &spec.default {
                if !spec.accepts(default) {
                    return Err(MetadataError::BadDefault {
                        name: self.name.clone(),
                        parameter: key.clone(),
                    });
                }
            }
        }
        for (key, value) in &self.default_parameters {
            if let Some(spec) = self.parameters.properties.get(key) {
                if !spec.accepts(value) {
                    return Err(MetadataError::BadDefault {
                        name: self.name.clone(),
                        parameter: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether this workflow gets a progress track on submission.
    ///
    /// Both signals are kept for compatibility: the `fuzzing` tag and the
    /// name heuristic.
    pub fn is_fuzzing(&self) -> bool {
        self.tags.iter().any(|t| t == "fuzzing") || self.name.to_lowercase().contains("fuzz")
    }

    /// Effective default for a parameter: `default_parameters` wins over the
    /// per-property default.
    pub fn default_for(&self, key: &str) -> Option<&Value> {
        self.default_parameters
            .get(key)
            .or_else(|| self.parameters.properties.get(key).and_then(|s| s.default.as_ref()))
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
