// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Manifest parsing and validation errors.

use thiserror::Error;

/// Why a single workflow directory was excluded from a sweep.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata.yaml is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("workflow declares no name")]
    MissingName,

    #[error("workflow '{name}' declares no vertical")]
    MissingVertical { name: String },

    #[error("workflow '{name}' declares no entry_type")]
    MissingEntryType { name: String },

    #[error("workflow '{name}': default for parameter '{parameter}' violates its declared schema")]
    BadDefault { name: String, parameter: String },

    #[error("failed to read metadata.yaml: {0}")]
    Io(#[from] std::io::Error),
}
