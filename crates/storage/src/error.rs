// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Storage failure taxonomy.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The remote object does not exist (404 / NoSuchKey).
    #[error("not found in storage: {0}")]
    NotFound(String),

    /// The caller pointed at a local file that is not there.
    #[error("local file missing: {0}")]
    MissingLocal(PathBuf),

    /// Transport or service failure talking to the object store.
    #[error("storage transport error: {0}")]
    Transport(String),

    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("result blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::MissingLocal(_))
    }
}
