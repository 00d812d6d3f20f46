// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! The `ObjectStore` seam between the control plane and blob storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cw_core::{RunId, TargetId};

use crate::cache::CacheStats;
use crate::error::StorageError;

/// Serialization format of a results blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsFormat {
    Json,
    Sarif,
}

impl ResultsFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sarif => "sarif",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Sarif => "application/sarif+json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sarif => "sarif",
        }
    }
}

/// One remote target as seen by a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSummary {
    pub target_id: TargetId,
    pub key: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Persist and retrieve opaque targets and result blobs.
///
/// Production is S3-compatible storage with a local LRU cache; tests swap in
/// an in-memory implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file as a new target. Returns the fresh target ID.
    async fn upload_target(
        &self,
        local_path: &Path,
        owner: &str,
        metadata: HashMap<String, String>,
    ) -> Result<TargetId, StorageError>;

    /// Path to a local copy of the target, downloading on cache miss.
    async fn get_target(&self, target_id: &TargetId) -> Result<PathBuf, StorageError>;

    /// Remove the remote object and any cached copy. Absence on either side
    /// is not an error.
    async fn delete_target(&self, target_id: &TargetId) -> Result<(), StorageError>;

    /// Store a results blob for a run. Returns a stable URL.
    async fn upload_results(
        &self,
        run_id: &RunId,
        results: &Value,
        format: ResultsFormat,
    ) -> Result<String, StorageError>;

    /// Fetch a run's results blob.
    async fn get_results(&self, run_id: &RunId) -> Result<Value, StorageError>;

    /// Enumerate uploaded targets, optionally filtered by owner.
    async fn list_targets(
        &self,
        owner: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TargetSummary>, StorageError>;

    /// Evict least-recently-used cache entries until under the size cap.
    /// Returns the number of files removed.
    async fn cleanup_cache(&self) -> Result<usize, StorageError>;

    /// Current size/usage of the local cache.
    async fn cache_stats(&self) -> Result<CacheStats, StorageError>;
}
