// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! In-memory `ObjectStore` for tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use cw_core::{RunId, TargetId};

use crate::cache::CacheStats;
use crate::error::StorageError;
use crate::store::{ObjectStore, ResultsFormat, TargetSummary};

#[derive(Default)]
struct Inner {
    targets: HashMap<TargetId, (Vec<u8>, HashMap<String, String>)>,
    results: HashMap<RunId, Value>,
}

/// Test double holding blobs in memory. `get_target` materializes the blob
/// into a scratch directory so path-based callers work unchanged.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    scratch: tempfile::TempDir,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            scratch: tempfile::TempDir::new().unwrap_or_else(|e| {
                // Test-support only: nothing sensible to do without a tmpdir
                unreachable!("failed to create scratch dir: {e}")
            }),
        }
    }

    /// Raw bytes of an uploaded target, for assertions.
    pub fn target_bytes(&self, target_id: &TargetId) -> Option<Vec<u8>> {
        self.inner.lock().targets.get(target_id).map(|(bytes, _)| bytes.clone())
    }

    /// Metadata recorded at upload, for assertions.
    pub fn target_metadata(&self, target_id: &TargetId) -> Option<HashMap<String, String>> {
        self.inner.lock().targets.get(target_id).map(|(_, meta)| meta.clone())
    }

    /// Number of uploaded targets.
    pub fn target_count(&self) -> usize {
        self.inner.lock().targets.len()
    }

    /// Seed a results blob, as a completed worker would have.
    pub fn put_results(&self, run_id: RunId, results: Value) {
        self.inner.lock().results.insert(run_id, results);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload_target(
        &self,
        local_path: &Path,
        owner: &str,
        metadata: HashMap<String, String>,
    ) -> Result<TargetId, StorageError> {
        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|_| StorageError::MissingLocal(local_path.to_path_buf()))?;

        let target_id = TargetId::generate();
        let mut meta = HashMap::new();
        meta.insert("owner".to_string(), owner.to_string());
        meta.insert("size".to_string(), bytes.len().to_string());
        meta.extend(metadata);

        self.inner.lock().targets.insert(target_id.clone(), (bytes, meta));
        Ok(target_id)
    }

    async fn get_target(&self, target_id: &TargetId) -> Result<PathBuf, StorageError> {
        let bytes = self
            .target_bytes(target_id)
            .ok_or_else(|| StorageError::NotFound(target_id.to_string()))?;

        let dir = self.scratch.path().join(target_id.as_str());
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join("target");
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    async fn delete_target(&self, target_id: &TargetId) -> Result<(), StorageError> {
        self.inner.lock().targets.remove(target_id);
        Ok(())
    }

    async fn upload_results(
        &self,
        run_id: &RunId,
        results: &Value,
        format: ResultsFormat,
    ) -> Result<String, StorageError> {
        self.inner.lock().results.insert(run_id.clone(), results.clone());
        Ok(format!("memory://results/{}/results.{}", run_id, format.extension()))
    }

    async fn get_results(&self, run_id: &RunId) -> Result<Value, StorageError> {
        self.inner
            .lock()
            .results
            .get(run_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("results for {}", run_id)))
    }

    async fn list_targets(
        &self,
        owner: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TargetSummary>, StorageError> {
        let inner = self.inner.lock();
        let mut out = Vec::new();
        for (id, (bytes, meta)) in &inner.targets {
            if let Some(owner) = owner {
                if meta.get("owner").map(String::as_str) != Some(owner) {
                    continue;
                }
            }
            out.push(TargetSummary {
                target_id: id.clone(),
                key: format!("{}/target", id),
                size_bytes: bytes.len() as u64,
                last_modified: None,
                metadata: meta.clone(),
            });
            if out.len() >= limit {
                break;
            }
        }
        Ok(out)
    }

    async fn cleanup_cache(&self) -> Result<usize, StorageError> {
        Ok(0)
    }

    async fn cache_stats(&self) -> Result<CacheStats, StorageError> {
        Ok(CacheStats { bytes: 0, file_count: 0, cap_bytes: 0, usage_fraction: 0.0 })
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
