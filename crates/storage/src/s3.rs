// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! S3-compatible object store with the local download cache in front.
//!
//! Works against MinIO in development and AWS S3 in the cloud. Targets live
//! in the configured bucket under `<target_id>/target`; results in the
//! `results` bucket under `<run_id>/results.<ext>`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use cw_core::{RunId, TargetId};

use crate::cache::{touch, CacheStats, DownloadCache};
use crate::error::StorageError;
use crate::store::{ObjectStore, ResultsFormat, TargetSummary};

/// Bucket holding result blobs; the targets bucket is configurable.
const RESULTS_BUCKET: &str = "results";

const GIB: u64 = 1024 * 1024 * 1024;

/// Connection and cache configuration, environment-driven by default.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub use_ssl: bool,
    pub cache_dir: PathBuf,
    pub cache_max_bytes: u64,
}

impl S3Config {
    /// Read `S3_*` / `CACHE_*` variables, falling back to the development
    /// defaults used by the compose stack.
    pub fn from_env() -> Self {
        let cache_gib = std::env::var("CACHE_MAX_SIZE")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);
        Self {
            endpoint: env_or("S3_ENDPOINT", "http://minio:9000"),
            access_key: env_or("S3_ACCESS_KEY", "crashwise"),
            secret_key: env_or("S3_SECRET_KEY", "crashwise123"),
            bucket: env_or("S3_BUCKET", "targets"),
            region: env_or("S3_REGION", "us-east-1"),
            use_ssl: std::env::var("S3_USE_SSL")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cache_dir: PathBuf::from(env_or("CACHE_DIR", "/tmp/crashwise-cache")),
            cache_max_bytes: cache_gib * GIB,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Production `ObjectStore`: S3 transport plus the LRU cache.
pub struct S3CachedStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
    cache: DownloadCache,
}

impl S3CachedStore {
    pub async fn connect(config: S3Config) -> Result<Self, StorageError> {
        let cache = DownloadCache::new(&config.cache_dir, config.cache_max_bytes)?;

        let base = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let creds = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "crashwise",
        );
        let s3_config = aws_sdk_s3::config::Builder::from(&base)
            .endpoint_url(config.endpoint.clone())
            .credentials_provider(creds)
            .force_path_style(true)
            .build();
        let client = aws_sdk_s3::Client::from_conf(s3_config);

        info!(endpoint = %config.endpoint, bucket = %config.bucket, "initialized S3 storage");
        Ok(Self { client, bucket: config.bucket, endpoint: config.endpoint, cache })
    }

    fn target_key(target_id: &TargetId) -> String {
        format!("{}/target", target_id)
    }

    fn results_key(run_id: &RunId, format: ResultsFormat) -> String {
        format!("{}/results.{}", run_id, format.extension())
    }

    async fn download_to(&self, key: &str, dest: &Path) -> Result<(), StorageError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service = e.into_service_error();
                if service.is_no_such_key() {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Transport(service.to_string())
                }
            })?;

        let mut reader = resp.body.into_async_read();
        let mut file = tokio::fs::File::create(dest).await?;
        tokio::io::copy(&mut reader, &mut file).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3CachedStore {
    async fn upload_target(
        &self,
        local_path: &Path,
        owner: &str,
        metadata: HashMap<String, String>,
    ) -> Result<TargetId, StorageError> {
        let file_meta = tokio::fs::metadata(local_path)
            .await
            .map_err(|_| StorageError::MissingLocal(local_path.to_path_buf()))?;

        let target_id = TargetId::generate();
        let key = Self::target_key(&target_id);

        let mut upload_meta = HashMap::new();
        upload_meta.insert("owner".to_string(), owner.to_string());
        upload_meta.insert("uploaded_at".to_string(), Utc::now().to_rfc3339());
        upload_meta.insert(
            "filename".to_string(),
            local_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        upload_meta.insert("size".to_string(), file_meta.len().to_string());
        upload_meta.extend(metadata);

        debug!(bucket = %self.bucket, key = %key, "uploading target");

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .set_metadata(Some(upload_meta))
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        info!(target_id = %target_id, size = file_meta.len(), "uploaded target");
        Ok(target_id)
    }

    async fn get_target(&self, target_id: &TargetId) -> Result<PathBuf, StorageError> {
        if let Some(path) = self.cache.hit(target_id) {
            return Ok(path);
        }

        // One download per target at a time; re-check after acquiring in case
        // a concurrent task already filled the entry.
        let lock = self.cache.lock_for(target_id);
        let _guard = lock.lock().await;
        if let Some(path) = self.cache.hit(target_id) {
            return Ok(path);
        }

        info!(target_id = %target_id, "cache miss, downloading");
        let dir = self.cache.target_dir(target_id);
        tokio::fs::create_dir_all(&dir).await?;
        let dest = self.cache.target_path(target_id);

        match self.download_to(&Self::target_key(target_id), &dest).await {
            Ok(()) => {
                touch(&dest);
                Ok(dest)
            }
            Err(e) => {
                // Leave no partial entry behind
                let _ = tokio::fs::remove_dir_all(&dir).await;
                Err(e)
            }
        }
    }

    async fn delete_target(&self, target_id: &TargetId) -> Result<(), StorageError> {
        let key = Self::target_key(target_id);
        let result = self.client.delete_object().bucket(&self.bucket).key(&key).send().await;
        if let Err(e) = result {
            // Absence is fine; anything else is a real failure
            if e.code() != Some("NoSuchKey") {
                return Err(StorageError::Transport(e.to_string()));
            }
        }
        self.cache.remove(target_id);
        info!(target_id = %target_id, "deleted target");
        Ok(())
    }

    async fn upload_results(
        &self,
        run_id: &RunId,
        results: &Value,
        format: ResultsFormat,
    ) -> Result<String, StorageError> {
        let key = Self::results_key(run_id, format);
        let content = serde_json::to_vec_pretty(results)?;

        let mut metadata = HashMap::new();
        metadata.insert("run_id".to_string(), run_id.to_string());
        metadata.insert("format".to_string(), format.as_str().to_string());
        metadata.insert("uploaded_at".to_string(), Utc::now().to_rfc3339());

        self.client
            .put_object()
            .bucket(RESULTS_BUCKET)
            .key(&key)
            .body(ByteStream::from(content))
            .content_type(format.content_type())
            .set_metadata(Some(metadata))
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let url = format!("{}/{}/{}", self.endpoint, RESULTS_BUCKET, key);
        info!(run_id = %run_id, url = %url, "uploaded results");
        Ok(url)
    }

    async fn get_results(&self, run_id: &RunId) -> Result<Value, StorageError> {
        let key = Self::results_key(run_id, ResultsFormat::Json);
        let resp = self
            .client
            .get_object()
            .bucket(RESULTS_BUCKET)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                let service = e.into_service_error();
                if service.is_no_such_key() {
                    StorageError::NotFound(format!("results for {}", run_id))
                } else {
                    StorageError::Transport(service.to_string())
                }
            })?;

        let bytes = resp
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?
            .into_bytes();
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn list_targets(
        &self,
        owner: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TargetSummary>, StorageError> {
        let mut targets = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        'pages: while let Some(page) = pages.next().await {
            let page = page.map_err(|e| StorageError::Transport(e.to_string()))?;
            for obj in page.contents() {
                let Some(key) = obj.key() else { continue };

                let metadata = match self
                    .client
                    .head_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .send()
                    .await
                {
                    Ok(head) => head.metadata().cloned().unwrap_or_default(),
                    Err(e) => {
                        warn!(key = %key, error = %e, "failed to read object metadata");
                        continue;
                    }
                };

                if let Some(owner) = owner {
                    if metadata.get("owner").map(String::as_str) != Some(owner) {
                        continue;
                    }
                }

                let target_id = key.split('/').next().unwrap_or(key);
                targets.push(TargetSummary {
                    target_id: TargetId::new(target_id),
                    key: key.to_string(),
                    size_bytes: obj.size().unwrap_or(0).max(0) as u64,
                    last_modified: obj.last_modified().map(|t| t.to_string()),
                    metadata,
                });
                if targets.len() >= limit {
                    break 'pages;
                }
            }
        }

        debug!(count = targets.len(), "listed targets");
        Ok(targets)
    }

    async fn cleanup_cache(&self) -> Result<usize, StorageError> {
        self.cache.cleanup()
    }

    async fn cache_stats(&self) -> Result<CacheStats, StorageError> {
        self.cache.stats()
    }
}

#[cfg(test)]
#[path = "s3_tests.rs"]
mod tests;
