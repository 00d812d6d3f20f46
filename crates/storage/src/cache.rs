// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Bounded local download cache with access-time LRU eviction.
//!
//! Recency is the file's atime (mtime where atime is unavailable); a cache
//! hit touches the file to keep it alive. Eviction snapshots the clock
//! before sorting so an entry touched mid-eviction is never removed.

use std::collections::HashMap;
use std::fs::FileTimes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use cw_core::TargetId;

use crate::error::StorageError;

/// Filename of the single opaque blob inside a target's cache directory.
const TARGET_FILE: &str = "target";

/// Size/usage snapshot served by `cache_stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub bytes: u64,
    pub file_count: usize,
    pub cap_bytes: u64,
    pub usage_fraction: f64,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    size: u64,
    accessed: SystemTime,
}

/// Local cache rooted at one directory, one subdirectory per target.
#[derive(Debug)]
pub struct DownloadCache {
    root: PathBuf,
    cap_bytes: u64,
    // One async download lock per target; guards concurrent downloads of the
    // same target to the same path.
    locks: Mutex<HashMap<TargetId, Arc<tokio::sync::Mutex<()>>>>,
}

impl DownloadCache {
    pub fn new(root: impl Into<PathBuf>, cap_bytes: u64) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, cap_bytes, locks: Mutex::new(HashMap::new()) })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cap_bytes(&self) -> u64 {
        self.cap_bytes
    }

    /// Directory holding a target's cached copy.
    pub fn target_dir(&self, target_id: &TargetId) -> PathBuf {
        self.root.join(target_id.as_str())
    }

    /// Path of the cached blob itself.
    pub fn target_path(&self, target_id: &TargetId) -> PathBuf {
        self.target_dir(target_id).join(TARGET_FILE)
    }

    /// Download lock for one target. Concurrent downloads of different
    /// targets proceed independently.
    pub fn lock_for(&self, target_id: &TargetId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(target_id.clone()).or_default())
    }

    /// Cache hit: touch the entry and return its path. Miss: `None`.
    pub fn hit(&self, target_id: &TargetId) -> Option<PathBuf> {
        let path = self.target_path(target_id);
        if !path.is_file() {
            return None;
        }
        touch(&path);
        debug!(target_id = %target_id, "cache hit");
        Some(path)
    }

    /// Drop a target's cached copy, if any.
    pub fn remove(&self, target_id: &TargetId) {
        let dir = self.target_dir(target_id);
        if dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                warn!(target_id = %target_id, error = %e, "failed to remove cache entry");
            }
        }
        self.locks.lock().remove(target_id);
    }

    /// Evict by ascending access time until total size is under the cap.
    ///
    /// Entries touched after eviction started survive; individual delete
    /// failures are logged and skipped. Returns the number of files removed.
    pub fn cleanup(&self) -> Result<usize, StorageError> {
        let mut files = Vec::new();
        let mut total: u64 = 0;
        collect_files(&self.root, &mut files, &mut total);

        if total <= self.cap_bytes {
            debug!(bytes = total, cap = self.cap_bytes, "cache within budget");
            return Ok(0);
        }

        let eviction_started = SystemTime::now();
        files.sort_by_key(|f| f.accessed);

        let mut removed = 0;
        for file in &files {
            if total <= self.cap_bytes {
                break;
            }
            // Skip entries that became hot while we were evicting.
            match std::fs::metadata(&file.path) {
                Ok(meta) => {
                    if access_time(&meta) > eviction_started {
                        debug!(path = %file.path.display(), "touched during eviction, keeping");
                        continue;
                    }
                }
                Err(_) => continue,
            }
            match std::fs::remove_file(&file.path) {
                Ok(()) => {
                    total = total.saturating_sub(file.size);
                    removed += 1;
                    debug!(path = %file.path.display(), "evicted from cache");
                }
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "failed to evict");
                }
            }
        }

        info!(removed, bytes = total, "cache cleanup finished");
        Ok(removed)
    }

    pub fn stats(&self) -> Result<CacheStats, StorageError> {
        let mut files = Vec::new();
        let mut total: u64 = 0;
        collect_files(&self.root, &mut files, &mut total);
        let usage = if self.cap_bytes == 0 { 0.0 } else { total as f64 / self.cap_bytes as f64 };
        Ok(CacheStats {
            bytes: total,
            file_count: files.len(),
            cap_bytes: self.cap_bytes,
            usage_fraction: usage,
        })
    }
}

/// Set both timestamps to now. Downloads and hits call this, so recency is
/// reliable even on noatime mounts.
pub(crate) fn touch(path: &Path) {
    let now = SystemTime::now();
    let times = FileTimes::new().set_accessed(now).set_modified(now);
    match std::fs::File::options().append(true).open(path) {
        Ok(file) => {
            if let Err(e) = file.set_times(times) {
                debug!(path = %path.display(), error = %e, "touch failed");
            }
        }
        Err(e) => debug!(path = %path.display(), error = %e, "touch open failed"),
    }
}

fn access_time(meta: &std::fs::Metadata) -> SystemTime {
    meta.accessed()
        .or_else(|_| meta.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

fn collect_files(dir: &Path, files: &mut Vec<FileInfo>, total: &mut u64) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to list cache dir");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files, total);
            continue;
        }
        match entry.metadata() {
            Ok(meta) => {
                *total += meta.len();
                files.push(FileInfo { path, size: meta.len(), accessed: access_time(&meta) });
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to stat cache file"),
        }
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
