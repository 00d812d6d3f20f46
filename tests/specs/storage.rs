// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Storage specs: the upload/download round trip and LRU eviction.

use std::fs::FileTimes;
use std::time::{Duration, SystemTime};

use cw_core::TargetId;
use cw_storage::{DownloadCache, MemoryStore, ObjectStore};
use tempfile::TempDir;

#[tokio::test]
async fn upload_then_download_preserves_bytes() {
    let store = MemoryStore::new();
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("target.tar.gz");
    let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    tokio::fs::write(&src, &payload).await.unwrap();

    let id = store
        .upload_target(&src, "api-user", Default::default())
        .await
        .unwrap();
    let local = store.get_target(&id).await.unwrap();
    assert_eq!(tokio::fs::read(local).await.unwrap(), payload);
}

fn put_backdated(cache: &DownloadCache, id: &str, bytes: &[u8], age: Duration) {
    let target = TargetId::new(id);
    std::fs::create_dir_all(cache.target_dir(&target)).unwrap();
    let path = cache.target_path(&target);
    std::fs::write(&path, bytes).unwrap();
    let when = SystemTime::now() - age;
    let times = FileTimes::new().set_accessed(when).set_modified(when);
    std::fs::File::options()
        .append(true)
        .open(&path)
        .unwrap()
        .set_times(times)
        .unwrap();
}

#[test]
fn cleanup_evicts_the_coldest_entry_only() {
    // Cap 10 bytes; A, B, C of 4 bytes each, accessed in that order.
    let dir = TempDir::new().unwrap();
    let cache = DownloadCache::new(dir.path().join("cache"), 10).unwrap();
    put_backdated(&cache, "a", &[0u8; 4], Duration::from_secs(300));
    put_backdated(&cache, "b", &[0u8; 4], Duration::from_secs(200));
    put_backdated(&cache, "c", &[0u8; 4], Duration::from_secs(100));

    // One removal brings 12 bytes under the 10-byte cap
    assert_eq!(cache.cleanup().unwrap(), 1);
    assert!(!cache.target_path(&TargetId::new("a")).exists());
    assert!(cache.target_path(&TargetId::new("b")).exists());
    assert!(cache.target_path(&TargetId::new("c")).exists());

    let stats = cache.stats().unwrap();
    assert_eq!(stats.bytes, 8);
    assert_eq!(stats.file_count, 2);
}
