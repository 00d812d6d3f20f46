// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

use super::*;
use proptest::prelude::*;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn cache(cap: u64) -> (TempDir, DownloadCache) {
    let dir = TempDir::new().unwrap();
    let cache = DownloadCache::new(dir.path().join("cache"), cap).unwrap();
    (dir, cache)
}

fn put(cache: &DownloadCache, id: &str, bytes: &[u8], age: Duration) {
    let target = TargetId::new(id);
    let dir = cache.target_dir(&target);
    fs::create_dir_all(&dir).unwrap();
    let path = cache.target_path(&target);
    fs::write(&path, bytes).unwrap();
    // Backdate so eviction order is deterministic
    let when = SystemTime::now() - age;
    let times = FileTimes::new().set_accessed(when).set_modified(when);
    fs::File::options().append(true).open(&path).unwrap().set_times(times).unwrap();
}

#[test]
fn hit_returns_path_and_miss_returns_none() {
    let (_dir, cache) = cache(1024);
    let id = TargetId::new("t1");
    assert!(cache.hit(&id).is_none());

    put(&cache, "t1", b"data", Duration::from_secs(60));
    let path = cache.hit(&id).unwrap();
    assert_eq!(fs::read(path).unwrap(), b"data");
}

#[test]
fn cleanup_under_cap_is_a_noop() {
    let (_dir, cache) = cache(100);
    put(&cache, "a", &[0u8; 40], Duration::from_secs(30));
    put(&cache, "b", &[0u8; 40], Duration::from_secs(20));
    assert_eq!(cache.cleanup().unwrap(), 0);
    assert!(cache.hit(&TargetId::new("a")).is_some());
}

#[test]
fn cleanup_evicts_oldest_first() {
    // Cap 10; A=4 oldest, B=4, C=4 newest. One eviction brings 12 -> 8.
    let (_dir, cache) = cache(10);
    put(&cache, "a", &[0u8; 4], Duration::from_secs(300));
    put(&cache, "b", &[0u8; 4], Duration::from_secs(200));
    put(&cache, "c", &[0u8; 4], Duration::from_secs(100));

    assert_eq!(cache.cleanup().unwrap(), 1);
    assert!(!cache.target_path(&TargetId::new("a")).exists());
    assert!(cache.target_path(&TargetId::new("b")).exists());
    assert!(cache.target_path(&TargetId::new("c")).exists());
}

#[test]
fn touched_entry_survives_eviction() {
    let (_dir, cache) = cache(10);
    put(&cache, "a", &[0u8; 8], Duration::from_secs(300));
    put(&cache, "b", &[0u8; 8], Duration::from_secs(100));

    // A hit refreshes "a" to now, so it sorts behind "b" and "b" is evicted
    // instead.
    let a = TargetId::new("a");
    cache.hit(&a);

    cache.cleanup().unwrap();
    assert!(cache.target_path(&a).exists());
}

#[test]
fn remove_is_tolerant_of_absence() {
    let (_dir, cache) = cache(10);
    let id = TargetId::new("ghost");
    cache.remove(&id);
    put(&cache, "ghost", b"x", Duration::from_secs(10));
    cache.remove(&id);
    assert!(!cache.target_dir(&id).exists());
}

#[test]
fn stats_reflect_contents() {
    let (_dir, cache) = cache(100);
    put(&cache, "a", &[0u8; 30], Duration::from_secs(10));
    put(&cache, "b", &[0u8; 20], Duration::from_secs(10));

    let stats = cache.stats().unwrap();
    assert_eq!(stats.bytes, 50);
    assert_eq!(stats.file_count, 2);
    assert_eq!(stats.cap_bytes, 100);
    assert!((stats.usage_fraction - 0.5).abs() < f64::EPSILON);
}

proptest! {
    // After cleanup, survivors are exactly the newest-access prefix that
    // fits under the cap (entries backdated, nothing touched concurrently).
    #[test]
    fn eviction_keeps_newest_prefix(sizes in proptest::collection::vec(1u64..20, 1..8), cap in 1u64..60) {
        let dir = TempDir::new().unwrap();
        let cache = DownloadCache::new(dir.path().join("cache"), cap).unwrap();

        // Index 0 is oldest; higher index = more recently accessed
        for (i, size) in sizes.iter().enumerate() {
            let age = Duration::from_secs(1000 - i as u64 * 10);
            put(&cache, &format!("t{i}"), &vec![0u8; *size as usize], age);
        }

        cache.cleanup().unwrap();

        // Walk from newest to oldest accumulating sizes: everything that fits
        // must still exist, everything past the budget must be gone.
        let mut budget = cap;
        for (i, size) in sizes.iter().enumerate().rev() {
            let exists = cache.target_path(&TargetId::new(format!("t{i}"))).exists();
            if *size <= budget {
                prop_assert!(exists, "entry t{} ({}B) should have survived", i, size);
                budget -= *size;
            } else {
                prop_assert!(!exists, "entry t{} ({}B) should have been evicted", i, size);
                budget = 0;
            }
        }
    }
}
