// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

use super::*;
use yare::parameterized;

#[parameterized(
    secrets = { "secrets", "secrets-queue", "worker-secrets" },
    android = { "android", "android-queue", "worker-android" },
    ossfuzz = { "ossfuzz", "ossfuzz-queue", "worker-ossfuzz" },
)]
fn derived_names(vertical: &str, queue: &str, service: &str) {
    let v = Vertical::new(vertical);
    assert_eq!(v.task_queue(), queue);
    assert_eq!(v.worker_service(), service);
}

#[test]
fn serde_is_transparent() {
    let v = Vertical::new("python");
    assert_eq!(serde_json::to_string(&v).unwrap(), "\"python\"");
}
