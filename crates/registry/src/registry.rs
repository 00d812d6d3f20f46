// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Shared registry handle with atomic whole-snapshot publication.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::definition::WorkflowDefinition;

/// Immutable result of one discovery sweep.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    workflows: HashMap<String, Arc<WorkflowDefinition>>,
}

impl RegistrySnapshot {
    pub fn new(workflows: HashMap<String, Arc<WorkflowDefinition>>) -> Self {
        Self { workflows }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<WorkflowDefinition>> {
        self.workflows.get(name)
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    /// Registered names, sorted for stable listings and error hints.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.workflows.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<WorkflowDefinition>)> {
        self.workflows.iter()
    }
}

/// Read-mostly registry. Publishing replaces the whole snapshot, so readers
/// observe either the previous sweep or the next one, never a partial map.
#[derive(Debug, Default)]
pub struct Registry {
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. Cheap; callers hold the `Arc`, not the lock.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Atomically replace the snapshot with the result of a sweep.
    pub fn publish(&self, workflows: HashMap<String, Arc<WorkflowDefinition>>) {
        *self.current.write() = Arc::new(RegistrySnapshot::new(workflows));
    }

    /// Drop everything. Called at the start of every bootstrap retry so a
    /// stale partial sweep cannot be observed.
    pub fn clear(&self) {
        *self.current.write() = Arc::new(RegistrySnapshot::default());
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
