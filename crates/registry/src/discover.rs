// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Directory sweep producing an indexed workflow map.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::definition::WorkflowDefinition;
use crate::error::MetadataError;

const MANIFEST: &str = "metadata.yaml";

/// Sweep `root` for workflow directories.
///
/// Each immediate subdirectory carrying a `metadata.yaml` contributes one
/// definition. A malformed workflow never aborts the sweep: it is logged and
/// excluded. Name collisions keep the first accepted entry. An empty or
/// missing root yields an empty map.
pub fn discover(root: &Path) -> HashMap<String, Arc<WorkflowDefinition>> {
    let mut found: HashMap<String, Arc<WorkflowDefinition>> = HashMap::new();

    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "workflow root not readable");
            return found;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let dir_name = entry.file_name().to_string_lossy().to_string();
        if dir_name.starts_with('.') {
            continue;
        }

        let manifest = path.join(MANIFEST);
        if !manifest.exists() {
            debug!(dir = %dir_name, "no metadata.yaml, skipping");
            continue;
        }

        match load_definition(&manifest) {
            Ok(def) => {
                if found.contains_key(&def.name) {
                    warn!(
                        dir = %dir_name,
                        name = %def.name,
                        "duplicate workflow name, keeping first"
                    );
                    continue;
                }
                info!(name = %def.name, vertical = %def.vertical, "discovered workflow");
                found.insert(def.name.clone(), Arc::new(def));
            }
            Err(e) => {
                warn!(dir = %dir_name, error = %e, "invalid workflow metadata, excluding");
            }
        }
    }

    found
}

fn load_definition(manifest: &Path) -> Result<WorkflowDefinition, MetadataError> {
    let yaml = std::fs::read_to_string(manifest)?;
    let def = WorkflowDefinition::from_yaml(&yaml)?;
    def.validate()?;
    Ok(def)
}

#[cfg(test)]
#[path = "discover_tests.rs"]
mod tests;
