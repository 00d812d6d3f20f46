// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cw-registry: workflow discovery and the indexed definition registry.
//!
//! A workflow is a directory carrying a `metadata.yaml` manifest. Discovery
//! sweeps a toolbox root, validates each manifest, and publishes an
//! immutable snapshot; the whole snapshot is swapped atomically so readers
//! never observe a partial sweep.

pub mod definition;
pub mod discover;
pub mod error;
pub mod schema;

mod registry;

pub use definition::{ParamSpec, ParameterSchema, WorkflowDefinition};
pub use discover::discover;
pub use error::MetadataError;
pub use registry::{Registry, RegistrySnapshot};
pub use schema::metadata_schema;
