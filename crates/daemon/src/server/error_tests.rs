// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

use super::*;
use cw_core::RunId;

#[test]
fn workflow_not_found_lists_available_names() {
    let err = ApiError::workflow_not_found(
        "nope",
        &["gitleaks_detection".to_string(), "python_sast".to_string()],
    );
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.envelope.error.kind, ErrorKind::WorkflowNotFound);
    let first = &err.envelope.error.suggestions[0];
    assert!(first.contains("Available"));
    assert!(first.contains("gitleaks_detection"));
}

#[test]
fn storage_errors_map_by_kind() {
    let not_found: ApiError = StorageError::NotFound("t".to_string()).into();
    assert_eq!(not_found.status, StatusCode::NOT_FOUND);
    assert_eq!(not_found.envelope.error.kind, ErrorKind::NotFound);

    let transport: ApiError = StorageError::Transport("boom".to_string()).into();
    assert_eq!(transport.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(transport.envelope.error.kind, ErrorKind::StorageError);
}

#[test]
fn engine_unavailable_maps_to_its_own_kind() {
    let err: ApiError = EngineError::Unavailable("down".to_string()).into();
    assert_eq!(err.envelope.error.kind, ErrorKind::EngineUnavailable);
}

#[test]
fn progress_errors_map_to_404_and_400() {
    let unknown: ApiError = ProgressError::UnknownRun(RunId::new("x-1")).into();
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let regression: ApiError = ProgressError::Regression { field: "executions" }.into();
    assert_eq!(regression.status, StatusCode::BAD_REQUEST);
    assert_eq!(regression.envelope.error.kind, ErrorKind::ValidationError);
}

#[test]
fn file_too_large_is_413_with_cap_in_message() {
    let err = ApiError::file_too_large(10 * 1024 * 1024 * 1024);
    assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(err.envelope.error.message.contains("10.0 GB"));
}
