// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Temporal payload codec: values cross the wire as base64-wrapped
//! `json/plain` payloads.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::error::EngineError;

const JSON_PLAIN: &[u8] = b"json/plain";

/// Wrap one JSON value as a Temporal payload object.
pub fn encode(value: &Value) -> Result<Value, EngineError> {
    let data = serde_json::to_vec(value).map_err(|e| EngineError::Decode(e.to_string()))?;
    Ok(json!({
        "metadata": {"encoding": BASE64.encode(JSON_PLAIN)},
        "data": BASE64.encode(data),
    }))
}

/// Unwrap one Temporal payload object back into a JSON value.
pub fn decode(payload: &Value) -> Result<Value, EngineError> {
    let data = payload
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::Decode("payload has no data field".to_string()))?;
    let bytes = BASE64
        .decode(data)
        .map_err(|e| EngineError::Decode(format!("payload data is not base64: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| EngineError::Decode(format!("payload is not JSON: {e}")))
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
