//! Response envelope normalization.
//!
//! Gateway endpoints answer either with the bare payload or with an envelope
//! `{ success, data, message, error }`. Every response passes through here exactly once,
//! so nothing above the transport ever sees an envelope.

use crate::error::{GatewayError, GatewayResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

const DEFAULT_REJECTION: &str = "Request failed";

/// Unwrap a single-object response.
///
/// # Errors
///
/// Returns [`GatewayError::Rejected`] when the envelope reports `success: false`.
pub fn unwrap_value(body: Value) -> GatewayResult<Value> {
    reject_failed_envelope(&body)?;

    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            Ok(map.remove("data").unwrap_or(Value::Null))
        },
        other => Ok(other),
    }
}

/// Unwrap a list response.
///
/// Bare arrays pass through, envelopes with an array `data` are unwrapped, and any
/// other shape counts as an empty list.
///
/// # Errors
///
/// Returns [`GatewayError::Rejected`] when the envelope reports `success: false`.
pub fn unwrap_list(body: Value) -> GatewayResult<Vec<Value>> {
    reject_failed_envelope(&body)?;

    Ok(match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    })
}

/// Decode the items of an unwrapped list, skipping the ones that do not decode.
///
/// One malformed record must not hide the rest of a listing.
pub fn decode_list<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value(item)
                .map_err(|error| tracing::warn!(%error, "Skipping undecodable list item"))
                .ok()
        })
        .collect();
    if decoded.len() < total {
        tracing::warn!(skipped = total - decoded.len(), total, "Listing was partially decoded");
    }
    decoded
}

/// Best-effort message from an error body: `message`, then `error`, then empty.
#[must_use]
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(message_of)
        .unwrap_or_default()
}

fn reject_failed_envelope(body: &Value) -> GatewayResult<()> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .or_else(|| body.get("message").and_then(Value::as_str))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_REJECTION);
        return Err(GatewayError::Rejected {
            message: message.to_string(),
        });
    }
    Ok(())
}

fn message_of(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|m| !m.trim().is_empty())
        .map(str::to_string)
}
