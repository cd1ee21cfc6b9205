//! Identity hints read from a bearer token's payload.
//!
//! The payload is decoded, never verified. Whatever it claims is advisory: good enough to
//! label the current user or fill the `x-user-id` compatibility header, never an
//! authorization decision.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};

/// Claims consulted for the user id, in order of preference.
pub const USER_ID_CLAIMS: [&str; 5] = ["sub", "userId", "user_id", "id", "aud"];

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the middle segment of a three-segment token into its claims.
///
/// Returns `None` for anything that is not `header.payload.signature` with a
/// base64url-encoded JSON object in the middle.
#[must_use]
pub fn decode_claims(token: &str) -> Option<Map<String, Value>> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return None;
    };

    let bytes = URL_SAFE_LENIENT.decode(payload).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(claims) => Some(claims),
        _ => None,
    }
}

/// The user id a token claims for itself, if any.
///
/// Takes the first usable claim among [`USER_ID_CLAIMS`]. Empty strings, zero,
/// booleans and nulls are skipped. A list-valued `aud` is joined with commas.
#[must_use]
pub fn user_id_from_token(token: &str) -> Option<String> {
    let claims = decode_claims(token)?;
    let user_id = USER_ID_CLAIMS
        .iter()
        .filter_map(|key| claims.get(*key))
        .find_map(claim_as_id);

    tracing::debug!(found = user_id.is_some(), "Derived user id from token payload");
    user_id
}

fn claim_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        Value::Array(items) if !items.is_empty() => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => None,
    }
}
