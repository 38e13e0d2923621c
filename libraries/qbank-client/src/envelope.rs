//! Normalization of response envelopes.
//!
//! Depending on the endpoint the API returns a bare object, `{"data": ..}`, or something nested
//! further. These helpers dig out the parts we need so nothing past the client has to care.

use exam_model::SessionId;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Paths probed, in order, for the identifier of a newly created session.
const SESSION_ID_PATHS: &[&[&str]] = &[
    &["id"],
    &["sessionId"],
    &["data", "id"],
    &["data", "sessionId"],
    &["data", "session", "id"],
    &["session", "id"],
];

/// List fields probed when a list endpoint does not return a bare array.
const LIST_FIELDS: &[&str] = &["data", "questions", "items"];

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |value, key| value.get(key))
}

fn as_session_id(value: &Value) -> Option<SessionId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(SessionId(s.clone())),
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(SessionId(n.to_string())),
        _ => None,
    }
}

pub fn extract_session_id(response: &Value) -> Option<SessionId> {
    SESSION_ID_PATHS
        .iter()
        .find_map(|path| lookup(response, path).and_then(as_session_id))
}

/// Returns the array a list endpoint answered with, wherever it was put.
pub fn extract_list(response: Value) -> Option<Vec<Value>> {
    match response {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => LIST_FIELDS.iter().find_map(|field| match map.remove(*field) {
            Some(Value::Array(items)) => Some(items),
            Some(nested @ Value::Object(_)) => extract_list(nested),
            _ => None,
        }),
        _ => None,
    }
}

/// Decodes each list item on its own. Items that don't fit `T` are logged and skipped.
pub fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value(item)
                .inspect_err(|e| log::warn!("skipping malformed list item: {e}"))
                .ok()
        })
        .collect();
    if decoded.len() < total {
        log::warn!("{} of {total} list items could not be decoded", total - decoded.len());
    }
    decoded
}
