//! Identity policy for schema-less records.
//!
//! Every stored record carries a system-owned `__backendId`. The user-facing
//! `id` key mirrors it when the client did not supply one.

use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use super::Record;

pub const BACKEND_ID_KEY: &str = "__backendId";
pub const ID_KEY: &str = "id";
pub const GENERATED_ID_PREFIX: &str = "rec_";

/// Fresh `rec_<32 hex>` identifier from a random v4 UUID.
pub fn generate_backend_id() -> String {
    format!("{GENERATED_ID_PREFIX}{}", Uuid::new_v4().simple())
}

/// Usable identity held under `key`: a non-empty string, or a number in its JSON form.
fn identity_value(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// String form of the record's `__backendId`, if it has a usable one.
pub fn backend_id(record: &Record) -> Option<String> {
    identity_value(record, BACKEND_ID_KEY)
}

/// Make sure `record` has a `__backendId`, preferring the existing one, then `id`,
/// then a generated value. `id` is filled in only when the key is missing.
/// Returns the backend id.
pub fn assign_identity(record: &mut Record) -> String {
    let backend_id = identity_value(record, BACKEND_ID_KEY)
        .or_else(|| identity_value(record, ID_KEY))
        .unwrap_or_else(generate_backend_id);
    force_identity(record, &backend_id);
    backend_id
}

/// Set `__backendId` to `backend_id` regardless of what the record holds.
pub fn force_identity(record: &mut Record, backend_id: &str) {
    record.insert(BACKEND_ID_KEY.to_string(), Value::String(backend_id.to_string()));
    if !record.contains_key(ID_KEY) {
        record.insert(ID_KEY.to_string(), Value::String(backend_id.to_string()));
    }
}

/// Turn a request body into a record. Anything that is not a JSON object,
/// including an empty or malformed body, becomes an empty record.
pub fn record_from_body(body: &[u8]) -> Record {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Record::new();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(kind = json_kind(&other), "request body is not a JSON object; using empty record");
            Record::new()
        }
        Err(e) => {
            warn!(error = %e, "malformed request body; using empty record");
            Record::new()
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
