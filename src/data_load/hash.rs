//! Content hashing for cache keys.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::jaql::JaqlQuery;

/// SHA-256 of the query JSON with `queryGuid` removed.
///
/// Two requests for the same data differ only in their guid, so the guid
/// must not take part in the key. Returns a 64-character lowercase hex
/// string.
pub fn query_key(query: &JaqlQuery) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(query)?;
    if let Value::Object(map) = &mut value {
        map.remove("queryGuid");
    }
    compute_hash(&value)
}

fn compute_hash(value: &Value) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
