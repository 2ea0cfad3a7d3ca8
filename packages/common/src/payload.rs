//! Helpers for the open-ended JSON documents produced by the analysis worker.

use serde_json::{Map, Value};

use crate::storage::ContentHash;

/// Read a numeric field at a nested object path.
///
/// Returns `None` if any segment is missing, the leaf is not a number, or the
/// number is not finite.
pub fn number_at(value: &Value, path: &[&str]) -> Option<f64> {
    path.iter()
        .try_fold(value, |node, key| node.get(*key))
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

/// Rebuild a document with every object's keys in ascending order.
///
/// serde_json's default map is already sorted. This keeps fingerprints stable
/// if the `preserve_order` feature gets enabled anywhere in the dependency
/// graph, which switches the map to insertion order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// SHA-256 of the compact canonical JSON encoding of `items` taken as one
/// array.
pub fn fingerprint_list(items: &[Value]) -> ContentHash {
    let canonical = Value::Array(items.iter().map(canonicalize).collect());
    ContentHash::compute(canonical.to_string().as_bytes())
}
