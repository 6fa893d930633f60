//! Canonical JSON serialization.
//!
//! Cache keys and history change detection both need "same data, same
//! string". Values are routed through `serde_json::Value` and object keys are
//! re-inserted in sorted order, so struct field order, map insertion order and
//! serde_json's `preserve_order` feature do not leak into the result.

use serde::Serialize;
use serde_json::Value;

use crate::errors::CalcResult;

/// Serialize `value` to compact JSON with object keys sorted at every level.
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T) -> CalcResult<String> {
    let value = sort_keys(serde_json::to_value(value)?);
    Ok(serde_json::to_string(&value)?)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
