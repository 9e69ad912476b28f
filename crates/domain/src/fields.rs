//! Lenient readers over raw JSON objects
//!
//! Geocoding payloads are inconsistent about types: ids and coordinates may
//! arrive as numbers or as numeric strings, admin levels as either, and the
//! same concept is published under several keys depending on the response
//! format. Every reader here takes a list of candidate keys and returns the
//! first one that is present, non-null and convertible. None of them fail.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Raw JSON object as decoded from a response
pub type RawMap = Map<String, Value>;

/// First candidate key holding a non-null value
pub fn first_value<'a>(map: &'a RawMap, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

/// First candidate key holding a string (numbers and booleans are stringified)
pub fn first_str(map: &RawMap, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(scalar_to_string)
}

/// First candidate key holding a non-negative integer
pub fn first_u64(map: &RawMap, keys: &[&str]) -> Option<u64> {
    keys.iter().filter_map(|key| map.get(*key)).find_map(to_u64)
}

/// First candidate key holding a signed integer
pub fn first_i64(map: &RawMap, keys: &[&str]) -> Option<i64> {
    keys.iter().filter_map(|key| map.get(*key)).find_map(to_i64)
}

/// First candidate key holding a finite float
pub fn first_f64(map: &RawMap, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|key| map.get(*key)).find_map(to_f64)
}

/// First candidate key holding something boolean-like
pub fn first_bool(map: &RawMap, keys: &[&str]) -> Option<bool> {
    keys.iter().filter_map(|key| map.get(*key)).find_map(to_bool)
}

/// First candidate key holding an object
pub fn first_object<'a>(map: &'a RawMap, keys: &[&str]) -> Option<&'a RawMap> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(Value::as_object)
}

/// First candidate key holding an object, flattened to string values
///
/// Nested arrays/objects and nulls inside the object are dropped.
pub fn first_string_map(map: &RawMap, keys: &[&str]) -> BTreeMap<String, String> {
    first_object(map, keys)
        .map(|object| {
            object
                .iter()
                .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
                .collect()
        })
        .unwrap_or_default()
}

/// Convert a scalar JSON value to its string form
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Convert a number or numeric string to `u64`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Convert a number or numeric string to `i64`
#[allow(clippy::cast_possible_truncation)]
pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Convert a number or numeric string to a finite `f64`
pub fn to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Convert a boolean, `0`/`1` number or `"true"`/`"false"` string
pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
