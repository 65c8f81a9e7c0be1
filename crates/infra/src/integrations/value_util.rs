//! Small helpers for reading loosely-typed envelope fields
//!
//! Envelope fields arrive as JSON numbers or as XML-derived strings
//! depending on which decode path produced them; these helpers absorb that
//! difference.

use serde_json::Value;

/// Render a field as text: strings pass through, numbers are formatted,
/// absent/null become the empty string.
pub(crate) fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Read a count field that may be a JSON number or a numeric string.
pub(crate) fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalize an item container into a list: arrays pass through, a single
/// object (the XML single-child case) wraps into a one-element list,
/// null/absent become empty.
pub(crate) fn normalize_items(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single.clone()],
    }
}
