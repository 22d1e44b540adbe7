//! Bundles: the unit of data flow between steps.
//!
//! Every step takes a bundle and returns either a bundle or the failure
//! sentinel (`None`). A bundle is an ordered array of structured values;
//! fixture comparison is ordered and element-wise.

use serde_json::Value;

/// Ordered collection of structured values flowing between steps.
pub type Bundle = Vec<Value>;

/// Compare two bundles element-wise.
///
/// Lengths must match and every element must be strictly equal at the same
/// index. Strict means JSON-value equality: `1` (integer) and `1.0` (float)
/// are different values.
pub fn bundle_eq(a: &Bundle, b: &Bundle) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// JSON truthiness, used for flag-driven routing.
///
/// `null`, `false`, `0`, and the empty string are falsy; arrays and objects
/// are always truthy, even when empty.
pub fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
