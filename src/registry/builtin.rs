//! Builtin bundle predicates.
//!
//! Stock package tests for the common bundle shapes: all-string,
//! all-number, all-integer, all-object. Registered by
//! [`StepRegistry::with_builtins`](super::StepRegistry::with_builtins).

use serde_json::Value;

use super::StepRegistry;
use crate::bundle::Bundle;

/// Every item in the bundle is a string.
pub fn string_only(bundle: &Bundle) -> bool {
    bundle.iter().all(Value::is_string)
}

/// Every item in the bundle is a number (integer or float).
pub fn number_only(bundle: &Bundle) -> bool {
    bundle.iter().all(Value::is_number)
}

/// Every item in the bundle is an integer.
pub fn integer_only(bundle: &Bundle) -> bool {
    bundle.iter().all(|v| v.is_i64() || v.is_u64())
}

/// Every item in the bundle is an object.
pub fn object_only(bundle: &Bundle) -> bool {
    bundle.iter().all(Value::is_object)
}

/// Register all builtin predicates under their canonical names.
pub fn register_builtin_predicates(registry: &mut StepRegistry) {
    registry.register_predicate("string_only", string_only);
    registry.register_predicate("number_only", number_only);
    registry.register_predicate("integer_only", integer_only);
    registry.register_predicate("object_only", object_only);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_only_accepts_all_strings() {
        assert!(string_only(&vec![json!("a"), json!("b")]));
        assert!(!string_only(&vec![json!("a"), json!(1)]));
    }

    #[test]
    fn number_only_accepts_ints_and_floats() {
        assert!(number_only(&vec![json!(1), json!(2.5)]));
        assert!(!number_only(&vec![json!(1), json!("2")]));
    }

    #[test]
    fn integer_only_rejects_floats() {
        assert!(integer_only(&vec![json!(1), json!(2)]));
        assert!(!integer_only(&vec![json!(1), json!(2.5)]));
    }

    #[test]
    fn object_only_accepts_objects() {
        assert!(object_only(&vec![json!({"a": 1})]));
        assert!(!object_only(&vec![json!([1])]));
    }

    #[test]
    fn predicates_hold_on_empty_bundles() {
        // Vacuously true, matching "all items" semantics.
        assert!(string_only(&vec![]));
        assert!(number_only(&vec![]));
    }
}
