//! Fixture registry: per-step package and unit test registrations.
//!
//! Each step name owns an ordered list of package-test predicate names and
//! an ordered list of unit fixtures (id, input, expected output). Within a
//! (step, category) pair test identifiers are unique — re-adding a
//! duplicate is a no-op. Lookups never fail: unknown steps yield an empty
//! registration.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::error::StepgateError;

/// The two test categories a step can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCategory {
    /// Predicates over the step's whole input bundle.
    Package,
    /// Fixed input/expected-output fixtures for the step itself.
    Unit,
}

impl FromStr for TestCategory {
    type Err = StepgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "package" => Ok(TestCategory::Package),
            "unit" => Ok(TestCategory::Unit),
            other => Err(StepgateError::UnknownCategory {
                name: other.to_string(),
            }),
        }
    }
}

/// A unit-test fixture: a fixed input and the output the step must produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFixture {
    /// Test identifier, unique within the step's unit list.
    pub id: String,
    /// Input bundle fed to the step.
    pub input: Bundle,
    /// Expected output bundle, compared element-wise.
    pub expected: Bundle,
}

impl UnitFixture {
    /// Create a fixture.
    pub fn new(id: &str, input: Bundle, expected: Bundle) -> Self {
        Self {
            id: id.to_string(),
            input,
            expected,
        }
    }
}

/// Registered tests for a single step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRegistration {
    /// Package-test predicate names, in registration order.
    pub package: Vec<String>,
    /// Unit fixtures, in registration order.
    pub unit: Vec<UnitFixture>,
}

impl StepRegistration {
    /// Total number of registered tests across both categories.
    pub fn total(&self) -> usize {
        self.package.len() + self.unit.len()
    }
}

/// Registry of per-step test registrations.
#[derive(Debug, Clone, Default)]
pub struct TestRegistry {
    entries: HashMap<String, StepRegistration>,
}

impl TestRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package test for `step`.
    ///
    /// Returns false (no-op) if a package test with this predicate name is
    /// already registered for the step.
    pub fn register_package(&mut self, step: &str, predicate: &str) -> bool {
        let entry = self.entries.entry(step.to_string()).or_default();
        if entry.package.iter().any(|p| p == predicate) {
            return false;
        }
        entry.package.push(predicate.to_string());
        true
    }

    /// Register a unit fixture for `step`.
    ///
    /// Returns false (no-op) if a fixture with the same id is already
    /// registered for the step.
    pub fn register_unit(&mut self, step: &str, fixture: UnitFixture) -> bool {
        let entry = self.entries.entry(step.to_string()).or_default();
        if entry.unit.iter().any(|f| f.id == fixture.id) {
            return false;
        }
        entry.unit.push(fixture);
        true
    }

    /// Remove the first test matching `id` in the given category.
    ///
    /// Returns false (no-op) if the step or the id is absent.
    pub fn deregister(&mut self, category: TestCategory, step: &str, id: &str) -> bool {
        let Some(entry) = self.entries.get_mut(step) else {
            return false;
        };
        match category {
            TestCategory::Package => {
                if let Some(pos) = entry.package.iter().position(|p| p == id) {
                    entry.package.remove(pos);
                    return true;
                }
            }
            TestCategory::Unit => {
                if let Some(pos) = entry.unit.iter().position(|f| f.id == id) {
                    entry.unit.remove(pos);
                    return true;
                }
            }
        }
        false
    }

    /// Look up the registrations for a step.
    ///
    /// Unknown steps yield an empty registration — lookups never fail.
    pub fn lookup(&self, step: &str) -> StepRegistration {
        self.entries.get(step).cloned().unwrap_or_default()
    }

    /// Number of steps with at least one registration.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no step has any registration.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_parses_known_names() {
        assert_eq!("package".parse::<TestCategory>().unwrap(), TestCategory::Package);
        assert_eq!("unit".parse::<TestCategory>().unwrap(), TestCategory::Unit);
    }

    #[test]
    fn category_rejects_unknown_names() {
        let err = "integration".parse::<TestCategory>().unwrap_err();
        assert!(matches!(err, StepgateError::UnknownCategory { .. }));
    }

    #[test]
    fn register_package_appends_in_order() {
        let mut registry = TestRegistry::new();
        assert!(registry.register_package("sum", "number_only"));
        assert!(registry.register_package("sum", "string_only"));

        let entry = registry.lookup("sum");
        assert_eq!(entry.package, vec!["number_only", "string_only"]);
    }

    #[test]
    fn duplicate_package_registration_is_noop() {
        let mut registry = TestRegistry::new();
        assert!(registry.register_package("sum", "number_only"));
        assert!(!registry.register_package("sum", "number_only"));
        assert_eq!(registry.lookup("sum").package.len(), 1);
    }

    #[test]
    fn duplicate_unit_registration_is_noop() {
        let mut registry = TestRegistry::new();
        let fixture = UnitFixture::new("t1", vec![json!(1)], vec![json!(1)]);
        assert!(registry.register_unit("sum", fixture.clone()));
        assert!(!registry.register_unit("sum", fixture));
        assert_eq!(registry.lookup("sum").unit.len(), 1);
    }

    #[test]
    fn same_id_allowed_across_categories() {
        let mut registry = TestRegistry::new();
        assert!(registry.register_package("sum", "t1"));
        assert!(registry.register_unit("sum", UnitFixture::new("t1", vec![], vec![])));
        assert_eq!(registry.lookup("sum").total(), 2);
    }

    #[test]
    fn deregister_removes_first_match() {
        let mut registry = TestRegistry::new();
        registry.register_package("sum", "number_only");
        registry.register_package("sum", "string_only");

        assert!(registry.deregister(TestCategory::Package, "sum", "number_only"));
        assert_eq!(registry.lookup("sum").package, vec!["string_only"]);
    }

    #[test]
    fn deregister_absent_is_noop() {
        let mut registry = TestRegistry::new();
        assert!(!registry.deregister(TestCategory::Unit, "sum", "t1"));

        registry.register_unit("sum", UnitFixture::new("t1", vec![], vec![]));
        assert!(!registry.deregister(TestCategory::Unit, "sum", "t2"));
        assert_eq!(registry.lookup("sum").unit.len(), 1);
    }

    #[test]
    fn lookup_unknown_step_is_empty() {
        let registry = TestRegistry::new();
        let entry = registry.lookup("nope");
        assert!(entry.package.is_empty());
        assert!(entry.unit.is_empty());
        assert_eq!(entry.total(), 0);
    }

    #[test]
    fn fixture_round_trips_through_serde() {
        let fixture = UnitFixture::new("t1", vec![json!(1), json!(2)], vec![json!(3)]);
        let yaml = serde_yaml::to_string(&fixture).unwrap();
        let back: UnitFixture = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, fixture);
    }
}
