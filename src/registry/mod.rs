//! Step and predicate registry.
//!
//! The registry is the resolver for step identifiers: an explicit map from
//! name to callable, injected into the executors. Steps are the units of
//! work; predicates are the package tests run over whole bundles.
//!
//! Resolution failure is never fatal at this layer — `resolve_step` and
//! `resolve_predicate` return `None` and callers map that to a `not_found`
//! outcome per their own contracts.
//!
//! # Example
//!
//! ```
//! use stepgate::registry::StepRegistry;
//! use serde_json::json;
//!
//! let mut steps = StepRegistry::with_builtins();
//! steps.register_step("double", |bundle| {
//!     Some(bundle.iter().filter_map(|v| v.as_i64()).map(|n| json!(n * 2)).collect())
//! });
//!
//! let double = steps.resolve_step("double").unwrap();
//! assert_eq!(double(&vec![json!(2)]), Some(vec![json!(4)]));
//! assert!(steps.resolve_step("missing").is_none());
//! ```

pub mod builtin;

use std::collections::HashMap;

use crate::bundle::Bundle;

/// A step: takes a bundle, returns a bundle or the failure sentinel.
pub type StepFn = Box<dyn Fn(&Bundle) -> Option<Bundle>>;

/// A package-test predicate over a whole bundle.
pub type PredicateFn = Box<dyn Fn(&Bundle) -> bool>;

/// Name → callable registry for steps and predicates.
#[derive(Default)]
pub struct StepRegistry {
    steps: HashMap<String, StepFn>,
    predicates: HashMap<String, PredicateFn>,
}

impl StepRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-loaded with the builtin bundle predicates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_builtin_predicates(&mut registry);
        registry
    }

    /// Register a step under `name`. A later registration replaces an
    /// earlier one with the same name.
    pub fn register_step<F>(&mut self, name: &str, step: F)
    where
        F: Fn(&Bundle) -> Option<Bundle> + 'static,
    {
        self.steps.insert(name.to_string(), Box::new(step));
    }

    /// Register a package-test predicate under `name`.
    pub fn register_predicate<F>(&mut self, name: &str, predicate: F)
    where
        F: Fn(&Bundle) -> bool + 'static,
    {
        self.predicates.insert(name.to_string(), Box::new(predicate));
    }

    /// Resolve a step by name.
    pub fn resolve_step(&self, name: &str) -> Option<&StepFn> {
        self.steps.get(name)
    }

    /// Resolve a predicate by name.
    pub fn resolve_predicate(&self, name: &str) -> Option<&PredicateFn> {
        self.predicates.get(name)
    }

    /// Whether a step with this name is registered.
    pub fn contains_step(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Names of all registered steps (unordered).
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .field("predicates", &self.predicates.keys().collect::<Vec<_>>())
            .finish()
    }
}
