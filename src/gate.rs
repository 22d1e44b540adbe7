//! The test gate: runs a step's registered tests and derives approval.
//!
//! Gating a step produces a fresh [`TestRunStatus`]: per category, the
//! disjoint `passed` / `failed` / `not_found` lists, the phase runtime, and
//! a single `approved` verdict computed after both categories run.
//!
//! # Approval invariant
//!
//! ```text
//! approved ⇔ unit.passed + unit.not_found + package.passed + package.not_found
//!            == registered unit tests + registered package tests
//! ```
//!
//! Equivalently: approval holds iff no test explicitly failed. A test that
//! could not be resolved or invoked counts as skipped and never blocks
//! approval; a test that ran and returned a concrete negative result always
//! does. The asymmetry is intentional behavior, not a bug.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bundle::{bundle_eq, Bundle};
use crate::fixtures::TestRegistry;
use crate::registry::StepRegistry;
use crate::report::Reporter;

/// Outcome lists and runtime for one test category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatus {
    /// Ids of tests that ran and passed.
    pub passed: Vec<String>,
    /// Ids of tests that ran and returned a concrete negative result.
    pub failed: Vec<String>,
    /// Ids of tests that could not be resolved or invoked.
    pub not_found: Vec<String>,
    /// Wall time for the whole category phase.
    pub runtime_ms: u64,
}

impl CategoryStatus {
    /// Count of outcomes that do not block approval.
    fn accepted(&self) -> usize {
        self.passed.len() + self.not_found.len()
    }
}

/// Verdict of gating one step against one input bundle.
///
/// Created fresh at gate entry, mutated only during that gate's execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestRunStatus {
    /// Package-test outcomes.
    pub package: CategoryStatus,
    /// Unit-test outcomes.
    pub unit: CategoryStatus,
    /// Whether the step's output may propagate.
    pub approved: bool,
    /// Expected output of the last passing unit fixture, if any.
    ///
    /// When gating is enabled this — not the step's live return value — is
    /// what the pipeline feeds forward during validation.
    pub last_test_output: Option<Bundle>,
}

/// Runs registered tests for a step and derives the approval verdict.
///
/// Borrows the step registry (to resolve predicates and the step itself)
/// and the fixture registry; both are injected by the caller.
pub struct TestGate<'a> {
    steps: &'a StepRegistry,
    fixtures: &'a TestRegistry,
}

impl<'a> TestGate<'a> {
    /// Create a gate over the given registries.
    pub fn new(steps: &'a StepRegistry, fixtures: &'a TestRegistry) -> Self {
        Self { steps, fixtures }
    }

    /// Gate `step` against `input`, reporting the verdict.
    ///
    /// The emitted report is advisory only and never affects control flow.
    pub fn run(&self, step: &str, input: &Bundle, reporter: &mut dyn Reporter) -> TestRunStatus {
        let registration = self.fixtures.lookup(step);
        let mut status = TestRunStatus::default();

        // Package phase: predicates over the whole input bundle.
        let started = Instant::now();
        for predicate in &registration.package {
            match self.steps.resolve_predicate(predicate) {
                Some(test) => {
                    if test(input) {
                        status.package.passed.push(predicate.clone());
                    } else {
                        status.package.failed.push(predicate.clone());
                    }
                }
                None => status.package.not_found.push(predicate.clone()),
            }
        }
        status.package.runtime_ms = started.elapsed().as_millis() as u64;

        // Unit phase: invoke the step itself on each fixture input.
        let started = Instant::now();
        for fixture in &registration.unit {
            match self.steps.resolve_step(step) {
                Some(f) => match f(&fixture.input) {
                    Some(output) => {
                        if bundle_eq(&output, &fixture.expected) {
                            status.unit.passed.push(fixture.id.clone());
                            status.last_test_output = Some(fixture.expected.clone());
                        } else {
                            status.unit.failed.push(fixture.id.clone());
                        }
                    }
                    // The step refused the fixture input; the comparison
                    // never happened, so the test is skipped, not failed.
                    None => status.unit.not_found.push(fixture.id.clone()),
                },
                None => status.unit.not_found.push(fixture.id.clone()),
            }
        }
        status.unit.runtime_ms = started.elapsed().as_millis() as u64;

        status.approved =
            status.unit.accepted() + status.package.accepted() == registration.total();

        debug!(
            step,
            approved = status.approved,
            package_passed = status.package.passed.len(),
            package_failed = status.package.failed.len(),
            unit_passed = status.unit.passed.len(),
            unit_failed = status.unit.failed.len(),
            "gate verdict"
        );

        reporter.gate_report(step, &status);
        status
    }
}
