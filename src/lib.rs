//! Stepgate - test-gated step orchestration.
//!
//! Stepgate chains small functions (steps) into pipelines and workflows,
//! and refuses to run a pipeline until every step has passed its registered
//! tests. Steps consume and produce bundles of JSON values; fixtures pair a
//! step with known input/expected-output cases, and the test gate derives a
//! single approval verdict per step.
//!
//! # Modules
//!
//! - [`bundle`] - The bundle type and its comparison/truthiness rules
//! - [`cli`] - Command-line interface and argument parsing
//! - [`error`] - Error types and result aliases
//! - [`fixtures`] - Test fixture registration and lookup
//! - [`gate`] - The test gate and its approval verdict
//! - [`pipeline`] - Pipeline data model and builder
//! - [`registry`] - Step and predicate resolution
//! - [`report`] - Run reporting (console and test recorders)
//! - [`route`] - Conditional routing and context switches
//! - [`runner`] - The execution engine
//! - [`state`] - In-memory and durable state stores
//! - [`workflow`] - Workflow data model and builder
//!
//! # Example
//!
//! ```
//! use stepgate::fixtures::{TestRegistry, UnitFixture};
//! use stepgate::pipeline::{Pipeline, PrimerInput};
//! use stepgate::registry::StepRegistry;
//! use stepgate::report::RecordingReporter;
//! use stepgate::runner::Engine;
//! use serde_json::json;
//!
//! let mut steps = StepRegistry::new();
//! steps.register_step("get_sum", |bundle| {
//!     let total: i64 = bundle.iter().filter_map(|v| v.as_i64()).sum();
//!     Some(vec![json!(total)])
//! });
//!
//! let mut fixtures = TestRegistry::new();
//! fixtures.register_unit(
//!     "get_sum",
//!     UnitFixture::new("t1", vec![json!(1), json!(2), json!(3)], vec![json!(6)]),
//! );
//!
//! let mut reporter = RecordingReporter::new();
//! let mut engine = Engine::new(&steps, &fixtures, &mut reporter);
//! let mut pipeline = Pipeline::new(
//!     "sums",
//!     "get_sum",
//!     PrimerInput::Literal(vec![json!(4), json!(5)]),
//! );
//! engine.build(&mut pipeline).unwrap();
//! assert_eq!(pipeline.output, Some(vec![json!(9)]));
//! ```

pub mod bundle;
pub mod cli;
pub mod error;
pub mod fixtures;
pub mod gate;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod route;
pub mod runner;
pub mod state;
pub mod workflow;

pub use error::{Result, StepgateError};
