//! Error types for stepgate operations.
//!
//! This module defines [`StepgateError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `StepgateError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `StepgateError::Other`) for unexpected errors
//! - Resolution failures inside the test gate are *not* errors; they are
//!   recorded as `not_found` outcomes and never abort a run

use thiserror::Error;

/// Core error type for stepgate operations.
#[derive(Debug, Error)]
pub enum StepgateError {
    /// Pipeline validation failed: a step was not approved by its test gate.
    #[error("Pipeline '{pipeline}' failed to build at step '{step}'")]
    Build { pipeline: String, step: String },

    /// Attempt to run a pipeline that was never approved.
    #[error("Pipeline '{pipeline}' is not built; build it before running")]
    NotBuilt { pipeline: String },

    /// A step name could not be resolved at run time.
    #[error("Unknown step: {name}")]
    UnknownStep { name: String },

    /// A primer referenced the output of an entity that never executed.
    #[error("No executed pipeline or workflow named '{name}'")]
    UnresolvedOutput { name: String },

    /// A test category string was neither `package` nor `unit`.
    #[error("Unknown test category: {name}")]
    UnknownCategory { name: String },

    /// A persisted state entry could not be serialized or parsed.
    #[error("State entry for key '{key}' is invalid: {message}")]
    StateEntry { key: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for stepgate operations.
pub type Result<T> = std::result::Result<T, StepgateError>;
