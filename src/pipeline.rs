//! Pipelines: ordered, gated chains of steps.
//!
//! A pipeline names its steps; the engine resolves them through the step
//! registry at build/run time. The first element — the primer — pairs a
//! step name with the initial input: a literal bundle, the recorded output
//! of an already-executed pipeline or workflow, or a value fetched from the
//! flag store.

use crate::bundle::Bundle;
use crate::route::ContextSwitch;

/// Where a pipeline's initial input comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimerInput {
    /// A literal bundle.
    Literal(Bundle),
    /// The output of an already-executed pipeline or workflow, by name.
    OutputOf(String),
    /// The value under a flag key; arrays become the bundle, scalars a
    /// one-element bundle, absent flags an empty bundle.
    Flag(String),
}

/// One step position after the primer.
#[derive(Debug, Clone, PartialEq)]
pub enum StepRef {
    /// A concrete step name.
    Name(String),
    /// A context switch resolved against the flags at each visit.
    Switch(ContextSwitch),
}

/// Execution options for a pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Emit verbose verdict traces while validating.
    pub debug: bool,
    /// Gate every step before running; disabled pipelines run directly.
    pub run_tests: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            debug: false,
            run_tests: true,
        }
    }
}

/// An ordered, gated chain of steps.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Name used for output chaining and reporting.
    pub name: String,
    /// Primer step name.
    pub primer: String,
    /// The primer's input source.
    pub input: PrimerInput,
    /// Steps after the primer, in order.
    pub rest: Vec<StepRef>,
    /// Execution options.
    pub options: PipelineOptions,
    /// Whether validation approved every step. Cleared after a run.
    pub can_run: bool,
    /// Whether the pipeline ran to completion.
    pub executed: bool,
    /// Final output, set only on successful execution.
    pub output: Option<Bundle>,
}

impl Pipeline {
    /// Create a pipeline with its primer.
    pub fn new(name: &str, primer: &str, input: PrimerInput) -> Self {
        Self {
            name: name.to_string(),
            primer: primer.to_string(),
            input,
            rest: Vec::new(),
            options: PipelineOptions::default(),
            can_run: false,
            executed: false,
            output: None,
        }
    }

    /// Append a named step.
    pub fn step(mut self, name: &str) -> Self {
        self.rest.push(StepRef::Name(name.to_string()));
        self
    }

    /// Append a context-switched step position.
    pub fn switch(mut self, switch: ContextSwitch) -> Self {
        self.rest.push(StepRef::Switch(switch));
        self
    }

    /// Replace the options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Total step count, primer included.
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// A pipeline always has at least its primer.
    pub fn is_empty(&self) -> bool {
        false
    }
}
