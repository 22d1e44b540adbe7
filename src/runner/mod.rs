//! The execution engine: builds (gates) and runs pipelines and workflows.
//!
//! The engine owns the run-scoped collaborators — flag store, optional
//! durable state, the outputs map for cross-pipeline chaining — and borrows
//! the step and fixture registries. Pipelines and workflows are plain data;
//! all execution logic lives here.
//!
//! Building a pipeline gates every step position in order and stops at the
//! first non-approved verdict. While gating, the bundle fed to the next
//! gate is the previous step's *fixture-expected* output (when one passed),
//! not the step's live return value; live values flow only during the run
//! phase. Running invokes each step on the live bundle and halts without
//! error when a step returns the failure sentinel.

use std::collections::HashMap;
use std::time::Instant;

use serde_json::Value;
use tracing::debug;

use crate::bundle::Bundle;
use crate::error::{Result, StepgateError};
use crate::fixtures::TestRegistry;
use crate::gate::{TestGate, TestRunStatus};
use crate::pipeline::{Pipeline, PrimerInput, StepRef};
use crate::registry::StepRegistry;
use crate::report::Reporter;
use crate::state::{DurableState, MemoryState, SharedFlags, StateStore};
use crate::workflow::{Member, Workflow};

/// Executes pipelines and workflows against injected registries.
pub struct Engine<'a> {
    steps: &'a StepRegistry,
    fixtures: &'a TestRegistry,
    reporter: &'a mut dyn Reporter,
    flags: SharedFlags,
    state: Option<DurableState>,
    outputs: HashMap<String, Bundle>,
    last_test_output: Option<Bundle>,
}

impl<'a> Engine<'a> {
    /// Create an engine over the given registries and reporter.
    pub fn new(
        steps: &'a StepRegistry,
        fixtures: &'a TestRegistry,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            steps,
            fixtures,
            reporter,
            flags: MemoryState::new().into_shared(),
            state: None,
            outputs: HashMap::new(),
            last_test_output: None,
        }
    }

    /// Use `flags` as the shared flag store.
    ///
    /// Steps that route or accumulate through flags capture their own clone
    /// of the same handle.
    pub fn with_flags(mut self, flags: SharedFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attach a durable state store; gate verdicts are persisted into it.
    pub fn with_durable_state(mut self, state: DurableState) -> Self {
        self.state = Some(state);
        self
    }

    /// The shared flag store.
    pub fn flags(&self) -> &SharedFlags {
        &self.flags
    }

    /// The attached durable store, if any.
    pub fn durable_state(&self) -> Option<&DurableState> {
        self.state.as_ref()
    }

    /// Recorded output of an executed pipeline or workflow.
    pub fn output_of(&self, name: &str) -> Option<&Bundle> {
        self.outputs.get(name)
    }

    /// Expected output of the most recent passing unit fixture.
    pub fn last_test_output(&self) -> Option<&Bundle> {
        self.last_test_output.as_ref()
    }

    /// Validate every step of `pipeline` in order, then run it.
    ///
    /// Each position is gated against the bundle threaded so far; the first
    /// non-approved verdict stops validation with [`StepgateError::Build`]
    /// and the pipeline stays unrunnable. When every position is approved
    /// the pipeline is marked runnable and [`Engine::run`] is entered
    /// directly. Pipelines with gating disabled skip straight to the run.
    pub fn build(&mut self, pipeline: &mut Pipeline) -> Result<()> {
        let started = Instant::now();

        if pipeline.options.run_tests {
            let mut current = self.resolve_primer(&pipeline.input)?;
            let total = pipeline.len();

            for index in 0..total {
                let name = self.resolve_position(pipeline, index);
                if pipeline.options.debug {
                    debug!(pipeline = %pipeline.name, step = %name, input = ?current, "gating");
                }

                let gate = TestGate::new(self.steps, self.fixtures);
                let status = gate.run(&name, &current, &mut *self.reporter);
                self.persist_verdict(&name, &status)?;

                if !status.approved {
                    self.reporter
                        .build_failed(&pipeline.name, &name, started.elapsed());
                    return Err(StepgateError::Build {
                        pipeline: pipeline.name.clone(),
                        step: name,
                    });
                }

                // Thread the fixture-expected output forward; when the step
                // had no passing unit fixture the bundle is left as-is.
                if let Some(output) = status.last_test_output {
                    self.last_test_output = Some(output.clone());
                    current = output;
                }
            }
        }

        pipeline.can_run = true;
        self.run(pipeline)
    }

    /// Run a built pipeline, feeding each step's output to the next.
    ///
    /// A step returning the failure sentinel halts the pipeline without an
    /// error; the pipeline simply ends unexecuted. Successful execution
    /// records the final bundle under the pipeline's name for chaining and
    /// consumes the build approval.
    pub fn run(&mut self, pipeline: &mut Pipeline) -> Result<()> {
        if !pipeline.can_run {
            self.reporter.not_built(&pipeline.name);
            return Err(StepgateError::NotBuilt {
                pipeline: pipeline.name.clone(),
            });
        }

        let started = Instant::now();
        pipeline.can_run = false;

        let mut current = self.resolve_primer(&pipeline.input)?;
        let total = pipeline.len();

        for index in 0..total {
            let name = self.resolve_position(pipeline, index);
            let step = self
                .steps
                .resolve_step(&name)
                .ok_or_else(|| StepgateError::UnknownStep { name: name.clone() })?;

            match step(&current) {
                Some(output) => current = output,
                None => {
                    self.reporter.pipeline_halted(
                        &pipeline.name,
                        index + 1,
                        total,
                        &name,
                        started.elapsed(),
                    );
                    return Ok(());
                }
            }
        }

        pipeline.output = Some(current.clone());
        pipeline.executed = true;
        self.outputs.insert(pipeline.name.clone(), current);
        self.reporter
            .pipeline_executed(&pipeline.name, started.elapsed());
        Ok(())
    }

    /// Execute a workflow's members in order, stopping at the first member
    /// that fails to execute.
    ///
    /// Member failures (gating rejections, sentinel halts) end the workflow
    /// without an error; only infrastructure failures — I/O and state
    /// persistence — propagate. An empty workflow is a no-op and stays
    /// unexecuted.
    pub fn run_workflow(&mut self, workflow: &mut Workflow) -> Result<()> {
        let started = Instant::now();
        if workflow.is_empty() {
            return Ok(());
        }

        let total = workflow.len();
        for index in 0..total {
            let result = match &mut workflow.members[index] {
                Member::Pipeline(pipeline) => self.build(pipeline),
                Member::Workflow(inner) => self.run_workflow(inner),
            };
            match result {
                Ok(()) => {}
                Err(e @ StepgateError::Io(_)) | Err(e @ StepgateError::StateEntry { .. }) => {
                    return Err(e)
                }
                Err(_) => {}
            }

            let member = &workflow.members[index];
            if !member.executed() {
                self.reporter.workflow_halted(
                    &workflow.name,
                    member.name(),
                    index + 1,
                    total,
                    started.elapsed(),
                );
                return Ok(());
            }
        }

        let last = &workflow.members[total - 1];
        workflow.output = last.output().cloned();
        workflow.executed = true;
        if let Some(output) = &workflow.output {
            self.outputs.insert(workflow.name.clone(), output.clone());
        }
        self.reporter
            .workflow_executed(&workflow.name, started.elapsed());
        Ok(())
    }

    /// Materialize a pipeline's initial bundle from its primer input.
    fn resolve_primer(&self, input: &PrimerInput) -> Result<Bundle> {
        match input {
            PrimerInput::Literal(bundle) => Ok(bundle.clone()),
            PrimerInput::OutputOf(name) => self
                .outputs
                .get(name)
                .cloned()
                .ok_or_else(|| StepgateError::UnresolvedOutput { name: name.clone() }),
            PrimerInput::Flag(key) => {
                let flags = self.flags.borrow();
                Ok(match flags.get(key) {
                    Some(Value::Array(items)) => items.clone(),
                    Some(value) => vec![value.clone()],
                    None => Vec::new(),
                })
            }
        }
    }

    /// Name of the step at `index`, switches resolved against current flags.
    fn resolve_position(&self, pipeline: &Pipeline, index: usize) -> String {
        if index == 0 {
            return pipeline.primer.clone();
        }
        match &pipeline.rest[index - 1] {
            StepRef::Name(name) => name.clone(),
            StepRef::Switch(switch) => switch.resolve(&self.flags.borrow()).to_string(),
        }
    }

    fn persist_verdict(&mut self, step: &str, status: &TestRunStatus) -> Result<()> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };

        let value = serde_json::to_value(status).map_err(|e| StepgateError::StateEntry {
            key: format!("status:{}", step),
            message: e.to_string(),
        })?;
        state.update(&format!("status:{}", step), value)?;

        if let Some(output) = &status.last_test_output {
            state.update("last_test_output", Value::Array(output.clone()))?;
        }
        Ok(())
    }
}
