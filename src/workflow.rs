//! Workflows: ordered, short-circuiting chains of pipelines and nested
//! workflows.
//!
//! A workflow owns no execution state beyond its bookkeeping: members run
//! strictly in order, the first member that fails to execute halts the
//! workflow, and the last member's output becomes the workflow's output.

use crate::bundle::Bundle;
use crate::pipeline::Pipeline;

/// A workflow member: a pipeline or a nested workflow.
#[derive(Debug, Clone)]
pub enum Member {
    Pipeline(Pipeline),
    Workflow(Workflow),
}

impl Member {
    /// The member's name, for reporting and output chaining.
    pub fn name(&self) -> &str {
        match self {
            Member::Pipeline(p) => &p.name,
            Member::Workflow(w) => &w.name,
        }
    }

    /// Whether the member ran to completion.
    pub fn executed(&self) -> bool {
        match self {
            Member::Pipeline(p) => p.executed,
            Member::Workflow(w) => w.executed,
        }
    }

    /// The member's output, if it executed.
    pub fn output(&self) -> Option<&Bundle> {
        match self {
            Member::Pipeline(p) => p.output.as_ref(),
            Member::Workflow(w) => w.output.as_ref(),
        }
    }
}

/// An ordered, short-circuiting chain of pipelines and nested workflows.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    /// Name used for output chaining and reporting.
    pub name: String,
    /// Members, in execution order.
    pub members: Vec<Member>,
    /// Whether every member executed.
    pub executed: bool,
    /// The last member's output, set only when every member executed.
    pub output: Option<Bundle>,
}

impl Workflow {
    /// Create an empty workflow.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Append a pipeline member.
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.members.push(Member::Pipeline(pipeline));
        self
    }

    /// Append a nested workflow member.
    pub fn workflow(mut self, workflow: Workflow) -> Self {
        self.members.push(Member::Workflow(workflow));
        self
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the workflow has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
