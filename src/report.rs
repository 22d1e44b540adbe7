//! Run reporting.
//!
//! The engine narrates gate verdicts and pipeline/workflow outcomes through
//! the [`Reporter`] trait. Reports are advisory only — they never affect
//! control flow. [`ConsoleReporter`] prints styled lines to stdout;
//! [`RecordingReporter`] captures events for assertions in tests.

use std::time::Duration;

use console::Style;

use crate::gate::TestRunStatus;

/// Observability collaborator for engine runs.
pub trait Reporter {
    /// A step was gated; full per-category verdict.
    fn gate_report(&mut self, step: &str, status: &TestRunStatus);

    /// Pipeline validation stopped at a non-approved step.
    fn build_failed(&mut self, pipeline: &str, step: &str, elapsed: Duration);

    /// A pipeline was asked to run before being built.
    fn not_built(&mut self, pipeline: &str);

    /// A step returned the failure sentinel; propagation stopped.
    fn pipeline_halted(
        &mut self,
        pipeline: &str,
        position: usize,
        total: usize,
        step: &str,
        elapsed: Duration,
    );

    /// Every step of the pipeline ran and produced output.
    fn pipeline_executed(&mut self, pipeline: &str, elapsed: Duration);

    /// A workflow member failed to execute; the workflow stopped there.
    fn workflow_halted(
        &mut self,
        workflow: &str,
        member: &str,
        position: usize,
        total: usize,
        elapsed: Duration,
    );

    /// Every workflow member executed.
    fn workflow_executed(&mut self, workflow: &str, elapsed: Duration);
}

fn secs(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64()
}

/// Styled line-oriented reporter for terminals.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    success: Style,
    error: Style,
    dim: Style,
    header: Style,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    /// Create the default styled reporter.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold(),
        }
    }

    /// Create a reporter without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
        }
    }

    fn category_lines(&self, label: &str, status: &crate::gate::CategoryStatus) {
        println!("  {}", self.header.apply_to(label));
        println!("    PASSED:    {} tests", status.passed.len());
        println!(
            "    FAILED:    {} tests: {:?}",
            status.failed.len(),
            status.failed
        );
        println!(
            "    NOT_FOUND: {} tests: {:?}",
            status.not_found.len(),
            status.not_found
        );
        println!(
            "    {}",
            self.dim
                .apply_to(format!("duration: {:.3} secs", status.runtime_ms as f64 / 1000.0))
        );
    }
}

impl Reporter for ConsoleReporter {
    fn gate_report(&mut self, step: &str, status: &TestRunStatus) {
        println!("{}", self.header.apply_to(format!("step: {}", step)));
        self.category_lines("package tests", &status.package);
        self.category_lines("unit tests", &status.unit);
        let verdict = if status.approved {
            self.success.apply_to("approved").to_string()
        } else {
            self.error.apply_to("not approved").to_string()
        };
        println!("  verdict: {}", verdict);
    }

    fn build_failed(&mut self, pipeline: &str, step: &str, elapsed: Duration) {
        println!(
            "{}",
            self.error.apply_to(format!(
                "BuildError: pipeline '{}' failed at step '{}'. Duration: {:.3} secs",
                pipeline,
                step,
                secs(elapsed)
            ))
        );
    }

    fn not_built(&mut self, pipeline: &str) {
        println!(
            "{}",
            self.error.apply_to(format!(
                "RuntimeError: build pipeline '{}' before running it",
                pipeline
            ))
        );
    }

    fn pipeline_halted(
        &mut self,
        pipeline: &str,
        position: usize,
        total: usize,
        step: &str,
        elapsed: Duration,
    ) {
        println!(
            "{}",
            self.error.apply_to(format!(
                "Pipeline '{}' halted at step {} of {} [{}]. Duration: {:.3} secs",
                pipeline,
                position,
                total,
                step,
                secs(elapsed)
            ))
        );
    }

    fn pipeline_executed(&mut self, pipeline: &str, elapsed: Duration) {
        println!(
            "{}",
            self.success.apply_to(format!(
                "Pipeline '{}' executed successfully. Duration: {:.3} secs",
                pipeline,
                secs(elapsed)
            ))
        );
    }

    fn workflow_halted(
        &mut self,
        workflow: &str,
        member: &str,
        position: usize,
        total: usize,
        elapsed: Duration,
    ) {
        println!(
            "{}",
            self.error.apply_to(format!(
                "Workflow '{}' halted by failed member '{}' ({} of {}). Duration: {:.3} secs",
                workflow,
                member,
                position,
                total,
                secs(elapsed)
            ))
        );
    }

    fn workflow_executed(&mut self, workflow: &str, elapsed: Duration) {
        println!(
            "{}",
            self.success.apply_to(format!(
                "Workflow '{}' executed successfully in {:.3} secs",
                workflow,
                secs(elapsed)
            ))
        );
    }
}

/// Reporter that captures all events for later assertion.
///
/// # Example
///
/// ```
/// use stepgate::report::{RecordingReporter, Reporter};
/// use std::time::Duration;
///
/// let mut reporter = RecordingReporter::new();
/// reporter.pipeline_executed("scrape", Duration::ZERO);
/// assert_eq!(reporter.events(), &["pipeline_executed:scrape"]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Vec<String>,
    gate_reports: Vec<(String, TestRunStatus)>,
}

impl RecordingReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured events, in order, as `kind:detail` strings.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Captured gate verdicts, in order.
    pub fn gate_reports(&self) -> &[(String, TestRunStatus)] {
        &self.gate_reports
    }
}

impl Reporter for RecordingReporter {
    fn gate_report(&mut self, step: &str, status: &TestRunStatus) {
        self.events.push(format!("gate:{}", step));
        self.gate_reports.push((step.to_string(), status.clone()));
    }

    fn build_failed(&mut self, pipeline: &str, step: &str, _elapsed: Duration) {
        self.events.push(format!("build_failed:{}:{}", pipeline, step));
    }

    fn not_built(&mut self, pipeline: &str) {
        self.events.push(format!("not_built:{}", pipeline));
    }

    fn pipeline_halted(
        &mut self,
        pipeline: &str,
        position: usize,
        total: usize,
        step: &str,
        _elapsed: Duration,
    ) {
        self.events.push(format!(
            "pipeline_halted:{}:{}/{}:{}",
            pipeline, position, total, step
        ));
    }

    fn pipeline_executed(&mut self, pipeline: &str, _elapsed: Duration) {
        self.events.push(format!("pipeline_executed:{}", pipeline));
    }

    fn workflow_halted(
        &mut self,
        workflow: &str,
        member: &str,
        position: usize,
        total: usize,
        _elapsed: Duration,
    ) {
        self.events.push(format!(
            "workflow_halted:{}:{}:{}/{}",
            workflow, member, position, total
        ));
    }

    fn workflow_executed(&mut self, workflow: &str, _elapsed: Duration) {
        self.events.push(format!("workflow_executed:{}", workflow));
    }
}
