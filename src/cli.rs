//! Command-line interface.
//!
//! Argument parsing uses clap's derive macros; [`dispatch`] maps a parsed
//! [`Cli`] to an execution against a bundled demonstration registry. The
//! demo wires two arithmetic steps, their fixtures, a flag-routed context
//! switch, and a two-pipeline workflow, so the whole engine surface can be
//! exercised from a shell.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use crate::error::Result;
use crate::fixtures::{TestRegistry, UnitFixture};
use crate::pipeline::{Pipeline, PipelineOptions, PrimerInput};
use crate::registry::StepRegistry;
use crate::report::Reporter;
use crate::route::{ContextSwitch, Guard};
use crate::runner::Engine;
use crate::state::{DurableState, MemoryState, SharedFlags};
use crate::workflow::Workflow;

/// Stepgate - test-gated step orchestration.
#[derive(Debug, Parser)]
#[command(name = "stepgate")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the demonstration workflow (default if no command specified)
    Demo(DemoArgs),

    /// List the steps and predicates in the demonstration registry
    Steps,
}

/// Arguments for the `demo` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DemoArgs {
    /// Persist gate verdicts under this directory
    #[arg(long, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Skip test gating and run the pipelines directly
    #[arg(long)]
    pub no_gate: bool,
}

/// The demonstration step registry: arithmetic steps over integer bundles.
///
/// `times_two` counts its invocations in the `doublings` flag, which the
/// demo workflow later routes on.
pub fn demo_registry(flags: &SharedFlags) -> StepRegistry {
    let mut steps = StepRegistry::with_builtins();

    steps.register_step("get_sum", |bundle| {
        let total: i64 = bundle.iter().filter_map(|v| v.as_i64()).sum();
        Some(vec![json!(total)])
    });

    let handle = SharedFlags::clone(flags);
    steps.register_step("times_two", move |bundle| {
        let mut flags = handle.borrow_mut();
        let count = flags.get("doublings").and_then(|v| v.as_i64()).unwrap_or(0);
        flags.set("doublings", json!(count + 1));
        Some(
            bundle
                .iter()
                .filter_map(|v| v.as_i64())
                .map(|n| json!(n * 2))
                .collect(),
        )
    });

    steps
}

/// Fixtures for the demonstration registry.
pub fn demo_fixtures() -> TestRegistry {
    let mut fixtures = TestRegistry::new();
    fixtures.register_package("get_sum", "number_only");
    fixtures.register_unit(
        "get_sum",
        UnitFixture::new("t1", vec![json!(1), json!(2), json!(3)], vec![json!(6)]),
    );
    fixtures.register_unit(
        "times_two",
        UnitFixture::new(
            "t1",
            vec![json!(1), json!(2), json!(3)],
            vec![json!(2), json!(4), json!(6)],
        ),
    );
    fixtures
}

/// Execute the parsed command.
pub fn dispatch(cli: &Cli, reporter: &mut dyn Reporter) -> Result<()> {
    match &cli.command {
        Some(Commands::Demo(args)) => demo(args, reporter),
        Some(Commands::Steps) => {
            list_steps();
            Ok(())
        }
        None => demo(&DemoArgs::default(), reporter),
    }
}

fn list_steps() {
    let flags = MemoryState::new().into_shared();
    let steps = demo_registry(&flags);
    let mut names = steps.step_names();
    names.sort_unstable();
    for name in names {
        println!("{}", name);
    }
}

/// Run the demonstration workflow: double a bundle, then route on the
/// `doublings` flag before summing.
fn demo(args: &DemoArgs, reporter: &mut dyn Reporter) -> Result<()> {
    let flags = MemoryState::new().into_shared();
    let steps = demo_registry(&flags);
    let fixtures = demo_fixtures();

    let mut engine = Engine::new(&steps, &fixtures, reporter).with_flags(SharedFlags::clone(&flags));
    if let Some(dir) = &args.state_dir {
        engine = engine.with_durable_state(DurableState::new(dir)?);
    }

    let options = PipelineOptions {
        run_tests: !args.no_gate,
        ..Default::default()
    };

    let doubled = Pipeline::new(
        "doubled",
        "times_two",
        PrimerInput::Literal(vec![json!(1), json!(2), json!(3)]),
    )
    .with_options(options);

    // Once `times_two` has run, the switch routes the chained bundle through
    // a second doubling before the sum.
    let summed = Pipeline::new("summed", "times_two", PrimerInput::OutputOf("doubled".into()))
        .switch(ContextSwitch::new(
            vec![(Guard::FlagTruthy("doublings".into()), "get_sum".into())],
            "times_two",
        ))
        .with_options(options);

    let mut workflow = Workflow::new("demo").pipeline(doubled).pipeline(summed);
    engine.run_workflow(&mut workflow)?;

    if let Some(output) = &workflow.output {
        println!("demo output: {}", serde_json::to_string(output).unwrap_or_default());
    }
    Ok(())
}
