//! Integration tests for the engine over the public API.

use serde_json::json;
use stepgate::fixtures::{TestCategory, TestRegistry, UnitFixture};
use stepgate::pipeline::{Pipeline, PipelineOptions, PrimerInput};
use stepgate::registry::StepRegistry;
use stepgate::report::RecordingReporter;
use stepgate::route::{ContextSwitch, Guard};
use stepgate::runner::Engine;
use stepgate::state::{DurableState, MemoryState, SharedFlags, StateStore};
use stepgate::workflow::Workflow;
use stepgate::StepgateError;
use tempfile::TempDir;

fn registry(flags: &SharedFlags) -> StepRegistry {
    let mut steps = StepRegistry::with_builtins();

    steps.register_step("get_sum", |bundle| {
        let total: i64 = bundle.iter().filter_map(|v| v.as_i64()).sum();
        Some(vec![json!(total)])
    });
    steps.register_step("times_two", |bundle| {
        Some(
            bundle
                .iter()
                .filter_map(|v| v.as_i64())
                .map(|n| json!(n * 2))
                .collect(),
        )
    });
    steps.register_step("reject_odd_sum", |bundle| {
        let total: i64 = bundle.iter().filter_map(|v| v.as_i64()).sum();
        if total % 2 == 0 {
            Some(bundle.clone())
        } else {
            None
        }
    });

    let handle = SharedFlags::clone(flags);
    steps.register_step("record_total", move |bundle| {
        let total: i64 = bundle.iter().filter_map(|v| v.as_i64()).sum();
        handle.borrow_mut().set("total", json!(total));
        Some(bundle.clone())
    });

    steps
}

fn fixtures() -> TestRegistry {
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

// A failing fixture anywhere in the pipeline leaves it unrunnable and
// untouched by execution.
#[test]
fn rejected_pipeline_never_executes() {
    let flags = MemoryState::new().into_shared();
    let steps = registry(&flags);
    let mut fixtures = fixtures();
    fixtures.register_unit(
        "times_two",
        UnitFixture::new("broken", vec![json!(1)], vec![json!(3)]),
    );

    let mut reporter = RecordingReporter::new();
    let mut engine = Engine::new(&steps, &fixtures, &mut reporter);

    let mut pipeline = Pipeline::new(
        "doubles",
        "times_two",
        PrimerInput::Literal(vec![json!(1), json!(2)]),
    )
    .step("get_sum");

    let err = engine.build(&mut pipeline).unwrap_err();
    assert!(matches!(err, StepgateError::Build { .. }));
    assert!(!pipeline.executed);
    assert!(pipeline.output.is_none());
    assert!(engine.output_of("doubles").is_none());
}

// Deregistering the failing fixture makes the same pipeline buildable.
#[test]
fn deregistering_a_fixture_unblocks_the_gate() {
    let flags = MemoryState::new().into_shared();
    let steps = registry(&flags);
    let mut fixtures = fixtures();
    fixtures.register_unit(
        "times_two",
        UnitFixture::new("broken", vec![json!(1)], vec![json!(3)]),
    );

    assert!(fixtures.deregister(TestCategory::Unit, "times_two", "broken"));

    let mut reporter = RecordingReporter::new();
    let mut engine = Engine::new(&steps, &fixtures, &mut reporter);

    let mut pipeline = Pipeline::new(
        "doubles",
        "times_two",
        PrimerInput::Literal(vec![json!(1), json!(2)]),
    );
    engine.build(&mut pipeline).unwrap();
    assert!(pipeline.executed);
}

// During validation each gate sees the previous fixture's expected output;
// during the run each step sees the live bundle.
#[test]
fn validation_and_run_thread_different_bundles() {
    let flags = MemoryState::new().into_shared();
    let steps = registry(&flags);
    let fixtures = fixtures();

    let mut reporter = RecordingReporter::new();
    let mut engine = Engine::new(&steps, &fixtures, &mut reporter);

    let mut pipeline = Pipeline::new(
        "chain",
        "times_two",
        PrimerInput::Literal(vec![json!(10), json!(20)]),
    )
    .step("get_sum");
    engine.build(&mut pipeline).unwrap();

    // Fixture-expected [2, 4, 6] was what get_sum's package test saw.
    let (step, status) = &reporter.gate_reports()[1];
    assert_eq!(step, "get_sum");
    assert_eq!(status.package.passed, vec!["number_only"]);

    // The live run doubled [10, 20] and summed the result.
    assert_eq!(pipeline.output, Some(vec![json!(60)]));
}

#[test]
fn outputs_chain_across_pipelines_and_workflows() {
    let flags = MemoryState::new().into_shared();
    let steps = registry(&flags);
    let fixtures = fixtures();

    let mut reporter = RecordingReporter::new();
    let mut engine = Engine::new(&steps, &fixtures, &mut reporter);

    let mut workflow = Workflow::new("pair")
        .pipeline(Pipeline::new(
            "sums",
            "get_sum",
            PrimerInput::Literal(vec![json!(1), json!(2), json!(3)]),
        ))
        .pipeline(Pipeline::new(
            "doubles",
            "times_two",
            PrimerInput::OutputOf("sums".into()),
        ));
    engine.run_workflow(&mut workflow).unwrap();

    assert_eq!(workflow.output, Some(vec![json!(12)]));

    // The workflow's own output is chainable too.
    let mut tail = Pipeline::new("tail", "times_two", PrimerInput::OutputOf("pair".into()));
    engine.build(&mut tail).unwrap();
    assert_eq!(tail.output, Some(vec![json!(24)]));
}

#[test]
fn sentinel_halts_pipeline_and_workflow_without_error() {
    let flags = MemoryState::new().into_shared();
    let steps = registry(&flags);
    let fixtures = TestRegistry::new();

    let mut reporter = RecordingReporter::new();
    let mut engine = Engine::new(&steps, &fixtures, &mut reporter);

    let mut workflow = Workflow::new("wf")
        .pipeline(
            // [1, 2] sums to 3, so reject_odd_sum refuses it.
            Pipeline::new(
                "filtered",
                "reject_odd_sum",
                PrimerInput::Literal(vec![json!(1), json!(2)]),
            ),
        )
        .pipeline(Pipeline::new(
            "after",
            "get_sum",
            PrimerInput::Literal(vec![json!(1)]),
        ));

    engine.run_workflow(&mut workflow).unwrap();

    assert!(!workflow.executed);
    assert!(reporter
        .events()
        .contains(&"pipeline_halted:filtered:1/1:reject_odd_sum".to_string()));
    assert!(reporter
        .events()
        .contains(&"workflow_halted:wf:filtered:1/2".to_string()));
    assert!(!reporter.events().iter().any(|e| e.contains("after")));
}

#[test]
fn flags_written_by_steps_drive_switches_and_primers() {
    let flags = MemoryState::new().into_shared();
    let steps = registry(&flags);
    let fixtures = TestRegistry::new();

    let mut reporter = RecordingReporter::new();
    let mut engine =
        Engine::new(&steps, &fixtures, &mut reporter).with_flags(SharedFlags::clone(&flags));

    // record_total stores 30 under the "total" flag; the switch then routes
    // to times_two because the flag is truthy.
    let mut pipeline = Pipeline::new(
        "routed",
        "record_total",
        PrimerInput::Literal(vec![json!(10), json!(20)]),
    )
    .switch(ContextSwitch::new(
        vec![(Guard::FlagTruthy("total".into()), "times_two".into())],
        "get_sum",
    ));
    engine.build(&mut pipeline).unwrap();
    assert_eq!(pipeline.output, Some(vec![json!(20), json!(40)]));

    // A later pipeline can prime itself from the same flag.
    let mut from_flag = Pipeline::new("from_flag", "times_two", PrimerInput::Flag("total".into()));
    engine.build(&mut from_flag).unwrap();
    assert_eq!(from_flag.output, Some(vec![json!(60)]));
}

#[test]
fn gating_disabled_ignores_even_failing_fixtures() {
    let flags = MemoryState::new().into_shared();
    let steps = registry(&flags);
    let mut fixtures = TestRegistry::new();
    fixtures.register_unit(
        "get_sum",
        UnitFixture::new("broken", vec![json!(1)], vec![json!(999)]),
    );

    let mut reporter = RecordingReporter::new();
    let mut engine = Engine::new(&steps, &fixtures, &mut reporter);

    let mut pipeline = Pipeline::new(
        "direct",
        "get_sum",
        PrimerInput::Literal(vec![json!(2), json!(3)]),
    )
    .with_options(PipelineOptions {
        run_tests: false,
        ..Default::default()
    });
    engine.build(&mut pipeline).unwrap();

    assert!(pipeline.executed);
    assert_eq!(pipeline.output, Some(vec![json!(5)]));
    assert!(reporter.gate_reports().is_empty());
}

#[test]
fn verdicts_survive_in_durable_state() {
    let flags = MemoryState::new().into_shared();
    let steps = registry(&flags);
    let fixtures = fixtures();

    let temp = TempDir::new().unwrap();
    let mut reporter = RecordingReporter::new();
    let mut engine = Engine::new(&steps, &fixtures, &mut reporter)
        .with_durable_state(DurableState::new(temp.path()).unwrap());

    let mut pipeline = Pipeline::new(
        "sums",
        "get_sum",
        PrimerInput::Literal(vec![json!(1), json!(2), json!(3)]),
    )
    .step("times_two");
    engine.build(&mut pipeline).unwrap();

    let state = engine.durable_state().unwrap();
    let sum_verdict = state.fetch("status:get_sum").unwrap().unwrap();
    assert_eq!(sum_verdict["approved"], json!(true));
    assert_eq!(sum_verdict["unit"]["passed"], json!(["t1"]));

    // Threading: times_two was gated after get_sum, so the last recorded
    // fixture output belongs to it.
    assert_eq!(
        state.fetch("last_test_output").unwrap(),
        Some(json!([2, 4, 6]))
    );
}
