// tests/orchestrator_parallel.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, StackBuilder, TaskBuilder};
use crate::common::{FakeBackend, init_tracing, orchestrator, summary, with_timeout};

use std::time::Duration;

use proptest::prelude::*;

use dotbox::engine::{EntryClass, StackOutcome};
use dotbox::types::{ConcurrencyMode, Response};

#[tokio::test]
async fn parallel_stack_keeps_declaration_order_despite_completion_order() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "fan",
            StackBuilder::parallel()
                .task(TaskBuilder::custom_cmd("slow").build())
                .task(TaskBuilder::custom_cmd("fast").blocking(false).build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new()
        .delay("slow", Duration::from_millis(50))
        .always_exits("fast", 2);

    let report = with_timeout(orchestrator(&cfg, &backend).run_stack("fan", &cfg))
        .await
        .unwrap();

    // Both issued before either finished.
    assert_eq!(backend.command_lines(), vec!["slow", "fast"]);
    assert_eq!(report.mode, ConcurrencyMode::Parallel);
    assert_eq!(report.slots.len(), 2);
    assert_eq!(
        summary(&report.results),
        vec![
            ("custom-cmd".to_string(), true, false),
            ("custom-cmd".to_string(), false, false),
        ]
    );
    assert_eq!(report.outcome, StackOutcome::SucceededWithNonBlockingErrors);
}

#[tokio::test]
async fn one_blocking_failure_fails_the_run_but_every_task_runs() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "fan",
            StackBuilder::parallel()
                .task(TaskBuilder::custom_cmd("boom").build())
                .task(TaskBuilder::custom_cmd("a").build())
                .task(TaskBuilder::custom_cmd("b").build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new().always_exits("boom", 1);

    let report = orchestrator(&cfg, &backend)
        .run_stack("fan", &cfg)
        .await
        .unwrap();

    assert_eq!(backend.launched().len(), 3);
    assert!(report.rejected);
    assert_eq!(report.count(EntryClass::BlockingFailure), 1);
    assert_eq!(report.count(EntryClass::Success), 2);
    assert!(!report.results[0].success);
    assert_eq!(report.outcome, StackOutcome::Failed);
}

#[tokio::test]
async fn parallel_tasks_start_from_an_empty_chain() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "fan",
            StackBuilder::parallel()
                .task(TaskBuilder::custom_cmd("a").build())
                .task(TaskBuilder::new("ghost").build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new().missing("dotbox-ghost");

    let report = orchestrator(&cfg, &backend)
        .run_stack("fan", &cfg)
        .await
        .unwrap();

    // One slot per task: earlier responses are not carried into siblings.
    assert_eq!(report.slots.len(), 2);
    assert!(matches!(&report.slots[1], Response::Single(r) if r.plugin == "ghost"));
    assert_eq!(report.outcome, StackOutcome::Failed);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn parallel_slots_are_index_aligned(
        tasks in proptest::collection::vec((0u64..8, any::<bool>()), 1..8)
    ) {
        let mut stack = StackBuilder::parallel();
        let mut backend = FakeBackend::new();

        for (i, (delay_ms, fails)) in tasks.iter().enumerate() {
            let program = format!("task{i}");
            stack = stack.task(TaskBuilder::custom_cmd(&program).blocking(false).build());
            backend = backend.delay(&program, Duration::from_millis(*delay_ms));
            if *fails {
                backend = backend.always_exits(&program, 1);
            }
        }

        let cfg = ConfigFileBuilder::new().with_stack("fan", stack.build()).build();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let report = runtime
            .block_on(orchestrator(&cfg, &backend).run_stack("fan", &cfg))
            .unwrap();

        prop_assert_eq!(report.slots.len(), tasks.len());
        prop_assert_eq!(report.results.len(), tasks.len());
        for (result, (_, fails)) in report.results.iter().zip(tasks.iter()) {
            prop_assert_eq!(result.success, !*fails);
        }

        let expected = if tasks.iter().any(|(_, fails)| *fails) {
            StackOutcome::SucceededWithNonBlockingErrors
        } else {
            StackOutcome::Succeeded
        };
        prop_assert_eq!(report.outcome, expected);
    }
}
