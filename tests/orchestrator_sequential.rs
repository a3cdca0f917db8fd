// tests/orchestrator_sequential.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, StackBuilder, TaskBuilder};
use crate::common::{FakeBackend, init_tracing, orchestrator, summary, with_timeout};

use dotbox::engine::{EntryClass, StackOutcome};
use dotbox::errors::DotboxError;
use dotbox::types::{ConcurrencyMode, ErrorKind};

#[tokio::test]
async fn sequential_chain_runs_tasks_in_declaration_order() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "build",
            StackBuilder::sequential()
                .task(TaskBuilder::custom_cmd("first").build())
                .task(TaskBuilder::custom_cmd("second").build())
                .task(TaskBuilder::custom_cmd("third").build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new();

    let report = with_timeout(orchestrator(&cfg, &backend).run_stack("build", &cfg))
        .await
        .unwrap();

    assert_eq!(backend.command_lines(), vec!["first", "second", "third"]);
    assert_eq!(report.mode, ConcurrencyMode::Sequential);
    assert_eq!(report.outcome, StackOutcome::Succeeded);
    assert_eq!(report.results.len(), 3);
    assert!(report.results.iter().all(|r| r.success));
    assert_eq!(report.outcome.exit_code(), 0);
}

#[tokio::test]
async fn blocking_failure_aborts_the_rest_of_the_chain() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "ci",
            StackBuilder::sequential()
                .task(TaskBuilder::custom_cmd("true").build())
                .task(TaskBuilder::custom_cmd("false").build())
                .task(TaskBuilder::custom_cmd("never").build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new().always_exits("false", 1);

    let report = orchestrator(&cfg, &backend)
        .run_stack("ci", &cfg)
        .await
        .unwrap();

    assert_eq!(backend.launch_count("never"), 0);
    assert_eq!(
        summary(&report.results),
        vec![
            ("custom-cmd".to_string(), true, false),
            ("custom-cmd".to_string(), false, true),
        ]
    );
    assert!(report.rejected);
    assert_eq!(report.outcome, StackOutcome::Failed);
    assert_eq!(report.outcome.exit_code(), 1);

    let error = report.results[1].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::CommandFailed);
    assert!(error.message.contains("Process exited with code 1"));
}

#[tokio::test]
async fn non_blocking_failure_lets_the_chain_continue() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "ci",
            StackBuilder::sequential()
                .task(TaskBuilder::custom_cmd("false").blocking(false).build())
                .task(TaskBuilder::custom_cmd("true").build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new().always_exits("false", 1);

    let report = orchestrator(&cfg, &backend)
        .run_stack("ci", &cfg)
        .await
        .unwrap();

    assert_eq!(backend.command_lines(), vec!["false", "true"]);
    assert_eq!(report.count(EntryClass::NonBlockingFailure), 1);
    assert_eq!(report.count(EntryClass::Success), 1);
    assert_eq!(report.outcome, StackOutcome::SucceededWithNonBlockingErrors);
    assert_eq!(report.outcome.exit_code(), 0);
}

#[tokio::test]
async fn retries_are_exhausted_before_a_non_blocking_failure_resolves() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "flaky",
            StackBuilder::sequential()
                .task(
                    TaskBuilder::custom_cmd("flaky")
                        .retries(2)
                        .blocking(false)
                        .build(),
                )
                .build(),
        )
        .build();
    let backend = FakeBackend::new().always_exits("flaky", 3);

    let report = orchestrator(&cfg, &backend)
        .run_stack("flaky", &cfg)
        .await
        .unwrap();

    assert_eq!(backend.launch_count("flaky"), 3);
    assert!(!report.rejected);
    assert_eq!(summary(&report.results), vec![("custom-cmd".to_string(), false, false)]);
    assert_eq!(report.outcome, StackOutcome::SucceededWithNonBlockingErrors);
}

#[tokio::test]
async fn retry_stops_at_the_first_success() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "flaky",
            StackBuilder::sequential()
                .task(TaskBuilder::custom_cmd("flaky").retries(5).build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new().exits("flaky", &[1, 0]);

    let report = orchestrator(&cfg, &backend)
        .run_stack("flaky", &cfg)
        .await
        .unwrap();

    assert_eq!(backend.launch_count("flaky"), 2);
    assert_eq!(report.outcome, StackOutcome::Succeeded);
}

#[tokio::test]
async fn tasks_without_plugin_are_skipped() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "mixed",
            StackBuilder::sequential()
                .task(TaskBuilder::unnamed().option("cmd", "ignored").build())
                .task(TaskBuilder::new("   ").build())
                .task(TaskBuilder::custom_cmd("echo").build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new();
    let orchestrator = orchestrator(&cfg, &backend);

    let plan = orchestrator.plan("mixed", cfg.stack("mixed").unwrap());
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].index, 2);

    let report = orchestrator.run_stack("mixed", &cfg).await.unwrap();
    assert_eq!(backend.command_lines(), vec!["echo"]);
    assert_eq!(report.outcome, StackOutcome::Succeeded);
}

#[tokio::test]
async fn empty_stack_reports_no_tasks_without_invoking_anything() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack("empty", StackBuilder::sequential().build())
        .with_stack(
            "only-blank",
            StackBuilder::parallel().task(TaskBuilder::unnamed().build()).build(),
        )
        .build();
    let backend = FakeBackend::new();
    let orchestrator = orchestrator(&cfg, &backend);

    for stack in ["empty", "only-blank"] {
        let report = orchestrator.run_stack(stack, &cfg).await.unwrap();
        assert_eq!(report.outcome, StackOutcome::NoTasks);
        assert!(report.results.is_empty());
        assert_eq!(report.outcome.exit_code(), 0);
    }
    assert!(backend.launched().is_empty());
}

#[tokio::test]
async fn unknown_stack_is_a_config_error() {
    let cfg = ConfigFileBuilder::new().build();
    let backend = FakeBackend::new();

    let err = orchestrator(&cfg, &backend)
        .run_stack("nope", &cfg)
        .await
        .unwrap_err();

    assert!(matches!(err, DotboxError::ConfigError(msg) if msg.contains("nope")));
}

#[tokio::test]
async fn unknown_plugin_becomes_a_blocking_result_naming_the_id() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "ci",
            StackBuilder::sequential()
                .task(TaskBuilder::new("ghost").build())
                .task(TaskBuilder::custom_cmd("true").build())
                .build(),
        )
        .build();
    // `dotbox-ghost` is not on PATH either.
    let backend = FakeBackend::new().missing("dotbox-ghost");

    let report = orchestrator(&cfg, &backend)
        .run_stack("ci", &cfg)
        .await
        .unwrap();

    assert!(backend.launched().is_empty());
    assert_eq!(summary(&report.results), vec![("ghost".to_string(), false, true)]);
    let error = report.results[0].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::PluginNotFound);
    assert_eq!(error.message, "\"ghost\" plugin does not exist yet.");
    assert_eq!(report.outcome, StackOutcome::Failed);
}

#[tokio::test]
async fn unsupported_operation_becomes_a_blocking_result() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "ci",
            StackBuilder::sequential()
                .task(TaskBuilder::custom_cmd("true").function("nope").build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new();

    let report = orchestrator(&cfg, &backend)
        .run_stack("ci", &cfg)
        .await
        .unwrap();

    let error = report.results[0].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::UnsupportedOperation);
    assert_eq!(error.message, "No \"nope\" function found in custom-cmd Plugin");
    assert!(report.results[0].blocking);
    assert!(backend.launched().is_empty());
}

#[tokio::test]
async fn invalid_task_options_become_a_blocking_config_result() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_stack(
            "ci",
            StackBuilder::sequential()
                .task(TaskBuilder::new("custom-cmd").build())
                .task(TaskBuilder::custom_cmd("true").retries(-1).build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new();
    let orchestrator = orchestrator(&cfg, &backend);

    let report = orchestrator.run_stack("ci", &cfg).await.unwrap();
    assert_eq!(report.results.len(), 1);
    let error = report.results[0].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::Config);
    assert!(error.message.contains("CustomCmd config validation error"));
}

#[tokio::test]
async fn verbosity_precedence_is_task_then_stack_then_global() {
    let cfg = ConfigFileBuilder::new()
        .verbose(true)
        .with_stack(
            "quiet-stack",
            StackBuilder::sequential()
                .verbose(false)
                .task(TaskBuilder::custom_cmd("a").build())
                .task(TaskBuilder::custom_cmd("b").verbose(true).build())
                .build(),
        )
        .with_stack(
            "inherit",
            StackBuilder::sequential()
                .task(TaskBuilder::custom_cmd("c").build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new();
    let orchestrator = orchestrator(&cfg, &backend);

    let quiet = orchestrator.plan("quiet-stack", cfg.stack("quiet-stack").unwrap());
    assert!(!quiet[0].verbose);
    assert!(quiet[1].verbose);

    let inherit = orchestrator.plan("inherit", cfg.stack("inherit").unwrap());
    assert!(inherit[0].verbose);

    let unset = ConfigFileBuilder::new()
        .with_stack(
            "s",
            StackBuilder::sequential()
                .task(TaskBuilder::custom_cmd("d").build())
                .build(),
        )
        .build();
    let plan = common::orchestrator(&unset, &backend).plan("s", unset.stack("s").unwrap());
    assert!(!plan[0].verbose);

    orchestrator.run_stack("quiet-stack", &cfg).await.unwrap();
    let launched = backend.launched();
    assert!(!launched[0].verbose);
    assert!(launched[1].verbose);
}
