// tests/process_backend.rs
#![cfg(unix)]

mod common;
use crate::common::builders::{ConfigFileBuilder, StackBuilder, TaskBuilder};
use crate::common::{init_tracing, with_timeout};

use std::fs;

use dotbox::config::{ConfigFile, TaskSpec};
use dotbox::engine::{Orchestrator, StackOutcome, StackReport};
use dotbox::exec::CommandRunner;
use dotbox::exec::probe::find_executable;
use dotbox::fs::mock::MockFileSystem;
use dotbox::types::ErrorKind;

fn single_task(task: TaskSpec) -> ConfigFile {
    ConfigFileBuilder::new()
        .with_stack("main", StackBuilder::sequential().task(task).build())
        .build()
}

async fn run_real(cfg: &ConfigFile) -> StackReport {
    let orchestrator =
        Orchestrator::from_config(cfg, &MockFileSystem::new(), CommandRunner::default());
    with_timeout(orchestrator.run_stack("main", cfg))
        .await
        .unwrap()
}

#[test]
fn path_lookup_finds_the_shell() {
    let sh = find_executable("sh").expect("sh should be on PATH");
    assert!(sh.is_absolute());
    assert!(find_executable("dotbox-definitely-missing-xyz").is_none());
}

#[tokio::test]
async fn true_exits_zero() {
    init_tracing();
    let cfg = single_task(TaskBuilder::custom_cmd("true").build());

    let report = run_real(&cfg).await;

    assert_eq!(report.outcome, StackOutcome::Succeeded);
    assert_eq!(report.outcome.exit_code(), 0);
    assert_eq!(report.results.len(), 1);
    assert!(report.results[0].success);
}

#[tokio::test]
async fn false_exits_one() {
    init_tracing();
    let cfg = single_task(TaskBuilder::custom_cmd("false").build());

    let report = run_real(&cfg).await;

    assert_eq!(report.outcome, StackOutcome::Failed);
    assert_eq!(report.outcome.exit_code(), 1);
    let error = report.results[0].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::CommandFailed);
}

#[tokio::test]
async fn quiet_output_is_drained() {
    init_tracing();
    // Enough output to fill a pipe if nobody read it.
    let cfg = single_task(TaskBuilder::custom_cmd("seq 1 100000").verbose(false).build());

    let report = run_real(&cfg).await;

    assert_eq!(report.outcome, StackOutcome::Succeeded);
}

#[tokio::test]
async fn redirected_output_goes_through_the_shell() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let out_arg = out.to_string_lossy().into_owned();

    let cfg = single_task(
        TaskBuilder::custom_cmd("echo")
            .string_list("custom_args", &["hi", ">", &out_arg])
            .option("redirected_output", true)
            .build(),
    );

    let report = run_real(&cfg).await;

    assert_eq!(report.outcome, StackOutcome::Succeeded);
    assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
}

#[tokio::test]
async fn missing_program_is_unavailable() {
    init_tracing();
    let cfg = single_task(TaskBuilder::custom_cmd("dotbox-definitely-missing-xyz").build());

    let report = run_real(&cfg).await;

    assert_eq!(report.outcome, StackOutcome::Failed);
    let error = report.results[0].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::CommandUnavailable);
    assert!(
        error
            .message
            .starts_with("dotbox-definitely-missing-xyz command not found.")
    );
}
