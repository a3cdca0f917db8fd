// tests/aggregate.rs

use dotbox::engine::{EntryClass, StackOutcome, aggregate};
use dotbox::errors::DotboxError;
use dotbox::types::{
    ConcurrencyMode, ErrorDetail, ErrorKind, ExecutionResult, Rejection, Response, flatten,
};

fn ok(name: &str) -> ExecutionResult {
    ExecutionResult::success(name)
}

fn soft_fail(name: &str) -> ExecutionResult {
    ExecutionResult::failure(name, false, ErrorDetail::new(ErrorKind::CommandFailed, "boom"))
}

fn hard_fail(name: &str) -> ExecutionResult {
    ExecutionResult::failure(name, true, ErrorDetail::new(ErrorKind::CommandFailed, "boom"))
}

fn names(results: &[ExecutionResult]) -> Vec<&str> {
    results.iter().map(|r| r.plugin.as_str()).collect()
}

#[test]
fn nested_batches_flatten_depth_first_in_order() {
    let responses = vec![
        Response::from(ok("a")),
        Response::Batch(vec![
            Response::from(ok("b1")),
            Response::Batch(vec![Response::from(ok("b2a")), Response::from(ok("b2b"))]),
            Response::from(ok("b3")),
        ]),
        Response::Batch(vec![]),
        Response::from(ok("c")),
    ];

    assert_eq!(names(&flatten(&responses)), vec!["a", "b1", "b2a", "b2b", "b3", "c"]);
    assert_eq!(names(&responses[1].flattened()), vec!["b1", "b2a", "b2b", "b3"]);
}

#[test]
fn from_results_keeps_single_results_unwrapped() {
    assert_eq!(Response::from_results(vec![ok("x")]), Response::Single(ok("x")));
    assert!(matches!(
        Response::from_results(vec![ok("x"), ok("y")]),
        Response::Batch(inner) if inner.len() == 2
    ));
}

#[test]
fn entries_are_classified() {
    assert_eq!(EntryClass::of(&ok("a")), EntryClass::Success);
    assert_eq!(EntryClass::of(&soft_fail("a")), EntryClass::NonBlockingFailure);
    assert_eq!(EntryClass::of(&hard_fail("a")), EntryClass::BlockingFailure);
}

#[test]
fn outcome_follows_the_worst_entry() {
    let seq = ConcurrencyMode::Sequential;

    let report = aggregate("s", seq, Ok(vec![]));
    assert_eq!(report.outcome, StackOutcome::NoTasks);

    let report = aggregate("s", seq, Ok(vec![ok("a").into(), ok("b").into()]));
    assert_eq!(report.outcome, StackOutcome::Succeeded);

    let report = aggregate(
        "s",
        seq,
        Ok(vec![Response::Batch(vec![ok("a").into(), soft_fail("b").into()])]),
    );
    assert_eq!(report.outcome, StackOutcome::SucceededWithNonBlockingErrors);
    assert_eq!(report.outcome.exit_code(), 0);

    let report = aggregate(
        "s",
        seq,
        Err(Rejection::Responses(vec![ok("a").into(), hard_fail("b").into()])),
    );
    assert_eq!(report.outcome, StackOutcome::Failed);
    assert_eq!(report.count(EntryClass::BlockingFailure), 1);
    assert_eq!(report.outcome.exit_code(), 1);
}

#[test]
fn a_bare_error_rejection_becomes_a_blocking_entry() {
    let report = aggregate(
        "deploy",
        ConcurrencyMode::Parallel,
        Err(Rejection::Error(DotboxError::PluginNotFound("x".into()))),
    );

    assert_eq!(report.results.len(), 1);
    assert!(report.results[0].is_blocking_failure());
    assert_eq!(report.outcome, StackOutcome::Failed);
}

#[test]
fn error_details_mirror_the_taxonomy() {
    let err = DotboxError::symlink_io(
        "a.link",
        "An error occurred when resolving symlink",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    let detail = ErrorDetail::from(&err);

    assert_eq!(detail.kind, ErrorKind::Symlink);
    assert_eq!(detail.details.as_deref(), Some("denied"));
    assert_eq!(detail.to_string(), "An error occurred when resolving symlink (denied)");
}
