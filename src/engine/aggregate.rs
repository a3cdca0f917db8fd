// src/engine/aggregate.rs

use std::fmt;

use tracing::{error, info, warn};

use crate::types::{ConcurrencyMode, ExecutionResult, Rejection, Response, Settled, flatten};

/// Classification of one flattened result entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    Success,
    NonBlockingFailure,
    BlockingFailure,
}

impl EntryClass {
    pub fn of(result: &ExecutionResult) -> Self {
        match (result.success, result.blocking) {
            (true, _) => EntryClass::Success,
            (false, false) => EntryClass::NonBlockingFailure,
            (false, true) => EntryClass::BlockingFailure,
        }
    }
}

/// Process-level outcome of one stack run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOutcome {
    /// The stack had no runnable task; nothing was invoked.
    NoTasks,
    Succeeded,
    SucceededWithNonBlockingErrors,
    Failed,
}

impl StackOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            StackOutcome::Failed => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for StackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StackOutcome::NoTasks => "no tasks",
            StackOutcome::Succeeded => "succeeded",
            StackOutcome::SucceededWithNonBlockingErrors => "succeeded with non-blocking errors",
            StackOutcome::Failed => "failed",
        };
        f.write_str(text)
    }
}

/// Everything known about a finished stack run.
#[derive(Debug, Clone)]
pub struct StackReport {
    pub stack: String,
    pub mode: ConcurrencyMode,
    /// Responses as settled. In parallel mode there is one slot per task,
    /// in declaration order.
    pub slots: Vec<Response>,
    /// `slots` flattened depth-first.
    pub results: Vec<ExecutionResult>,
    /// Whether the run as a whole rejected.
    pub rejected: bool,
    pub outcome: StackOutcome,
}

impl StackReport {
    pub fn count(&self, class: EntryClass) -> usize {
        self.results.iter().filter(|r| EntryClass::of(r) == class).count()
    }
}

/// Flatten, classify and log a settled stack run.
pub fn aggregate(stack: &str, mode: ConcurrencyMode, settled: Settled) -> StackReport {
    let (slots, rejected) = match settled {
        Ok(slots) => (slots, false),
        Err(Rejection::Responses(slots)) => (slots, true),
        Err(Rejection::Error(err)) => {
            let result = ExecutionResult::from_error(stack, &err);
            (vec![Response::Single(result)], true)
        }
    };

    let results = flatten(&slots);
    let mut any_failure = false;
    let mut any_blocking = false;

    for result in &results {
        match EntryClass::of(result) {
            EntryClass::Success => {
                info!(
                    plugin = %result.plugin,
                    "Plugin \"{}\" successfully terminated.",
                    result.plugin
                );
            }
            EntryClass::NonBlockingFailure => {
                any_failure = true;
                warn!(
                    plugin = %result.plugin,
                    error = %describe(result),
                    "Plugin \"{}\" terminated with a non-blocking error.",
                    result.plugin
                );
            }
            EntryClass::BlockingFailure => {
                any_failure = true;
                any_blocking = true;
                error!(
                    plugin = %result.plugin,
                    error = %describe(result),
                    "Plugin \"{}\" failed.",
                    result.plugin
                );
            }
        }
    }

    let outcome = if rejected || any_blocking {
        StackOutcome::Failed
    } else if results.is_empty() {
        StackOutcome::NoTasks
    } else if any_failure {
        StackOutcome::SucceededWithNonBlockingErrors
    } else {
        StackOutcome::Succeeded
    };

    info!(
        stack = %stack,
        mode = ?mode,
        entries = results.len(),
        outcome = %outcome,
        "stack finished"
    );

    StackReport {
        stack: stack.to_string(),
        mode,
        slots,
        results,
        rejected,
        outcome,
    }
}

fn describe(result: &ExecutionResult) -> String {
    result
        .error
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default()
}
