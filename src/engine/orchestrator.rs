// src/engine/orchestrator.rs

//! Stack execution.
//!
//! A run goes `Idle → Resolving → Running → Aggregating → Done`:
//!
//! - resolving turns each `TaskSpec` into a [`PlannedTask`], skipping tasks
//!   without a plugin id and computing effective verbosity;
//! - sequential stacks chain tasks, each one seeing the responses of every
//!   earlier task, and stop at the first rejection;
//! - parallel stacks issue every task at once and join them all, keeping
//!   one slot per task in declaration order.
//!
//! Errors raised while resolving, constructing or dispatching a plugin
//! never escape a task: they become a blocking failure result tagged with
//! the plugin id.

use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigFile, StackConfig};
use crate::errors::{DotboxError, Result};
use crate::exec::CommandRunner;
use crate::fs::FileSystem;
use crate::plugin::{PluginInit, run_plugin};
use crate::registry::PluginRegistry;
use crate::symlink::SymlinkTransaction;
use crate::types::{ConcurrencyMode, ExecutionResult, Rejection, Response, Settled};

use super::aggregate::{StackReport, aggregate};

/// Phase of a stack run, logged at `debug` on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPhase {
    Idle,
    Resolving,
    SequentialRunning,
    ParallelRunning,
    Aggregating,
    Done,
}

/// A task ready to run.
#[derive(Debug, Clone)]
pub struct PlannedTask {
    /// Position in the stack's task list (including skipped entries).
    pub index: usize,
    pub plugin: String,
    pub function: Option<String>,
    pub options: toml::Table,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct Orchestrator {
    registry: PluginRegistry,
    runner: CommandRunner,
    symlinks: SymlinkTransaction,
    global_verbose: Option<bool>,
}

impl Orchestrator {
    pub fn new(
        registry: PluginRegistry,
        runner: CommandRunner,
        symlinks: SymlinkTransaction,
        global_verbose: Option<bool>,
    ) -> Self {
        Self {
            registry,
            runner,
            symlinks,
            global_verbose,
        }
    }

    /// Discover plugins for `cfg` and wire an orchestrator around `runner`.
    pub fn from_config(cfg: &ConfigFile, fs: &dyn FileSystem, runner: CommandRunner) -> Self {
        let registry = PluginRegistry::discover(fs, &cfg.plugin_dirs, runner.clone());
        Self::new(
            registry,
            runner,
            SymlinkTransaction::new(cfg.backup_suffix.clone()),
            cfg.verbose,
        )
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Override the global verbosity (e.g. from `--verbose`).
    pub fn with_global_verbose(mut self, verbose: Option<bool>) -> Self {
        if verbose.is_some() {
            self.global_verbose = verbose;
        }
        self
    }

    /// Runnable tasks of `stack`, in declaration order.
    ///
    /// Verbosity precedence: task, then stack, then global, then `false`.
    pub fn plan(&self, stack_name: &str, stack: &StackConfig) -> Vec<PlannedTask> {
        stack
            .tasks
            .iter()
            .enumerate()
            .filter_map(|(index, task)| {
                let Some(plugin) = task.plugin_id() else {
                    warn!(
                        stack = %stack_name,
                        task = index + 1,
                        "task has no plugin identifier, skipping"
                    );
                    return None;
                };

                let verbose = task
                    .verbose
                    .or(stack.verbose)
                    .or(self.global_verbose)
                    .unwrap_or(false);

                Some(PlannedTask {
                    index,
                    plugin: plugin.to_string(),
                    function: task.function.clone(),
                    options: task.options.clone(),
                    verbose,
                })
            })
            .collect()
    }

    /// Run the stack `name` from `cfg` to completion.
    pub async fn run_stack(&self, name: &str, cfg: &ConfigFile) -> Result<StackReport> {
        let stack = cfg
            .stack(name)
            .ok_or_else(|| DotboxError::ConfigError(format!("stack '{name}' is not defined")))?;
        Ok(self.run(name, stack).await)
    }

    /// Run an already-selected stack.
    pub async fn run(&self, name: &str, stack: &StackConfig) -> StackReport {
        let mode = stack.mode();
        log_phase(name, StackPhase::Idle);

        log_phase(name, StackPhase::Resolving);
        let tasks = self.plan(name, stack);

        if tasks.is_empty() {
            info!(stack = %name, "no tasks");
            log_phase(name, StackPhase::Aggregating);
            let report = aggregate(name, mode, Ok(Vec::new()));
            log_phase(name, StackPhase::Done);
            return report;
        }

        info!(stack = %name, tasks = tasks.len(), mode = ?mode, "running stack");

        let settled = match mode {
            ConcurrencyMode::Sequential => {
                log_phase(name, StackPhase::SequentialRunning);
                self.run_sequential(&tasks).await
            }
            ConcurrencyMode::Parallel => {
                log_phase(name, StackPhase::ParallelRunning);
                self.run_parallel(&tasks).await
            }
        };

        log_phase(name, StackPhase::Aggregating);
        let report = aggregate(name, mode, settled);
        log_phase(name, StackPhase::Done);
        report
    }

    /// Chain: task k+1 starts only once task k resolved.
    async fn run_sequential(&self, tasks: &[PlannedTask]) -> Settled {
        let mut responses = Vec::new();
        for task in tasks {
            responses = self.run_task(task, responses).await?;
        }
        Ok(responses)
    }

    /// Fan out and join. Every task runs to completion; one rejected slot
    /// rejects the whole run.
    async fn run_parallel(&self, tasks: &[PlannedTask]) -> Settled {
        let settled = join_all(tasks.iter().map(|task| self.run_task(task, Vec::new()))).await;

        let mut rejected = false;
        let slots: Vec<Response> = settled
            .into_iter()
            .map(|outcome| {
                let responses = match outcome {
                    Ok(responses) => responses,
                    Err(Rejection::Responses(responses)) => {
                        rejected = true;
                        responses
                    }
                    // run_task converts errors before returning
                    Err(Rejection::Error(err)) => {
                        rejected = true;
                        vec![Response::Single(ExecutionResult::from_error("dotbox", &err))]
                    }
                };
                collapse(responses)
            })
            .collect();

        if rejected {
            Err(Rejection::Responses(slots))
        } else {
            Ok(slots)
        }
    }

    /// Construct and invoke one task's plugin.
    async fn run_task(&self, task: &PlannedTask, previous: Vec<Response>) -> Settled {
        debug!(
            plugin = %task.plugin,
            index = task.index,
            previous = previous.len(),
            "starting task"
        );

        let init = PluginInit {
            id: task.plugin.clone(),
            options: task.options.clone(),
            previous: previous.clone(),
            verbose: task.verbose,
            runner: self.runner.clone(),
            symlinks: self.symlinks.clone(),
        };

        let mut plugin = match self.registry.instantiate(&task.plugin, init) {
            Ok(plugin) => plugin,
            Err(err) => return reject_task(previous, &task.plugin, err),
        };

        match run_plugin(plugin.as_mut(), &task.plugin, task.function.as_deref()).await {
            Err(Rejection::Error(err)) => reject_task(previous, &task.plugin, err),
            settled => settled,
        }
    }
}

/// Blocking failure result for an error raised outside the command runner.
fn reject_task(mut previous: Vec<Response>, plugin: &str, err: DotboxError) -> Settled {
    error!(plugin = %plugin, error = %err, "task failed before producing a result");
    previous.push(Response::Single(ExecutionResult::from_error(plugin, &err)));
    Err(Rejection::Responses(previous))
}

/// One slot per parallel task: a lone response as is, several as a batch.
fn collapse(mut responses: Vec<Response>) -> Response {
    if responses.len() == 1 {
        responses.remove(0)
    } else {
        Response::Batch(responses)
    }
}

fn log_phase(stack: &str, phase: StackPhase) {
    debug!(stack = %stack, phase = ?phase, "stack phase");
}
