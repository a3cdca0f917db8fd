// src/exec/runner.rs

//! Command execution with retry and blocking policy.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::{DotboxError, Result};
use crate::types::{ErrorDetail, ExecutionResult};

use super::backend::{ExitReport, Invocation, InvocationMode, ProcessBackend, TokioProcessBackend};

/// Retry and output policy for a command, read from a task's option bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Additional attempts after the first failure.
    pub retries: u32,
    /// Whether exhausting the retries rejects (aborting a sequential chain)
    /// or resolves with `success = false`.
    pub blocking: bool,
    /// Run through the shell so redirections in the arguments are honoured.
    pub redirected_output: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            retries: 0,
            blocking: true,
            redirected_output: false,
        }
    }
}

impl ExecOptions {
    /// Read `retries` (or `max_retries`), `blocking` and `redirected_output`
    /// from an option bag, applying defaults for missing keys.
    pub fn from_options(options: &toml::Table) -> Result<Self> {
        let mut exec = ExecOptions::default();

        if let Some(value) = options.get("retries").or_else(|| options.get("max_retries")) {
            let retries = value.as_integer().ok_or_else(|| {
                DotboxError::ConfigError(format!("`retries` must be an integer (got {value})"))
            })?;
            exec.retries = u32::try_from(retries).map_err(|_| {
                DotboxError::ConfigError(format!("`retries` must be >= 0 (got {retries})"))
            })?;
        }

        if let Some(blocking) = bool_option(options, "blocking")? {
            exec.blocking = blocking;
        }
        if let Some(redirected) = bool_option(options, "redirected_output")? {
            exec.redirected_output = redirected;
        }

        Ok(exec)
    }
}

fn bool_option(options: &toml::Table, key: &str) -> Result<Option<bool>> {
    match options.get(key) {
        None => Ok(None),
        Some(value) => value.as_bool().map(Some).ok_or_else(|| {
            DotboxError::ConfigError(format!("`{key}` must be a boolean (got {value})"))
        }),
    }
}

/// Everything the runner needs to execute one command on behalf of a plugin.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    /// Identity recorded on the resulting `ExecutionResult`.
    pub plugin: String,
    pub program: String,
    pub args: Vec<String>,
    pub options: ExecOptions,
    pub verbose: bool,
    /// Shown when the program is missing from the search path.
    pub install_hints: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandRequest {
    pub fn new(
        plugin: impl Into<String>,
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            plugin: plugin.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            options: ExecOptions::default(),
            verbose: false,
            install_hints: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn install_hints(mut self, hints: &[String]) -> Self {
        self.install_hints = hints.to_vec();
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn invocation(&self) -> Invocation {
        Invocation {
            program: self.program.clone(),
            args: self.args.clone(),
            mode: if self.options.redirected_output {
                InvocationMode::Shell
            } else {
                InvocationMode::Direct
            },
            verbose: self.verbose,
            env: self.env.clone(),
        }
    }
}

/// `Ok` for a resolved outcome (success or non-blocking failure), `Err` for a
/// blocking failure.
pub type CommandOutcome = std::result::Result<ExecutionResult, ExecutionResult>;

/// Runs external commands through a [`ProcessBackend`].
///
/// Cheap to clone; every plugin instance gets its own handle.
#[derive(Clone)]
pub struct CommandRunner {
    backend: Arc<dyn ProcessBackend>,
}

impl fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRunner").finish_non_exhaustive()
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(Arc::new(TokioProcessBackend))
    }
}

impl CommandRunner {
    pub fn new(backend: Arc<dyn ProcessBackend>) -> Self {
        Self { backend }
    }

    /// Pre-flight check: is `program` on the host search path?
    pub fn is_available(&self, program: &str) -> bool {
        self.backend.locate(program)
    }

    /// Execute a command with the request's retry policy.
    ///
    /// A missing program short-circuits without consuming an attempt.
    pub async fn run(&self, request: CommandRequest) -> CommandOutcome {
        let blocking = request.options.blocking;

        if !self.backend.locate(&request.program) {
            let err = DotboxError::CommandUnavailable {
                command: request.program.clone(),
                hint: install_hint(&request.install_hints),
            };
            warn!(
                plugin = %request.plugin,
                command = %request.program,
                blocking,
                "{}",
                err
            );
            return settle(ExecutionResult::failure(
                request.plugin,
                blocking,
                ErrorDetail::from(&err),
            ));
        }

        let invocation = request.invocation();
        let command_line = invocation.command_line();
        let attempts = request.options.retries.saturating_add(1);
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            debug!(
                plugin = %request.plugin,
                command = %command_line,
                mode = ?invocation.mode,
                attempt,
                attempts,
                "executing command"
            );

            match self.attempt(&invocation).await {
                Ok(()) => {
                    info!(
                        plugin = %request.plugin,
                        command = %command_line,
                        attempt,
                        "command succeeded"
                    );
                    return Ok(ExecutionResult::success(request.plugin));
                }
                Err(reason) => {
                    debug!(
                        plugin = %request.plugin,
                        command = %command_line,
                        attempt,
                        reason = %reason,
                        "command attempt failed"
                    );
                    last_reason = reason;
                }
            }
        }

        let err = DotboxError::CommandFailed {
            command: command_line.clone(),
            reason: last_reason,
        };
        warn!(
            plugin = %request.plugin,
            command = %command_line,
            attempts,
            blocking,
            "retries exhausted: {}",
            err
        );

        settle(ExecutionResult::failure(
            request.plugin,
            blocking,
            ErrorDetail::from(&err),
        ))
    }

    /// One attempt. `Err` carries the human-readable failure reason.
    async fn attempt(&self, invocation: &Invocation) -> std::result::Result<(), String> {
        let report = self
            .backend
            .launch(invocation)
            .await
            .map_err(|e| format!("failed to launch process: {e}"))?;

        match (invocation.mode, report) {
            (InvocationMode::Direct, ExitReport::Code(0)) => Ok(()),
            (InvocationMode::Direct, ExitReport::Code(code)) => {
                Err(format!("Process exited with code {code}"))
            }
            (InvocationMode::Direct, ExitReport::Signal) => {
                Err("Process terminated by signal".to_string())
            }
            // The shell ran; what the redirected command reported is the
            // caller's artefact, not a launch failure.
            (InvocationMode::Shell, report) => {
                debug!(command = %invocation.command_line(), ?report, "shell invocation finished");
                Ok(())
            }
        }
    }
}

fn settle(result: ExecutionResult) -> CommandOutcome {
    if result.is_blocking_failure() {
        Err(result)
    } else {
        Ok(result)
    }
}

fn install_hint(hints: &[String]) -> String {
    if hints.is_empty() {
        return String::new();
    }
    format!(
        " You can install it using one of the following commands:\n\t$ {}",
        hints.join("\n\t$ ")
    )
}
