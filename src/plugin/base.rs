// src/plugin/base.rs

//! State and helpers shared by every plugin implementation.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::errors::{DotboxError, Result};
use crate::exec::{CommandOutcome, CommandRequest, CommandRunner, ExecOptions};
use crate::symlink::SymlinkTransaction;
use crate::types::{ExecutionResult, Rejection, Response, Settled};

/// What a plugin factory receives.
#[derive(Debug, Clone)]
pub struct PluginInit {
    pub id: String,
    pub options: toml::Table,
    /// Responses of every earlier task in the same sequential chain.
    pub previous: Vec<Response>,
    pub verbose: bool,
    pub runner: CommandRunner,
    pub symlinks: SymlinkTransaction,
}

/// Common plugin state: identity, option bag, inherited responses and the
/// side-effect handles.
#[derive(Debug)]
pub struct PluginBase {
    pub id: String,
    pub options: toml::Table,
    pub verbose: bool,
    pub runner: CommandRunner,
    pub symlinks: SymlinkTransaction,
    previous: Vec<Response>,
    install_hints: Vec<String>,
}

impl PluginBase {
    pub fn new(init: PluginInit) -> Self {
        Self {
            id: init.id,
            options: init.options,
            verbose: init.verbose,
            runner: init.runner,
            symlinks: init.symlinks,
            previous: init.previous,
            install_hints: Vec::new(),
        }
    }

    pub fn previous(&self) -> &[Response] {
        &self.previous
    }

    /// Commands offered to the user when the plugin's tool is missing.
    pub fn with_install_hints(mut self, hints: &[&str]) -> Self {
        self.install_hints = hints.iter().map(|h| h.to_string()).collect();
        self
    }

    /// Deserialize the option bag into the plugin's typed options, applying
    /// serde defaults. Unknown keys are ignored.
    pub fn validate<T: DeserializeOwned>(&self, plugin_name: &str) -> Result<T> {
        toml::Value::Table(self.options.clone())
            .try_into()
            .map_err(|e: toml::de::Error| {
                DotboxError::ConfigError(format!(
                    "{plugin_name} config validation error: {}",
                    e.to_string().trim()
                ))
            })
    }

    pub fn exec_options(&self) -> Result<ExecOptions> {
        ExecOptions::from_options(&self.options)
    }

    /// A request for `program`, carrying this task's retry policy.
    pub fn request(
        &self,
        program: &str,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<CommandRequest> {
        Ok(self.default_request(program, args).options(self.exec_options()?))
    }

    /// A request for the plugin's own program under the default policy
    /// rather than the task's.
    pub fn default_request(
        &self,
        program: &str,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> CommandRequest {
        CommandRequest::new(self.id.clone(), program, args)
            .verbose(self.verbose)
            .install_hints(&self.install_hints)
    }

    /// A request for a helper command (e.g. `npm prune`) run on the
    /// plugin's behalf. The plugin's install hints do not apply to it.
    pub fn helper_request(
        &self,
        program: &str,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> CommandRequest {
        CommandRequest::new(self.id.clone(), program, args).verbose(self.verbose)
    }

    /// Run a single command and settle the plugin with its result.
    pub async fn run_single(&mut self, request: CommandRequest) -> Settled {
        let outcome = self.runner.run(request).await;
        self.settle_outcome(outcome)
    }

    pub fn settle_outcome(&mut self, outcome: CommandOutcome) -> Settled {
        match outcome {
            Ok(result) => Ok(self.append(Response::Single(result))),
            Err(result) => Err(Rejection::Responses(self.append(Response::Single(result)))),
        }
    }

    /// Settle with a list of step results: rejected if any is a blocking
    /// failure, resolved otherwise.
    pub fn settle_results(&mut self, results: Vec<ExecutionResult>) -> Settled {
        let blocking = results.iter().any(ExecutionResult::is_blocking_failure);
        let sequence = self.append(Response::from_results(results));
        if blocking {
            Err(Rejection::Responses(sequence))
        } else {
            Ok(sequence)
        }
    }

    /// Settle with a batch of step responses.
    pub fn settle_steps(&mut self, steps: Vec<Response>, rejected: bool) -> Settled {
        let sequence = self.append(Response::Batch(steps));
        if rejected {
            Err(Rejection::Responses(sequence))
        } else {
            Ok(sequence)
        }
    }

    /// The inherited sequence extended with this plugin's response.
    fn append(&mut self, response: Response) -> Vec<Response> {
        let mut sequence = std::mem::take(&mut self.previous);
        sequence.push(response);
        sequence
    }
}

/// Create an empty file (and its parent directories) unless it exists, so a
/// tool redirected into it always has a target.
pub async fn ensure_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    Ok(())
}

/// Append `custom_args` when present.
pub fn push_custom_args(args: &mut Vec<String>, custom: &Option<Vec<String>>) {
    if let Some(custom) = custom {
        args.extend(custom.iter().cloned());
    }
}
