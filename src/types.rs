// src/types.rs

//! Shared result types flowing between plugins, the command runner and the
//! orchestrator.

use std::fmt;

use serde::Deserialize;

use crate::errors::DotboxError;

/// How the tasks of a stack are scheduled.
///
/// - `Sequential`: tasks form a chain; each one sees the responses of every
///   earlier task and a blocking failure stops the chain.
/// - `Parallel`: every task is issued at once and joined at a barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    #[default]
    Sequential,
    Parallel,
}

impl ConcurrencyMode {
    /// Map the config file's `async = true|false` flag.
    pub fn from_async_flag(is_async: bool) -> Self {
        if is_async {
            ConcurrencyMode::Parallel
        } else {
            ConcurrencyMode::Sequential
        }
    }
}

/// Category of a failure, mirroring [`DotboxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    PluginNotFound,
    UnsupportedOperation,
    CommandUnavailable,
    CommandFailed,
    Symlink,
    Internal,
}

/// Human-readable description of a failed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
    /// Underlying cause, when there is one (e.g. an IO error).
    pub details: Option<String>,
}

impl ErrorDetail {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }
}

impl From<&DotboxError> for ErrorDetail {
    fn from(err: &DotboxError) -> Self {
        let kind = match err {
            DotboxError::ConfigError(_) | DotboxError::TomlError(_) => ErrorKind::Config,
            DotboxError::PluginNotFound(_) => ErrorKind::PluginNotFound,
            DotboxError::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            DotboxError::CommandUnavailable { .. } => ErrorKind::CommandUnavailable,
            DotboxError::CommandFailed { .. } => ErrorKind::CommandFailed,
            DotboxError::SymlinkError { .. } => ErrorKind::Symlink,
            DotboxError::IoError(_) | DotboxError::Other(_) => ErrorKind::Internal,
        };

        let details = match err {
            DotboxError::SymlinkError {
                source: Some(source),
                ..
            } => Some(source.to_string()),
            _ => None,
        };

        Self {
            kind,
            message: err.to_string(),
            details,
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{} ({details})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Outcome of one step of work: a command invocation, a symlink swap, or a
/// task that failed before it could do anything.
///
/// Never mutated once created; sequences of results only grow by appending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    /// Plugin identity, possibly decorated (e.g. `symlink-resolver (Resolving a.link)`).
    pub plugin: String,
    /// Set for failures raised under a blocking policy.
    pub blocking: bool,
    pub error: Option<ErrorDetail>,
}

impl ExecutionResult {
    pub fn success(plugin: impl Into<String>) -> Self {
        Self {
            success: true,
            plugin: plugin.into(),
            blocking: false,
            error: None,
        }
    }

    pub fn failure(plugin: impl Into<String>, blocking: bool, error: ErrorDetail) -> Self {
        Self {
            success: false,
            plugin: plugin.into(),
            blocking,
            error: Some(error),
        }
    }

    /// Blocking failure built from a typed error.
    pub fn from_error(plugin: impl Into<String>, err: &DotboxError) -> Self {
        Self::failure(plugin, true, ErrorDetail::from(err))
    }

    pub fn is_blocking_failure(&self) -> bool {
        !self.success && self.blocking
    }
}

/// A plugin's contribution to the response sequence.
///
/// Multi-step plugins contribute a `Batch` holding one entry per step; the
/// aggregation step flattens batches in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Single(ExecutionResult),
    Batch(Vec<Response>),
}

impl Response {
    /// Wrap a list of results: a single entry stays single, anything else
    /// becomes a batch.
    pub fn from_results(mut results: Vec<ExecutionResult>) -> Self {
        if results.len() == 1 {
            Response::Single(results.remove(0))
        } else {
            Response::Batch(results.into_iter().map(Response::Single).collect())
        }
    }

    /// Depth-first, order-preserving flattening.
    pub fn flatten_into(&self, out: &mut Vec<ExecutionResult>) {
        match self {
            Response::Single(result) => out.push(result.clone()),
            Response::Batch(inner) => {
                for response in inner {
                    response.flatten_into(out);
                }
            }
        }
    }

    pub fn flattened(&self) -> Vec<ExecutionResult> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    pub fn has_blocking_failure(&self) -> bool {
        match self {
            Response::Single(result) => result.is_blocking_failure(),
            Response::Batch(inner) => inner.iter().any(Response::has_blocking_failure),
        }
    }
}

impl From<ExecutionResult> for Response {
    fn from(result: ExecutionResult) -> Self {
        Response::Single(result)
    }
}

/// Flatten a whole response sequence.
pub fn flatten(responses: &[Response]) -> Vec<ExecutionResult> {
    let mut out = Vec::new();
    for response in responses {
        response.flatten_into(&mut out);
    }
    out
}

/// Why a plugin invocation rejected.
#[derive(Debug)]
pub enum Rejection {
    /// The response sequence so far, ending in the blocking failure.
    Responses(Vec<Response>),
    /// A typed error raised before any result was produced. The orchestrator
    /// turns it into a blocking failure result tagged with the plugin id.
    Error(DotboxError),
}

impl From<DotboxError> for Rejection {
    fn from(err: DotboxError) -> Self {
        Rejection::Error(err)
    }
}

/// Settled state of a plugin invocation: resolved with the extended response
/// sequence, or rejected.
pub type Settled = std::result::Result<Vec<Response>, Rejection>;
