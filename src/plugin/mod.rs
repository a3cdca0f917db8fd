// src/plugin/mod.rs

//! Plugin contract.
//!
//! A plugin is a unit of work bound to its options at construction time. It
//! exposes a small, fixed set of [`Operation`]s; the task's `function` key
//! selects one (`default` when omitted). Each invocation receives the
//! responses of earlier tasks in the chain and settles with that sequence
//! extended by its own response(s).
//!
//! - [`base`] holds the state and helpers shared by implementations.
//! - [`builtin`] is the catalogue of plugins shipped with dotbox.
//! - [`external`] runs plugins provided as standalone executables.

pub mod base;
pub mod builtin;
pub mod external;
pub mod operation;

use std::future::Future;
use std::pin::Pin;

use tracing::info;

use crate::errors::{DotboxError, Result};
use crate::types::Settled;

pub use base::{PluginBase, PluginInit};
pub use operation::Operation;

/// Builds a plugin instance from its options.
pub type PluginFactory = fn(PluginInit) -> Result<Box<dyn Plugin>>;

pub trait Plugin: Send {
    /// One-line description shown when the plugin starts.
    fn description(&self) -> &str;

    /// Operations this plugin implements.
    fn operations(&self) -> &'static [Operation] {
        &[Operation::Default]
    }

    /// Run an operation previously checked against [`Plugin::operations`].
    fn execute(
        &mut self,
        operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>>;
}

/// Pick the requested operation (default when `None`) or fail with
/// `UnsupportedOperation`.
pub fn select_operation(
    plugin: &dyn Plugin,
    plugin_id: &str,
    requested: Option<&str>,
) -> Result<Operation> {
    let name = requested.unwrap_or(Operation::Default.as_str());

    let unsupported = || DotboxError::UnsupportedOperation {
        plugin: plugin_id.to_string(),
        operation: name.to_string(),
    };

    let operation: Operation = name.parse().map_err(|_| unsupported())?;
    if !plugin.operations().contains(&operation) {
        return Err(unsupported());
    }
    Ok(operation)
}

/// Dispatch the requested operation on a constructed plugin.
pub async fn run_plugin(
    plugin: &mut dyn Plugin,
    plugin_id: &str,
    requested: Option<&str>,
) -> Settled {
    let operation = select_operation(plugin, plugin_id, requested)?;

    info!(
        plugin = %plugin_id,
        operation = %operation,
        "Running: {} (\"{}\" function)",
        plugin.description(),
        operation
    );

    plugin.execute(operation).await
}
