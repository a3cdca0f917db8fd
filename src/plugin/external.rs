// src/plugin/external.rs

//! Plugins shipped as standalone executables.
//!
//! The executable receives the operation name as its only argument. The task
//! identity and option bag travel through the environment:
//!
//! - `DOTBOX_PLUGIN`: the plugin id;
//! - `DOTBOX_OPTIONS`: the option bag serialised as TOML.
//!
//! The executable decides which operations it understands; a non-zero exit
//! is a failure under the task's retry policy.

use std::future::Future;
use std::pin::Pin;

use crate::errors::DotboxError;
use crate::plugin::{Operation, Plugin, PluginBase, PluginInit};
use crate::types::Settled;

pub const PLUGIN_ENV: &str = "DOTBOX_PLUGIN";
pub const OPTIONS_ENV: &str = "DOTBOX_OPTIONS";

#[derive(Debug)]
pub struct ExternalPlugin {
    base: PluginBase,
    program: String,
    description: String,
}

impl ExternalPlugin {
    pub fn new(init: PluginInit, program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            description: format!("External plugin {program}"),
            base: PluginBase::new(init),
            program,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&mut self, operation: Operation) -> Settled {
        let options = toml::to_string(&self.base.options).map_err(|e| {
            DotboxError::ConfigError(format!(
                "cannot serialise options of plugin '{}': {e}",
                self.base.id
            ))
        })?;

        let mut exec = self.base.exec_options()?;
        exec.redirected_output = false;

        let request = self
            .base
            .default_request(&self.program, [operation.as_str()])
            .options(exec)
            .env(PLUGIN_ENV, self.base.id.clone())
            .env(OPTIONS_ENV, options);
        self.base.run_single(request).await
    }
}

impl Plugin for ExternalPlugin {
    fn description(&self) -> &str {
        &self.description
    }

    fn operations(&self) -> &'static [Operation] {
        Operation::ALL
    }

    fn execute(
        &mut self,
        operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run(operation))
    }
}
