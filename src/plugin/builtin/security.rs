// src/plugin/builtin/security.rs

//! Dependency audit with nsp.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::errors::Result;
use crate::plugin::base::push_custom_args;
use crate::plugin::{Operation, Plugin, PluginBase, PluginInit};
use crate::types::Settled;

/// `--output` formats nsp understands. An empty string keeps nsp's own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum NspOutput {
    #[default]
    #[serde(rename = "")]
    Unset,
    Default,
    Summary,
    Json,
    Codeclimate,
    None,
}

impl NspOutput {
    fn as_flag_value(&self) -> Option<&'static str> {
        match self {
            NspOutput::Unset => None,
            NspOutput::Default => Some("default"),
            NspOutput::Summary => Some("summary"),
            NspOutput::Json => Some("json"),
            NspOutput::Codeclimate => Some("codeclimate"),
            NspOutput::None => Some("none"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NspOptions {
    #[serde(default)]
    output: NspOutput,
    #[serde(default)]
    custom_args: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct Nsp {
    base: PluginBase,
}

impl Nsp {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        let base =
            PluginBase::new(init).with_install_hints(&["npm i --save-dev nsp", "npm i -g nsp"]);
        Ok(Box::new(Self { base }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: NspOptions = self.base.validate("Nsp")?;
        let mut args = vec!["check".to_string()];

        if let Some(format) = options.output.as_flag_value() {
            args.extend(["--output".to_string(), format.to_string()]);
        }
        push_custom_args(&mut args, &options.custom_args);

        let request = self.base.request("nsp", args)?;
        self.base.run_single(request).await
    }
}

impl Plugin for Nsp {
    fn description(&self) -> &str {
        "Dependencies Security Check using NSP"
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}
