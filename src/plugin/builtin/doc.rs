// src/plugin/builtin/doc.rs

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::errors::Result;
use crate::plugin::base::push_custom_args;
use crate::plugin::{Operation, Plugin, PluginBase, PluginInit};
use crate::types::Settled;

#[derive(Debug, Deserialize)]
struct JsdocOptions {
    #[serde(default = "JsdocOptions::default_output_dir")]
    output_dir: String,
    #[serde(default)]
    config_file_path: String,
    #[serde(default)]
    template_path: String,
    #[serde(default)]
    package_path: String,
    #[serde(default)]
    readme_path: String,
    #[serde(default = "JsdocOptions::default_recurse")]
    recurse: bool,
    #[serde(default = "JsdocOptions::default_targets")]
    targets: Vec<String>,
    #[serde(default)]
    custom_args: Option<Vec<String>>,
}

impl JsdocOptions {
    fn default_output_dir() -> String {
        "artifacts/jsdoc".to_string()
    }

    fn default_recurse() -> bool {
        true
    }

    fn default_targets() -> Vec<String> {
        vec![".".to_string()]
    }

    fn args(&self) -> Vec<String> {
        let mut args = Vec::new();

        push_valued(&mut args, "-d", &self.output_dir);
        if self.recurse {
            args.push("-r".to_string());
        }
        push_valued(&mut args, "-c", &self.config_file_path);
        push_valued(&mut args, "-t", &self.template_path);
        push_valued(&mut args, "-P", &self.package_path);
        push_valued(&mut args, "-R", &self.readme_path);

        push_custom_args(&mut args, &self.custom_args);
        args.extend(self.targets.iter().cloned());
        args
    }
}

/// `flag value`, skipped when the value is empty.
fn push_valued(args: &mut Vec<String>, flag: &str, value: &str) {
    if !value.is_empty() {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

/// API documentation generation with jsdoc.
#[derive(Debug)]
pub struct Jsdoc {
    base: PluginBase,
}

impl Jsdoc {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        let base = PluginBase::new(init)
            .with_install_hints(&["npm i --save-dev jsdoc", "npm i -g jsdoc"]);
        Ok(Box::new(Self { base }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: JsdocOptions = self.base.validate("Jsdoc")?;
        let request = self.base.request("jsdoc", options.args())?;
        self.base.run_single(request).await
    }
}

impl Plugin for Jsdoc {
    fn description(&self) -> &str {
        "JsDoc Generation"
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}
