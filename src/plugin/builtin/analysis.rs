// src/plugin/builtin/analysis.rs

//! Source complexity reports with plato.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use serde::Deserialize;
use tracing::warn;

use crate::errors::Result;
use crate::plugin::base::push_custom_args;
use crate::plugin::{Operation, Plugin, PluginBase, PluginInit};
use crate::types::Settled;

/// Manifest read for the report title when none is configured.
pub const PACKAGE_JSON_PATH: &str = "./package.json";

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct PlatoOptions {
    #[serde(default = "PlatoOptions::default_output_dir")]
    output_dir: String,
    #[serde(default)]
    eslintrc_path: String,
    #[serde(default)]
    jshintrc_path: String,
    #[serde(default)]
    title: String,
    #[serde(default = "default_true")]
    auto_title: bool,
    #[serde(default = "default_true")]
    recurse: bool,
    #[serde(default = "PlatoOptions::default_targets")]
    targets: Vec<String>,
    #[serde(default)]
    custom_args: Option<Vec<String>>,
}

impl PlatoOptions {
    fn default_output_dir() -> String {
        "artifacts/plato".to_string()
    }

    fn default_targets() -> Vec<String> {
        vec![".".to_string()]
    }
}

#[derive(Debug)]
pub struct Plato {
    base: PluginBase,
}

impl Plato {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        let base = PluginBase::new(init)
            .with_install_hints(&["npm i --save-dev plato", "npm i -g plato"]);
        Ok(Box::new(Self { base }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: PlatoOptions = self.base.validate("Plato")?;
        let mut args = vec!["-d".to_string(), options.output_dir.clone()];

        if options.recurse {
            args.push("-r".to_string());
        }

        if !options.title.is_empty() {
            args.extend(["-t".to_string(), options.title.clone()]);
        } else if options.auto_title {
            if let Some(name) = package_name(Path::new(PACKAGE_JSON_PATH)).await {
                args.extend(["-t".to_string(), name]);
            }
        }

        if !options.eslintrc_path.is_empty() {
            args.extend(["-e".to_string(), options.eslintrc_path.clone()]);
        }
        if !options.jshintrc_path.is_empty() {
            args.extend(["-l".to_string(), options.jshintrc_path.clone()]);
        }

        push_custom_args(&mut args, &options.custom_args);
        args.extend(options.targets.iter().cloned());

        let request = self.base.request("plato", args)?;
        self.base.run_single(request).await
    }
}

/// The `name` field of a package manifest. Unreadable or malformed manifests
/// are reported and ignored.
async fn package_name(path: &Path) -> Option<String> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read package manifest");
            return None;
        }
    };

    let manifest: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot parse package manifest");
            return None;
        }
    };

    manifest
        .get("name")
        .and_then(serde_json::Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

impl Plugin for Plato {
    fn description(&self) -> &str {
        "Visualize JavaScript source complexity with plato."
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}
