// src/plugin/builtin/lint.rs

//! Linters: eslint, jshint and xo.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use serde::Deserialize;

use crate::errors::Result;
use crate::plugin::base::{ensure_file, push_custom_args};
use crate::plugin::{Operation, Plugin, PluginBase, PluginInit};
use crate::types::Settled;

fn current_dir_target() -> Vec<String> {
    vec![".".to_string()]
}

#[derive(Debug, Deserialize)]
struct EslintOptions {
    #[serde(default)]
    eslintrc_path: String,
    #[serde(default)]
    checkstyle_export: bool,
    #[serde(default = "EslintOptions::default_export_path")]
    checkstyle_export_path: PathBuf,
    #[serde(default = "current_dir_target")]
    targets: Vec<String>,
    #[serde(default)]
    custom_args: Option<Vec<String>>,
}

impl EslintOptions {
    fn default_export_path() -> PathBuf {
        PathBuf::from("artifacts/eslint/eslint.xml")
    }
}

#[derive(Debug)]
pub struct Eslint {
    base: PluginBase,
}

impl Eslint {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        let base = PluginBase::new(init)
            .with_install_hints(&["npm i --save-dev eslint", "npm i -g eslint"]);
        Ok(Box::new(Self { base }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: EslintOptions = self.base.validate("Eslint")?;
        let mut exec = self.base.exec_options()?;
        let mut args = Vec::new();

        if !options.eslintrc_path.is_empty() {
            args.push("-c".to_string());
            args.push(options.eslintrc_path.clone());
        }
        if options.checkstyle_export {
            args.extend(["-f".to_string(), "checkstyle".to_string()]);
        }
        push_custom_args(&mut args, &options.custom_args);
        args.extend(options.targets.iter().cloned());

        if options.checkstyle_export {
            args.push(">".to_string());
            args.push(options.checkstyle_export_path.display().to_string());
            exec.redirected_output = true;
            ensure_file(&options.checkstyle_export_path).await?;
        }

        let request = self.base.default_request("eslint", args).options(exec);
        self.base.run_single(request).await
    }
}

impl Plugin for Eslint {
    fn description(&self) -> &str {
        "EsLint checkstyle"
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}

#[derive(Debug, Deserialize)]
struct JshintOptions {
    #[serde(default)]
    checkstyle_export: bool,
    #[serde(default = "JshintOptions::default_export_path")]
    checkstyle_export_path: PathBuf,
    #[serde(default = "current_dir_target")]
    targets: Vec<String>,
    #[serde(default)]
    custom_args: Option<Vec<String>>,
}

impl JshintOptions {
    fn default_export_path() -> PathBuf {
        PathBuf::from("artifacts/jshint/jshint.xml")
    }
}

#[derive(Debug)]
pub struct Jshint {
    base: PluginBase,
}

impl Jshint {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        let base = PluginBase::new(init)
            .with_install_hints(&["npm i --save-dev jshint", "npm i -g jshint"]);
        Ok(Box::new(Self { base }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: JshintOptions = self.base.validate("Jshint")?;
        let mut exec = self.base.exec_options()?;
        let mut args = Vec::new();

        if options.checkstyle_export {
            args.push("--reporter=checkstyle".to_string());
        }
        push_custom_args(&mut args, &options.custom_args);
        args.extend(options.targets.iter().cloned());

        if options.checkstyle_export {
            args.push(">".to_string());
            args.push(options.checkstyle_export_path.display().to_string());
            exec.redirected_output = true;
            ensure_file(&options.checkstyle_export_path).await?;
        }

        let request = self.base.default_request("jshint", args).options(exec);
        self.base.run_single(request).await
    }
}

impl Plugin for Jshint {
    fn description(&self) -> &str {
        "JSHint checkstyle"
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}

#[derive(Debug, Deserialize)]
struct XoOptions {
    #[serde(default)]
    targets: Vec<String>,
    #[serde(default)]
    custom_args: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct Xo {
    base: PluginBase,
}

impl Xo {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        let base =
            PluginBase::new(init).with_install_hints(&["npm i --save-dev xo", "npm i -g xo"]);
        Ok(Box::new(Self { base }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: XoOptions = self.base.validate("Xo")?;
        let mut args = Vec::new();
        push_custom_args(&mut args, &options.custom_args);
        args.extend(options.targets.iter().filter(|t| !t.is_empty()).cloned());

        let request = self.base.request("xo", args)?;
        self.base.run_single(request).await
    }
}

impl Plugin for Xo {
    fn description(&self) -> &str {
        "EsLint XO checkstyle"
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}
