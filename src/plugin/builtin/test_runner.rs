// src/plugin/builtin/test_runner.rs

//! Mocha test runs, optionally under nyc coverage, plus the `jenkins`
//! operation backed by jenkins-mocha.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::errors::{DotboxError, Result};
use crate::plugin::base::push_custom_args;
use crate::plugin::{Operation, Plugin, PluginBase, PluginInit};
use crate::types::Settled;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct MochaOptions {
    #[serde(default)]
    use_nyc: bool,
    #[serde(default)]
    nyc_reporters: Vec<String>,
    #[serde(default)]
    nyc_custom_args: Vec<String>,
    #[serde(default = "default_true")]
    colors: bool,
    #[serde(default = "default_true")]
    recursive: bool,
    /// Milliseconds; 0 keeps mocha's own default.
    #[serde(default)]
    timeout: u64,
    #[serde(default)]
    targets: Vec<String>,
    #[serde(default)]
    custom_args: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct JenkinsOptions {
    #[serde(flatten)]
    common: MochaOptions,
    #[serde(default = "default_true")]
    cobertura: bool,
    #[serde(default)]
    no_coverage: bool,
}

#[derive(Debug)]
pub struct Mocha {
    base: PluginBase,
}

impl Mocha {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        Ok(Box::new(Self {
            base: PluginBase::new(init),
        }))
    }

    /// Program and argument list for `runner`. Under nyc the runner becomes
    /// nyc's first positional argument and must itself be installed.
    fn command_line(&self, runner: &str, options: &MochaOptions) -> Result<(String, Vec<String>)> {
        let mut program = runner.to_string();
        let mut args = Vec::new();

        if options.use_nyc {
            args.extend(options.nyc_reporters.iter().map(|r| format!("--reporter={r}")));
            args.extend(options.nyc_custom_args.iter().cloned());
            args.push(runner.to_string());

            if !self.base.runner.is_available(runner) {
                return Err(DotboxError::CommandUnavailable {
                    command: runner.to_string(),
                    hint: String::new(),
                });
            }
            program = "nyc".to_string();
        }

        if options.colors {
            args.push("--colors".to_string());
        }
        if options.recursive {
            args.push("--recursive".to_string());
        }
        if options.timeout > 0 {
            args.extend(["--timeout".to_string(), options.timeout.to_string()]);
        }

        push_custom_args(&mut args, &options.custom_args);
        args.extend(options.targets.iter().cloned());
        Ok((program, args))
    }

    async fn run_default(&mut self) -> Settled {
        let options: MochaOptions = self.base.validate("Mocha")?;
        let (program, args) = self.command_line("mocha", &options)?;

        let request = self
            .base
            .request(&program, args)?
            .install_hints(&install_hints(&program));
        self.base.run_single(request).await
    }

    async fn run_jenkins(&mut self) -> Settled {
        let options: JenkinsOptions = self.base.validate("Mocha")?;
        let (program, mut args) = self.command_line("jenkins-mocha", &options.common)?;

        if options.no_coverage {
            args.push("--no-coverage".to_string());
        } else if options.cobertura {
            args.push("--cobertura".to_string());
        }

        let request = self
            .base
            .request(&program, args)?
            .install_hints(&install_hints(&program));
        self.base.run_single(request).await
    }
}

fn install_hints(program: &str) -> Vec<String> {
    vec![
        format!("npm i --save-dev {program}"),
        format!("npm i -g {program}"),
    ]
}

impl Plugin for Mocha {
    fn description(&self) -> &str {
        "Mocha JavaScript test framework"
    }

    fn operations(&self) -> &'static [Operation] {
        &[Operation::Default, Operation::Jenkins]
    }

    fn execute(
        &mut self,
        operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        match operation {
            Operation::Jenkins => Box::pin(self.run_jenkins()),
            _ => Box::pin(self.run_default()),
        }
    }
}
