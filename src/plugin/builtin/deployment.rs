// src/plugin/builtin/deployment.rs

//! Deployment plugins (dpl, serverless, sls).
//!
//! Both run the same chain around their deploy command:
//!
//! 1. `npm prune --production` then `npm install --production`, so only
//!    runtime dependencies get packaged;
//! 2. resolve the configured symlinks;
//! 3. the deploy command itself, under the task's retry policy;
//! 4. restore the symlinks (failures here never block);
//! 5. `npm install` to bring dev dependencies back.
//!
//! Every step contributes one entry to a single `Batch`. A blocking failure
//! stops the chain and rejects with the steps run so far. Once links have
//! been resolved, a failed deploy still restores them before the chain stops.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use serde::Deserialize;
use tracing::debug;

use crate::errors::{DotboxError, Result};
use crate::exec::CommandRequest;
use crate::plugin::base::push_custom_args;
use crate::plugin::{Operation, Plugin, PluginBase, PluginInit};
use crate::types::{Response, Settled};

fn default_true() -> bool {
    true
}

/// Steps around the deploy command, common to every deployment plugin.
#[derive(Debug)]
struct DeployChain {
    remove_dev_dependencies: bool,
    restore_dev_dependencies: bool,
    resolve_symlinks: Vec<PathBuf>,
    restore_symlinks: bool,
}

impl DeployChain {
    async fn run(self, base: &mut PluginBase, deploy: CommandRequest) -> Settled {
        let mut steps: Vec<Response> = Vec::new();

        if self.remove_dev_dependencies {
            for args in [["prune", "--production"], ["install", "--production"]] {
                let request = base.helper_request("npm", args);
                if !push_command(&mut steps, base, request).await {
                    return base.settle_steps(steps, true);
                }
            }
        }

        if !self.resolve_symlinks.is_empty() {
            let results = base.symlinks.resolve(&base.id, &self.resolve_symlinks).await;
            let response = Response::from_results(results);
            let blocked = response.has_blocking_failure();
            steps.push(response);
            if blocked {
                return base.settle_steps(steps, true);
            }
        }

        let deployed = push_command(&mut steps, base, deploy).await;

        if !self.resolve_symlinks.is_empty() && self.restore_symlinks {
            let results = base
                .symlinks
                .restore(&base.id, &self.resolve_symlinks, false)
                .await;
            steps.push(Response::from_results(results));
        }

        if !deployed {
            return base.settle_steps(steps, true);
        }

        if self.restore_dev_dependencies {
            let request = base.helper_request("npm", ["install"]);
            if !push_command(&mut steps, base, request).await {
                return base.settle_steps(steps, true);
            }
        }

        debug!(plugin = %base.id, steps = steps.len(), "deployment chain finished");
        base.settle_steps(steps, false)
    }
}

/// Run one command step and record it. Returns `false` when the chain must
/// stop.
async fn push_command(
    steps: &mut Vec<Response>,
    base: &PluginBase,
    request: CommandRequest,
) -> bool {
    match base.runner.run(request).await {
        Ok(result) => {
            steps.push(Response::Single(result));
            true
        }
        Err(result) => {
            steps.push(Response::Single(result));
            false
        }
    }
}

#[derive(Debug, Deserialize)]
struct DplOptions {
    provider: String,
    #[serde(default)]
    skip_cleanup: bool,
    #[serde(default = "default_true")]
    remove_npm_dev_dependencies: bool,
    #[serde(default)]
    restore_npm_dev_dependencies: bool,
    #[serde(default)]
    resolve_symlinks: Vec<PathBuf>,
    #[serde(default = "default_true")]
    restore_symlinks: bool,
    #[serde(default)]
    custom_args: Option<Vec<String>>,
}

/// Deploys through Travis' dpl (dee-pee-ell).
#[derive(Debug)]
pub struct Dpl {
    base: PluginBase,
}

impl Dpl {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        let base = PluginBase::new(init).with_install_hints(&["gem install dpl"]);
        Ok(Box::new(Self { base }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: DplOptions = self.base.validate("Dpl")?;

        let mut args = Vec::new();
        if !options.provider.is_empty() {
            args.push(format!("--provider={}", options.provider));
        }
        if options.skip_cleanup {
            args.push("--skip_cleanup".to_string());
        }
        push_custom_args(&mut args, &options.custom_args);

        let deploy = self.base.request("dpl", args)?;
        let chain = DeployChain {
            remove_dev_dependencies: options.remove_npm_dev_dependencies,
            restore_dev_dependencies: options.restore_npm_dev_dependencies,
            resolve_symlinks: options.resolve_symlinks,
            restore_symlinks: options.restore_symlinks,
        };
        chain.run(&mut self.base, deploy).await
    }
}

impl Plugin for Dpl {
    fn description(&self) -> &str {
        "Dpl (dee-pee-ell)"
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}

/// Regions the serverless `--region` flag accepts.
pub const AWS_REGIONS: &[&str] = &[
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-south-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "cn-north-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
];

#[derive(Debug, Deserialize)]
struct ServerlessOptions {
    sls_function: String,
    #[serde(default)]
    quiet: bool,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    stage: Option<String>,
    #[serde(default = "default_true")]
    remove_dev_dependencies: bool,
    #[serde(default)]
    restore_dev_dependencies: bool,
    #[serde(default)]
    resolve_symlinks: Vec<PathBuf>,
    #[serde(default = "default_true")]
    restore_symlinks: bool,
    #[serde(default)]
    custom_args: Option<Vec<String>>,
}

impl ServerlessOptions {
    /// Flags appended after the function arguments already in `args`.
    fn args(&self, mut args: Vec<String>) -> Result<Vec<String>> {

        if !self.quiet {
            args.push("--verbose".to_string());
        }

        if let Some(region) = &self.region {
            if !AWS_REGIONS.contains(&region.as_str()) {
                return Err(DotboxError::ConfigError(format!(
                    "Serverless config validation error: unknown region '{region}'"
                )));
            }
            args.extend(["--region".to_string(), region.clone()]);
        }

        if let Some(stage) = &self.stage {
            args.extend(["--stage".to_string(), stage.clone()]);
        }

        push_custom_args(&mut args, &self.custom_args);
        Ok(args)
    }

    fn into_chain(self) -> DeployChain {
        DeployChain {
            remove_dev_dependencies: self.remove_dev_dependencies,
            restore_dev_dependencies: self.restore_dev_dependencies,
            resolve_symlinks: self.resolve_symlinks,
            restore_symlinks: self.restore_symlinks,
        }
    }
}

#[derive(Debug)]
pub struct Serverless {
    base: PluginBase,
}

impl Serverless {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        let base = PluginBase::new(init).with_install_hints(&["npm i -g serverless"]);
        Ok(Box::new(Self { base }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: ServerlessOptions = self.base.validate("Serverless")?;
        let function = options
            .sls_function
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let deploy = self.base.request("serverless", options.args(function)?)?;
        options.into_chain().run(&mut self.base, deploy).await
    }
}

impl Plugin for Serverless {
    fn description(&self) -> &str {
        "The Serverless Framework"
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}

/// The older `serverless` task: `sls_function` goes to the CLI as a single
/// argument instead of being split into words.
#[derive(Debug)]
pub struct Sls {
    base: PluginBase,
}

impl Sls {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        let base = PluginBase::new(init).with_install_hints(&["npm i -g serverless"]);
        Ok(Box::new(Self { base }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: ServerlessOptions = self.base.validate("Sls")?;
        let function = vec![options.sls_function.clone()];
        let deploy = self.base.request("serverless", options.args(function)?)?;
        options.into_chain().run(&mut self.base, deploy).await
    }
}

impl Plugin for Sls {
    fn description(&self) -> &str {
        "The Serverless Framework"
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}
