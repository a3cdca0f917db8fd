// src/plugin/builtin/misc.rs

//! General-purpose plugins: custom commands, git file downloads and the
//! standalone symlink resolver.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use serde::Deserialize;
use tracing::info;

use crate::errors::{DotboxError, Result};
use crate::plugin::base::push_custom_args;
use crate::plugin::{Operation, Plugin, PluginBase, PluginInit};
use crate::types::{ExecutionResult, Settled};

#[derive(Debug, Deserialize)]
struct CustomCmdOptions {
    cmd: String,
    #[serde(default)]
    custom_args: Option<Vec<String>>,
}

/// Runs an arbitrary command. `cmd` may carry leading arguments
/// (`cmd = "ls -la"`); `custom_args` are appended after them.
#[derive(Debug)]
pub struct CustomCmd {
    base: PluginBase,
}

impl CustomCmd {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        Ok(Box::new(Self {
            base: PluginBase::new(init),
        }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: CustomCmdOptions = self.base.validate("CustomCmd")?;

        let mut words = options.cmd.split_whitespace().map(str::to_string);
        let program = words.next().ok_or_else(|| {
            DotboxError::ConfigError(
                "CustomCmd config validation error: `cmd` is empty".to_string(),
            )
        })?;
        let mut args: Vec<String> = words.collect();
        push_custom_args(&mut args, &options.custom_args);

        let request = self.base.request(&program, args)?;
        self.base.run_single(request).await
    }
}

impl Plugin for CustomCmd {
    fn description(&self) -> &str {
        "Custom command"
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GitProvider {
    Github,
    Gitlab,
}

impl GitProvider {
    fn as_str(&self) -> &'static str {
        match self {
            GitProvider::Github => "github",
            GitProvider::Gitlab => "gitlab",
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitFileDownloaderOptions {
    provider: GitProvider,
    repository: String,
    file: String,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    keep_original_path: bool,
    /// GitLab.
    #[serde(default)]
    private_token: Option<String>,
    /// GitHub.
    #[serde(default)]
    oauth2_token: Option<String>,
    #[serde(default)]
    basic_username: Option<String>,
    #[serde(default)]
    basic_password: Option<String>,
}

#[derive(Debug)]
pub struct GitFileDownloader {
    base: PluginBase,
}

impl GitFileDownloader {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        let base = PluginBase::new(init).with_install_hints(&[
            "npm i --save-dev git-file-downloader",
            "npm i -g git-file-downloader",
        ]);
        Ok(Box::new(Self { base }))
    }

    async fn run_default(&mut self) -> Settled {
        let options: GitFileDownloaderOptions = self.base.validate("GitFileDownloader")?;
        let args = git_file_downloader_args(&options);
        let request = self.base.request("git-file-downloader", args)?;
        self.base.run_single(request).await
    }
}

fn git_file_downloader_args(options: &GitFileDownloaderOptions) -> Vec<String> {
    let mut args = vec!["-p".to_string(), options.provider.as_str().to_string()];

    if let Some(branch) = &options.branch {
        args.extend(["-b".to_string(), branch.clone()]);
    }
    if let Some(output) = &options.output {
        args.extend(["-o".to_string(), output.clone()]);
    }
    if let Some(token) = &options.private_token {
        args.extend(["--gitlab-private-token".to_string(), token.clone()]);
    }
    if let Some(token) = &options.oauth2_token {
        args.extend(["--github-oauth-token".to_string(), token.clone()]);
    }
    if let (Some(user), Some(password)) = (&options.basic_username, &options.basic_password) {
        args.extend([
            "--github-basic-username".to_string(),
            user.clone(),
            "--github-basic-password".to_string(),
            password.clone(),
        ]);
    }
    if options.keep_original_path {
        args.push("-k".to_string());
    }

    args.push(options.repository.clone());
    args.push(options.file.clone());
    args
}

impl Plugin for GitFileDownloader {
    fn description(&self) -> &str {
        "Git File Downloader"
    }

    fn execute(
        &mut self,
        _operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        Box::pin(self.run_default())
    }
}

#[derive(Debug, Deserialize)]
struct SymlinkResolverOptions {
    #[serde(default)]
    links: Vec<PathBuf>,
}

/// Exposes the symlink transaction as a task: `default`/`resolve` swap links
/// for copies of their targets, `restore` puts the links back.
#[derive(Debug)]
pub struct SymlinkResolver {
    base: PluginBase,
}

impl SymlinkResolver {
    pub fn create(init: PluginInit) -> Result<Box<dyn Plugin>> {
        Ok(Box::new(Self {
            base: PluginBase::new(init),
        }))
    }

    async fn run_resolve(&mut self) -> Settled {
        let options: SymlinkResolverOptions = self.base.validate("SymlinkResolver")?;

        if options.links.is_empty() {
            info!(plugin = %self.base.id, "No link to resolve provided");
            let done = ExecutionResult::success(self.base.id.clone());
            return self.base.settle_results(vec![done]);
        }

        let results = self.base.symlinks.resolve(&self.base.id, &options.links).await;
        self.base.settle_results(results)
    }

    async fn run_restore(&mut self) -> Settled {
        let options: SymlinkResolverOptions = self.base.validate("SymlinkResolver")?;
        let blocking = self.base.exec_options()?.blocking;

        if options.links.is_empty() {
            info!(plugin = %self.base.id, "No link to restore provided");
            let done = ExecutionResult::success(self.base.id.clone());
            return self.base.settle_results(vec![done]);
        }

        let results = self
            .base
            .symlinks
            .restore(&self.base.id, &options.links, blocking)
            .await;
        self.base.settle_results(results)
    }
}

impl Plugin for SymlinkResolver {
    fn description(&self) -> &str {
        "Symlink Resolver"
    }

    fn operations(&self) -> &'static [Operation] {
        &[Operation::Default, Operation::Resolve, Operation::Restore]
    }

    fn execute(
        &mut self,
        operation: Operation,
    ) -> Pin<Box<dyn Future<Output = Settled> + Send + '_>> {
        match operation {
            Operation::Restore => Box::pin(self.run_restore()),
            _ => Box::pin(self.run_resolve()),
        }
    }
}
