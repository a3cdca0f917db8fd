// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dotbox`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dotbox",
    version,
    about = "Run stacks of build, lint, test and deployment tools from a TOML file.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "dotbox.toml")]
    pub config: String,

    /// Stack to run. Required unless `--list-plugins` is given.
    #[arg(value_name = "STACK")]
    pub stack: Option<String>,

    /// Let every tool write straight to the terminal. Overrides the file's
    /// global `verbose`; task and stack settings still win.
    #[arg(long, short)]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DOTBOX_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the resolved tasks, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the discovered plugins and exit.
    #[arg(long)]
    pub list_plugins: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
