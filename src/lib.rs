// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod plugin;
pub mod registry;
pub mod symlink;
pub mod types;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::engine::{Orchestrator, PlannedTask};
use crate::exec::CommandRunner;
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// Loads the config, discovers plugins, then either lists plugins, prints a
/// dry run, or runs the requested stack and maps its outcome to an exit code.
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    let fs = RealFileSystem;
    let config_path = PathBuf::from(&args.config);
    let mut cfg = load_and_validate(&fs, &config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    // Plugin directories are relative to the config file.
    let root = config_root_dir(&config_path);
    cfg.plugin_dirs = cfg.plugin_dirs.iter().map(|dir| root.join(dir)).collect();

    let orchestrator = Orchestrator::from_config(&cfg, &fs, CommandRunner::default())
        .with_global_verbose(args.verbose.then_some(true));

    if args.list_plugins {
        print_plugins(&orchestrator);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(stack_name) = args.stack.as_deref() else {
        bail!(
            "no stack given; available stacks: {}",
            cfg.stacks.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    };

    if args.dry_run {
        let stack = cfg
            .stack(stack_name)
            .with_context(|| format!("stack '{stack_name}' is not defined"))?;
        print_dry_run(stack_name, &orchestrator.plan(stack_name, stack));
        return Ok(ExitCode::SUCCESS);
    }

    info!(stack = %stack_name, config = %config_path.display(), "starting");
    let report = orchestrator.run_stack(stack_name, &cfg).await?;
    Ok(ExitCode::from(report.outcome.exit_code()))
}

/// Directory holding the config file, or `.` for a bare file name.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn print_plugins(orchestrator: &Orchestrator) {
    for (id, source) in orchestrator.registry().entries() {
        println!("{id:<24} {source}");
    }
}

/// Print the resolved tasks of a stack without running anything.
fn print_dry_run(stack: &str, tasks: &[PlannedTask]) {
    println!("dotbox dry-run: stack '{stack}'");
    println!("tasks ({}):", tasks.len());
    for task in tasks {
        println!("  - #{} {}", task.index + 1, task.plugin);
        if let Some(function) = &task.function {
            println!("      function: {function}");
        }
        if task.verbose {
            println!("      verbose: true");
        }
        for (key, value) in &task.options {
            println!("      {key}: {value}");
        }
    }

    debug!("dry-run complete (no execution)");
}
