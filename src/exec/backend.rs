// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The [`CommandRunner`](super::CommandRunner) owns retry and blocking
//! policy; the backend only knows how to find a program and run it once.
//!
//! - `TokioProcessBackend` is the production implementation, built on
//!   `tokio::process::Command`.
//! - Tests provide their own `ProcessBackend` that records invocations and
//!   replays scripted exit codes without spawning anything.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

use super::probe::find_executable;

/// How a command line is handed to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Spawn the program directly with its argument vector.
    Direct,
    /// Hand the joined command line to the platform shell so that
    /// redirections such as `> report.xml` are honoured.
    Shell,
}

/// One attempt's worth of "what to run".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub mode: InvocationMode,
    /// Inherit stdio when true; otherwise capture and log at debug.
    pub verbose: bool,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// Program and arguments joined by single spaces.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// How a launched process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReport {
    Code(i32),
    /// Killed by a signal; no exit code available.
    Signal,
}

/// Trait abstracting how commands are located and executed.
pub trait ProcessBackend: Send + Sync {
    /// Whether `program` can be found on the host search path.
    fn locate(&self, program: &str) -> bool;

    /// Run the invocation to completion. `Err` means the process could not
    /// be launched or waited on.
    fn launch(
        &self,
        invocation: &Invocation,
    ) -> Pin<Box<dyn Future<Output = io::Result<ExitReport>> + Send + '_>>;
}

/// Production backend.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessBackend;

impl ProcessBackend for TokioProcessBackend {
    fn locate(&self, program: &str) -> bool {
        find_executable(program).is_some()
    }

    fn launch(
        &self,
        invocation: &Invocation,
    ) -> Pin<Box<dyn Future<Output = io::Result<ExitReport>> + Send + '_>> {
        // Own the invocation so the future doesn't borrow the caller's copy.
        let invocation = invocation.clone();
        Box::pin(async move { run_invocation(invocation).await })
    }
}

async fn run_invocation(invocation: Invocation) -> io::Result<ExitReport> {
    let mut cmd = match invocation.mode {
        InvocationMode::Direct => {
            let mut c = Command::new(&invocation.program);
            c.args(&invocation.args);
            c
        }
        InvocationMode::Shell => shell_command(&invocation.command_line()),
    };

    cmd.envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .kill_on_drop(true);

    if invocation.verbose {
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
    } else {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
    }

    let mut child = cmd.spawn()?;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Drain both pipes while waiting so the child never blocks on a full buffer.
    let (status, (), ()) = tokio::join!(
        child.wait(),
        drain_lines(&invocation.program, "stdout", stdout),
        drain_lines(&invocation.program, "stderr", stderr),
    );

    Ok(match status?.code() {
        Some(code) => ExitReport::Code(code),
        None => ExitReport::Signal,
    })
}

fn shell_command(command_line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command_line);
        c
    }
}

async fn drain_lines<R>(program: &str, stream: &'static str, reader: Option<R>)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(program = %program, stream, "{}", line);
    }
}
