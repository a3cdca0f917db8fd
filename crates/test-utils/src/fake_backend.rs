use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dotbox::exec::{CommandRunner, ExitReport, Invocation, ProcessBackend};

#[derive(Debug, Default)]
struct Script {
    missing: HashSet<String>,
    /// Exit reports replayed in order per program; `Code(0)` once drained.
    exits: HashMap<String, VecDeque<ExitReport>>,
    /// Programs whose launch fails with an IO error.
    broken: HashSet<String>,
    delays: HashMap<String, Duration>,
}

/// A fake process backend that:
/// - records every launched invocation, in launch order
/// - replays scripted exit reports per program (success by default)
/// - reports scripted programs as missing from `PATH`
/// - optionally sleeps before "exiting", to reorder parallel completions.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    script: Arc<Mutex<Script>>,
    launched: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `CommandRunner` driving this backend.
    pub fn runner(&self) -> CommandRunner {
        CommandRunner::new(Arc::new(self.clone()))
    }

    pub fn missing(self, program: &str) -> Self {
        self.script.lock().unwrap().missing.insert(program.to_string());
        self
    }

    /// Queue exit codes for successive launches of `program`.
    pub fn exits(self, program: &str, codes: &[i32]) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            let queue = script.exits.entry(program.to_string()).or_default();
            queue.extend(codes.iter().map(|&c| ExitReport::Code(c)));
        }
        self
    }

    /// Every launch of `program` exits with `code`.
    pub fn always_exits(self, program: &str, code: i32) -> Self {
        self.exits(program, &[code; 32])
    }

    pub fn signalled(self, program: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .exits
            .entry(program.to_string())
            .or_default()
            .push_back(ExitReport::Signal);
        self
    }

    pub fn broken(self, program: &str) -> Self {
        self.script.lock().unwrap().broken.insert(program.to_string());
        self
    }

    pub fn delay(self, program: &str, delay: Duration) -> Self {
        self.script
            .lock()
            .unwrap()
            .delays
            .insert(program.to_string(), delay);
        self
    }

    pub fn launched(&self) -> Vec<Invocation> {
        self.launched.lock().unwrap().clone()
    }

    /// Launched command lines, in launch order.
    pub fn command_lines(&self) -> Vec<String> {
        self.launched().iter().map(Invocation::command_line).collect()
    }

    pub fn launch_count(&self, program: &str) -> usize {
        self.launched()
            .iter()
            .filter(|inv| inv.program == program)
            .count()
    }
}

impl ProcessBackend for FakeBackend {
    fn locate(&self, program: &str) -> bool {
        !self.script.lock().unwrap().missing.contains(program)
    }

    fn launch(
        &self,
        invocation: &Invocation,
    ) -> Pin<Box<dyn Future<Output = io::Result<ExitReport>> + Send + '_>> {
        let invocation = invocation.clone();

        Box::pin(async move {
            self.launched.lock().unwrap().push(invocation.clone());

            let (delay, broken, report) = {
                let mut script = self.script.lock().unwrap();
                let delay = script.delays.get(&invocation.program).copied();
                let broken = script.broken.contains(&invocation.program);
                let report = script
                    .exits
                    .get_mut(&invocation.program)
                    .and_then(VecDeque::pop_front)
                    .unwrap_or(ExitReport::Code(0));
                (delay, broken, report)
            };

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if broken {
                return Err(io::Error::new(io::ErrorKind::NotFound, "scripted launch failure"));
            }
            Ok(report)
        })
    }
}
