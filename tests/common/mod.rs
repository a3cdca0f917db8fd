#![allow(dead_code)]

pub use dotbox_test_utils::builders;
pub use dotbox_test_utils::fake_backend::FakeBackend;
pub use dotbox_test_utils::{init_tracing, with_timeout};

use dotbox::config::ConfigFile;
use dotbox::engine::Orchestrator;
use dotbox::fs::mock::MockFileSystem;
use dotbox::types::ExecutionResult;

/// Orchestrator over `cfg` with only the built-in plugins and `backend`
/// standing in for real processes.
pub fn orchestrator(cfg: &ConfigFile, backend: &FakeBackend) -> Orchestrator {
    Orchestrator::from_config(cfg, &MockFileSystem::new(), backend.runner())
}

/// `(plugin, success, blocking)` triples, for compact assertions.
pub fn summary(results: &[ExecutionResult]) -> Vec<(String, bool, bool)> {
    results
        .iter()
        .map(|r| (r.plugin.clone(), r.success, r.blocking))
        .collect()
}
