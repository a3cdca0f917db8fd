// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::ConcurrencyMode;

/// Suffix appended to a link path to name its backup when none is configured.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".dotbox.bak";

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// verbose = false
/// plugin_dirs = ["tools/dotbox-plugins"]
///
/// [stacks.lint]
/// async = true
///
/// [[stacks.lint.tasks]]
/// plugin = "eslint"
/// targets = ["src"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Global verbosity, the last fallback before `false`.
    #[serde(default)]
    pub verbose: Option<bool>,

    /// Directories scanned for external plugin executables.
    #[serde(default)]
    pub plugin_dirs: Vec<PathBuf>,

    /// Suffix for symlink backups (`.dotbox.bak` when omitted).
    #[serde(default)]
    pub backup_suffix: Option<String>,

    /// Stacks keyed by name, from `[stacks.<name>]`.
    #[serde(default)]
    pub stacks: BTreeMap<String, StackConfig>,
}

/// Validated configuration. Built through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub verbose: Option<bool>,
    pub plugin_dirs: Vec<PathBuf>,
    pub backup_suffix: String,
    pub stacks: BTreeMap<String, StackConfig>,
}

impl ConfigFile {
    /// Assemble a config without running validation. Callers outside the
    /// `config` module should go through `ConfigFile::try_from`.
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            verbose: raw.verbose,
            plugin_dirs: raw.plugin_dirs,
            backup_suffix: raw
                .backup_suffix
                .unwrap_or_else(|| DEFAULT_BACKUP_SUFFIX.to_string()),
            stacks: raw.stacks,
        }
    }

    pub fn stack(&self, name: &str) -> Option<&StackConfig> {
        self.stacks.get(name)
    }
}

/// `[stacks.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackConfig {
    /// Ordered task list; a missing list is the same as an empty one.
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,

    /// `async = true` runs every task concurrently.
    #[serde(default, rename = "async")]
    pub is_async: bool,

    /// Stack-level verbosity default.
    #[serde(default)]
    pub verbose: Option<bool>,
}

impl StackConfig {
    pub fn mode(&self) -> ConcurrencyMode {
        ConcurrencyMode::from_async_flag(self.is_async)
    }
}

/// One `[[stacks.<name>.tasks]]` entry.
///
/// Every key other than `plugin`, `verbose` and `function` lands in
/// `options` and is interpreted by the plugin (and by the command runner for
/// `retries`, `blocking` and `redirected_output`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskSpec {
    #[serde(default)]
    pub plugin: Option<String>,

    #[serde(default)]
    pub verbose: Option<bool>,

    /// Name of the plugin operation to run; `default` when omitted.
    #[serde(default, alias = "operation")]
    pub function: Option<String>,

    #[serde(flatten)]
    pub options: toml::Table,
}

impl TaskSpec {
    /// The plugin identifier, if present and non-blank.
    pub fn plugin_id(&self) -> Option<&str> {
        self.plugin
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
