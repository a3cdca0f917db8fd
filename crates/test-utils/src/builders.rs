#![allow(dead_code)]

use std::path::PathBuf;

use dotbox::config::{ConfigFile, RawConfigFile, StackConfig, TaskSpec};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_stack(mut self, name: &str, stack: StackConfig) -> Self {
        self.config.stacks.insert(name.to_string(), stack);
        self
    }

    pub fn verbose(mut self, val: bool) -> Self {
        self.config.verbose = Some(val);
        self
    }

    pub fn plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.plugin_dirs.push(dir.into());
        self
    }

    pub fn backup_suffix(mut self, suffix: &str) -> Self {
        self.config.backup_suffix = Some(suffix.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `StackConfig`.
pub struct StackBuilder {
    stack: StackConfig,
}

impl StackBuilder {
    pub fn sequential() -> Self {
        Self {
            stack: StackConfig::default(),
        }
    }

    pub fn parallel() -> Self {
        let mut stack = StackConfig::default();
        stack.is_async = true;
        Self { stack }
    }

    pub fn verbose(mut self, val: bool) -> Self {
        self.stack.verbose = Some(val);
        self
    }

    pub fn task(mut self, task: TaskSpec) -> Self {
        self.stack.tasks.push(task);
        self
    }

    pub fn build(self) -> StackConfig {
        self.stack
    }
}

/// Builder for `TaskSpec`.
pub struct TaskBuilder {
    task: TaskSpec,
}

impl TaskBuilder {
    pub fn new(plugin: &str) -> Self {
        Self {
            task: TaskSpec {
                plugin: Some(plugin.to_string()),
                ..TaskSpec::default()
            },
        }
    }

    /// A `custom-cmd` task running `cmd`.
    pub fn custom_cmd(cmd: &str) -> Self {
        Self::new("custom-cmd").option("cmd", cmd)
    }

    /// A task without a plugin identifier.
    pub fn unnamed() -> Self {
        Self {
            task: TaskSpec::default(),
        }
    }

    pub fn function(mut self, name: &str) -> Self {
        self.task.function = Some(name.to_string());
        self
    }

    pub fn verbose(mut self, val: bool) -> Self {
        self.task.verbose = Some(val);
        self
    }

    pub fn retries(self, retries: i64) -> Self {
        self.option("retries", retries)
    }

    pub fn blocking(self, blocking: bool) -> Self {
        self.option("blocking", blocking)
    }

    pub fn option(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.task.options.insert(key.to_string(), value.into());
        self
    }

    pub fn string_list(self, key: &str, values: &[&str]) -> Self {
        let list: Vec<toml::Value> = values.iter().map(|v| toml::Value::from(*v)).collect();
        self.option(key, toml::Value::Array(list))
    }

    pub fn build(self) -> TaskSpec {
        self.task
    }
}
