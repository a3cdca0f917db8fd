// src/config/validate.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DotboxError, Result};

/// Plugin identifiers double as file stems and as the suffix of external
/// executable names (`dotbox-<id>`), so they must be plain names.
static PLUGIN_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("plugin id pattern is valid")
});

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DotboxError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_backup_suffix(cfg)?;
    validate_plugin_ids(cfg)?;
    Ok(())
}

fn validate_backup_suffix(cfg: &RawConfigFile) -> Result<()> {
    let Some(suffix) = cfg.backup_suffix.as_deref() else {
        return Ok(());
    };

    if suffix.is_empty() {
        return Err(DotboxError::ConfigError(
            "backup_suffix must not be empty".to_string(),
        ));
    }
    if suffix.contains('/') || suffix.contains('\\') {
        return Err(DotboxError::ConfigError(format!(
            "backup_suffix '{suffix}' must not contain a path separator"
        )));
    }
    Ok(())
}

/// Blank identifiers are allowed here: such tasks are skipped at run time.
fn validate_plugin_ids(cfg: &RawConfigFile) -> Result<()> {
    for (stack, stack_cfg) in cfg.stacks.iter() {
        for (index, task) in stack_cfg.tasks.iter().enumerate() {
            let Some(id) = task.plugin_id() else {
                continue;
            };
            if !PLUGIN_ID.is_match(id) {
                return Err(DotboxError::ConfigError(format!(
                    "stack '{stack}' task #{}: invalid plugin identifier '{id}'",
                    index + 1
                )));
            }
        }
    }
    Ok(())
}
