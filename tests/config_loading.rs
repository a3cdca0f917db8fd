// tests/config_loading.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, StackBuilder, TaskBuilder};

use std::path::PathBuf;

use dotbox::config::{DEFAULT_BACKUP_SUFFIX, ConfigFile, load_and_validate, parse_str};
use dotbox::errors::DotboxError;
use dotbox::fs::mock::MockFileSystem;
use dotbox::types::ConcurrencyMode;

const SAMPLE: &str = r#"
verbose = true
plugin_dirs = ["tools/plugins"]

[stacks.lint]
async = true

[[stacks.lint.tasks]]
plugin = "eslint"
targets = ["src"]

[[stacks.lint.tasks]]
plugin = "custom-cmd"
operation = "default"
cmd = "true"
retries = 2
blocking = false

[stacks.deploy]
verbose = false
"#;

#[test]
fn sample_config_loads_through_the_filesystem_seam() {
    let fs = MockFileSystem::new();
    fs.add_file("project/dotbox.toml", SAMPLE);

    let cfg = load_and_validate(&fs, "project/dotbox.toml").unwrap();

    assert_eq!(cfg.verbose, Some(true));
    assert_eq!(cfg.plugin_dirs, vec![PathBuf::from("tools/plugins")]);
    assert_eq!(cfg.backup_suffix, DEFAULT_BACKUP_SUFFIX);

    let lint = cfg.stack("lint").unwrap();
    assert_eq!(lint.mode(), ConcurrencyMode::Parallel);
    assert_eq!(lint.tasks.len(), 2);
    assert_eq!(lint.tasks[0].plugin_id(), Some("eslint"));
    assert!(lint.tasks[0].options.contains_key("targets"));
    assert!(!lint.tasks[0].options.contains_key("plugin"));

    let cmd = &lint.tasks[1];
    assert_eq!(cmd.function.as_deref(), Some("default"));
    assert_eq!(cmd.options.get("retries").and_then(|v| v.as_integer()), Some(2));

    let deploy = cfg.stack("deploy").unwrap();
    assert_eq!(deploy.mode(), ConcurrencyMode::Sequential);
    assert!(deploy.tasks.is_empty());
    assert_eq!(deploy.verbose, Some(false));
}

#[test]
fn missing_file_is_reported() {
    let fs = MockFileSystem::new();
    let err = load_and_validate(&fs, "dotbox.toml").unwrap_err();
    assert!(matches!(err, DotboxError::Other(_)));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let err = parse_str("[stacks.lint\nasync = true").unwrap_err();
    assert!(matches!(err, DotboxError::TomlError(_)));
}

#[test]
fn invalid_plugin_identifiers_are_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_stack(
            "lint",
            StackBuilder::sequential()
                .task(TaskBuilder::new("eslint").build())
                .task(TaskBuilder::new("../evil").build())
                .build(),
        )
        .raw();

    let err = ConfigFile::try_from(raw).unwrap_err();
    match err {
        DotboxError::ConfigError(msg) => {
            assert_eq!(msg, "stack 'lint' task #2: invalid plugin identifier '../evil'")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn blank_plugin_identifiers_pass_validation() {
    let cfg = parse_str(
        r#"
        [[stacks.s.tasks]]
        plugin = ""

        [[stacks.s.tasks]]
        cmd = "x"
        "#,
    )
    .unwrap();

    let stack = cfg.stack("s").unwrap();
    assert!(stack.tasks.iter().all(|t| t.plugin_id().is_none()));
}

#[test]
fn backup_suffix_is_validated() {
    let cfg = parse_str("backup_suffix = \".orig\"").unwrap();
    assert_eq!(cfg.backup_suffix, ".orig");

    for bad in ["backup_suffix = \"\"", "backup_suffix = \"/bak\""] {
        assert!(matches!(parse_str(bad), Err(DotboxError::ConfigError(_))));
    }
}
