// tests/registry.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, StackBuilder, TaskBuilder};
use crate::common::{FakeBackend, init_tracing};

use std::path::PathBuf;

use dotbox::engine::{Orchestrator, StackOutcome};
use dotbox::errors::DotboxError;
use dotbox::fs::mock::MockFileSystem;
use dotbox::plugin::builtin::CATALOGUE;
use dotbox::plugin::external::{OPTIONS_ENV, PLUGIN_ENV};
use dotbox::registry::{LoadableRef, PluginRegistry};

fn plugin_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("plugins/a/deploy.sh", "#!/bin/sh");
    fs.add_file("plugins/a/nested/report.py", "");
    fs.add_file("plugins/a/.hidden.sh", "");
    fs.add_file("plugins/b/deploy.rb", "");
    fs.add_file("plugins/b/eslint", "");
    fs
}

#[test]
fn builtins_are_discovered_first() {
    let backend = FakeBackend::new();
    let registry = PluginRegistry::discover(&MockFileSystem::new(), &[], backend.runner());

    let ids: Vec<&str> = registry.ids().collect();
    assert_eq!(ids.len(), CATALOGUE.len());
    for builtin in CATALOGUE {
        assert!(ids.contains(&builtin.id));
        assert!(matches!(registry.resolve(builtin.id), Ok(LoadableRef::Builtin(_))));
    }
}

#[test]
fn plugin_directories_are_walked_recursively_and_last_one_wins() {
    init_tracing();
    let backend = FakeBackend::new();
    let dirs = vec![
        PathBuf::from("plugins/a"),
        PathBuf::from("plugins/missing"),
        PathBuf::from("plugins/b"),
    ];
    let registry = PluginRegistry::discover(&plugin_fs(), &dirs, backend.runner());

    match registry.resolve("deploy").unwrap() {
        LoadableRef::Script(path) => assert_eq!(path, PathBuf::from("plugins/b/deploy.rb")),
        other => panic!("unexpected {other:?}"),
    }
    match registry.resolve("report").unwrap() {
        LoadableRef::Script(path) => assert_eq!(path, PathBuf::from("plugins/a/nested/report.py")),
        other => panic!("unexpected {other:?}"),
    }
    // A directory entry shadows the built-in of the same name.
    assert!(matches!(registry.resolve("eslint"), Ok(LoadableRef::Script(_))));
    assert!(!registry.ids().any(|id| id.starts_with('.')));
}

#[test]
fn unknown_ids_fall_back_to_path_then_fail() {
    let backend = FakeBackend::new().missing("dotbox-nowhere");
    let registry = PluginRegistry::discover(&MockFileSystem::new(), &[], backend.runner());

    assert!(matches!(
        registry.resolve("changelog"),
        Ok(LoadableRef::External(program)) if program == "dotbox-changelog"
    ));
    assert!(matches!(
        registry.resolve("nowhere"),
        Err(DotboxError::PluginNotFound(id)) if id == "nowhere"
    ));
    // Resolution is lazy: discovery does not list PATH plugins.
    assert!(!registry.ids().any(|id| id == "changelog"));
}

#[tokio::test]
async fn external_plugins_receive_operation_and_options() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .plugin_dir("plugins/a")
        .with_stack(
            "release",
            StackBuilder::sequential()
                .task(
                    TaskBuilder::new("deploy")
                        .function("restore")
                        .option("target", "prod")
                        .build(),
                )
                .task(TaskBuilder::new("changelog").build())
                .build(),
        )
        .build();
    let backend = FakeBackend::new();
    let orchestrator = Orchestrator::from_config(&cfg, &plugin_fs(), backend.runner());

    let report = orchestrator.run_stack("release", &cfg).await.unwrap();
    assert_eq!(report.outcome, StackOutcome::Succeeded);

    let launched = backend.launched();
    assert_eq!(launched.len(), 2);
    assert_eq!(launched[0].program, "plugins/a/deploy.sh");
    assert_eq!(launched[0].args, vec!["restore"]);
    assert!(launched[0].env.contains(&(PLUGIN_ENV.to_string(), "deploy".to_string())));

    let options = launched[0]
        .env
        .iter()
        .find(|(key, _)| key == OPTIONS_ENV)
        .map(|(_, value)| value.clone())
        .unwrap();
    let parsed: toml::Table = toml::from_str(&options).unwrap();
    assert_eq!(parsed.get("target").and_then(|v| v.as_str()), Some("prod"));

    assert_eq!(launched[1].program, "dotbox-changelog");
    assert_eq!(launched[1].args, vec!["default"]);
}
