// src/registry.rs

//! Plugin discovery and resolution.
//!
//! Discovery walks the built-in catalogue, then every configured plugin
//! directory, exactly once. Resolution is lazy: an id that was not
//! discovered is looked up on `PATH` as `dotbox-<id>` only when a task asks
//! for it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::{DotboxError, Result};
use crate::exec::CommandRunner;
use crate::fs::FileSystem;
use crate::plugin::builtin::CATALOGUE;
use crate::plugin::external::ExternalPlugin;
use crate::plugin::{Plugin, PluginFactory, PluginInit};

/// Conventional prefix of plugin executables found on `PATH`.
pub const EXTERNAL_PREFIX: &str = "dotbox";

/// How to obtain a plugin instance.
#[derive(Clone)]
pub enum LoadableRef {
    Builtin(PluginFactory),
    /// Executable found in a configured plugin directory.
    Script(PathBuf),
    /// `dotbox-<id>` on the host search path.
    External(String),
}

impl fmt::Debug for LoadableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadableRef::Builtin(_) => f.write_str("Builtin"),
            LoadableRef::Script(path) => f.debug_tuple("Script").field(path).finish(),
            LoadableRef::External(program) => f.debug_tuple("External").field(program).finish(),
        }
    }
}

impl fmt::Display for LoadableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadableRef::Builtin(_) => f.write_str("builtin"),
            LoadableRef::Script(path) => write!(f, "{}", path.display()),
            LoadableRef::External(program) => write!(f, "{program} (PATH)"),
        }
    }
}

/// Mapping from plugin id to how to load it. Immutable once discovered.
#[derive(Debug)]
pub struct PluginRegistry {
    entries: BTreeMap<String, LoadableRef>,
    runner: CommandRunner,
}

impl PluginRegistry {
    /// Build the registry from the built-in catalogue and `plugin_dirs`.
    ///
    /// Later entries win over earlier ones with the same id. A missing or
    /// unreadable directory is logged and skipped.
    pub fn discover(fs: &dyn FileSystem, plugin_dirs: &[PathBuf], runner: CommandRunner) -> Self {
        let mut entries = BTreeMap::new();

        for builtin in CATALOGUE {
            insert(
                &mut entries,
                builtin.id.to_string(),
                LoadableRef::Builtin(builtin.factory),
            );
        }

        for dir in plugin_dirs {
            if !fs.is_dir(dir) {
                warn!(dir = %dir.display(), "plugin directory not found, skipping");
                continue;
            }
            walk(fs, dir, &mut entries);
        }

        info!(plugins = entries.len(), "plugin registry ready");
        Self { entries, runner }
    }

    /// Discovered ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Discovered entries, sorted by id.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &LoadableRef)> {
        self.entries.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Look `id` up: discovered entries first, then `dotbox-<id>` on `PATH`.
    pub fn resolve(&self, id: &str) -> Result<LoadableRef> {
        if let Some(found) = self.entries.get(id) {
            return Ok(found.clone());
        }

        let program = format!("{EXTERNAL_PREFIX}-{id}");
        if self.runner.is_available(&program) {
            debug!(plugin = %id, program = %program, "resolved plugin on PATH");
            return Ok(LoadableRef::External(program));
        }

        Err(DotboxError::PluginNotFound(id.to_string()))
    }

    /// Resolve `id` and construct an instance bound to `init`.
    pub fn instantiate(&self, id: &str, init: PluginInit) -> Result<Box<dyn Plugin>> {
        match self.resolve(id)? {
            LoadableRef::Builtin(factory) => factory(init),
            LoadableRef::Script(path) => {
                Ok(Box::new(ExternalPlugin::new(init, path.display().to_string())))
            }
            LoadableRef::External(program) => Ok(Box::new(ExternalPlugin::new(init, program))),
        }
    }
}

fn walk(fs: &dyn FileSystem, dir: &Path, entries: &mut BTreeMap<String, LoadableRef>) {
    let children = match fs.read_dir(dir) {
        Ok(children) => children,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read plugin directory");
            return;
        }
    };

    for child in children {
        let Some(name) = child.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        if fs.is_dir(&child) {
            walk(fs, &child, entries);
        } else if let Some(stem) = child.file_stem().and_then(|s| s.to_str()) {
            insert(entries, stem.to_string(), LoadableRef::Script(child.clone()));
        }
    }
}

fn insert(entries: &mut BTreeMap<String, LoadableRef>, id: String, loadable: LoadableRef) {
    debug!(plugin = %id, source = %loadable, "discovered plugin");
    if let Some(previous) = entries.insert(id.clone(), loadable) {
        warn!(plugin = %id, shadowed = %previous, "duplicate plugin id, last one wins");
    }
}
