// src/plugin/builtin/mod.rs

//! Plugins shipped with dotbox, grouped by category.
//!
//! Most of them only translate typed options into an argument list for one
//! external tool; the deployment plugins additionally chain dependency
//! pruning and symlink swaps around the deploy command.

pub mod analysis;
pub mod deployment;
pub mod doc;
pub mod lint;
pub mod misc;
pub mod security;
pub mod test_runner;

use super::PluginFactory;

/// One entry of the built-in catalogue.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinPlugin {
    pub category: &'static str,
    pub id: &'static str,
    pub factory: PluginFactory,
}

/// The built-in tree, in discovery order (category, then id).
pub const CATALOGUE: &[BuiltinPlugin] = &[
    BuiltinPlugin {
        category: "analysis",
        id: "plato",
        factory: analysis::Plato::create,
    },
    BuiltinPlugin {
        category: "deployment",
        id: "dpl",
        factory: deployment::Dpl::create,
    },
    BuiltinPlugin {
        category: "deployment",
        id: "serverless",
        factory: deployment::Serverless::create,
    },
    BuiltinPlugin {
        category: "doc",
        id: "jsdoc",
        factory: doc::Jsdoc::create,
    },
    BuiltinPlugin {
        category: "lint",
        id: "eslint",
        factory: lint::Eslint::create,
    },
    BuiltinPlugin {
        category: "lint",
        id: "jshint",
        factory: lint::Jshint::create,
    },
    BuiltinPlugin {
        category: "lint",
        id: "xo",
        factory: lint::Xo::create,
    },
    BuiltinPlugin {
        category: "misc",
        id: "custom-cmd",
        factory: misc::CustomCmd::create,
    },
    BuiltinPlugin {
        category: "misc",
        id: "git-file-downloader",
        factory: misc::GitFileDownloader::create,
    },
    BuiltinPlugin {
        category: "misc",
        id: "symlink-resolver",
        factory: misc::SymlinkResolver::create,
    },
    BuiltinPlugin {
        category: "security",
        id: "nsp",
        factory: security::Nsp::create,
    },
    BuiltinPlugin {
        category: "serverless",
        id: "sls",
        factory: deployment::Sls::create,
    },
    BuiltinPlugin {
        category: "test",
        id: "mocha",
        factory: test_runner::Mocha::create,
    },
];
