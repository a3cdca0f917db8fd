// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DotboxError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("\"{0}\" plugin does not exist yet.")]
    PluginNotFound(String),

    #[error("No \"{operation}\" function found in {plugin} Plugin")]
    UnsupportedOperation { plugin: String, operation: String },

    #[error("{command} command not found.{hint}")]
    CommandUnavailable { command: String, hint: String },

    #[error("{command}: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("{message}")]
    SymlinkError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DotboxError {
    /// Build a `SymlinkError` without an underlying IO cause.
    pub fn symlink(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DotboxError::SymlinkError {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Build a `SymlinkError` wrapping the IO error that caused it.
    pub fn symlink_io(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        DotboxError::SymlinkError {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DotboxError>;
