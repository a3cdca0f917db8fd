// src/config/mod.rs

//! Configuration loading and validation for dotbox.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file through the [`crate::fs::FileSystem`] seam (`loader.rs`).
//! - Validate what serde cannot express (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{ConfigFile, RawConfigFile, StackConfig, TaskSpec, DEFAULT_BACKUP_SUFFIX};
