// src/config/mod.rs

//! Configuration loading and validation for devloop.
//!
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it and resolve paths against the project dir (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, project_dir_of};
pub use model::{
    AppSection, BuildSection, ConfigFile, RawConfigFile, RedeployConfig, RedeploySection,
    StepConfig,
};
pub use validate::validate_config;
