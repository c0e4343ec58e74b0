// src/config/mod.rs

//! Configuration loading and validation for pipewright.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate task references and graph acyclicity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    BuildSection, ConfigFile, DefaultSection, PipelineConfig, ReloadKind, ServeSection,
    StageConfig, TaskConfig,
};
pub use validate::validate_config;
