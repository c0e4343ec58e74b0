// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Structured variants cover the failures the runner itself can diagnose
//! (config problems, stage failures, missing sources); everything else is
//! carried through `anyhow` and surfaced at the binary boundary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipewrightError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("cycle detected in task graph involving task '{0}'")]
    Cycle(String),

    #[error("source path does not exist: {0}")]
    MissingSource(PathBuf),

    #[error("stage '{stage}' exited with status {status}: {stderr}")]
    Stage {
        stage: String,
        status: i32,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("glob pattern error: {0}")]
    Glob(#[from] globset::Error),

    #[error("file watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipewrightError {
    /// True for failures of an external transform stage, as opposed to
    /// filesystem or configuration problems.
    pub fn is_stage_failure(&self) -> bool {
        matches!(self, PipewrightError::Stage { .. })
    }
}

pub type Result<T, E = PipewrightError> = std::result::Result<T, E>;
