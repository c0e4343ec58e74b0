// src/pipeline/spec.rs

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;

/// One external transform command, run as a filter (stdin -> stdout).
#[derive(Debug, Clone)]
pub struct StageCommand {
    pub name: String,
    pub cmd: String,
}

/// Immutable description of one leaf pipeline, fixed at config load.
///
/// Paths and globs are relative to the project root (the directory
/// containing the config file). Source patterns are re-resolved against the
/// filesystem on every run.
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    /// Source glob patterns, resolved in declared order.
    pub sources: Vec<String>,
    /// Destination directory.
    pub dest: PathBuf,
    /// Concatenate all sources into a single artifact with this name.
    pub concat: Option<String>,
    /// Transform stages applied in order.
    pub stages: Vec<StageCommand>,
}

/// Trait abstracting how leaf pipelines are executed.
///
/// The task evaluator talks to a `PipelineDriver` instead of running
/// pipelines directly. Production code uses [`super::PipelineRunner`]; tests
/// can provide their own implementation that records invocations without
/// touching the filesystem.
pub trait PipelineDriver: Send + Sync {
    fn run_leaf<'a>(
        &'a self,
        task: &'a str,
        spec: &'a PipelineSpec,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
