// src/pipeline/mod.rs

//! Leaf-task pipelines: resolve sources, apply transform stages, write out.
//!
//! - [`spec`] holds the immutable pipeline description plus the driver trait
//!   the task evaluator runs leaves through.
//! - [`sources`] expands glob patterns into concrete file lists.
//! - [`stage`] pipes file contents through external filter commands.
//! - [`runner`] ties the three together.
//!
//! The transform tools themselves (preprocessors, minifiers, optimizers)
//! are external collaborators; this module only invokes them.

pub mod runner;
pub mod sources;
pub mod spec;
pub mod stage;

pub use runner::PipelineRunner;
pub use sources::{resolve_pattern, ResolvedSource};
pub use spec::{PipelineDriver, PipelineSpec, StageCommand};
pub use stage::apply_stage;
