// src/task/mod.rs

//! Task registry and composition evaluator.
//!
//! - [`registry`] holds the named task graph built from config.
//! - [`runner`] is the single recursive evaluator over
//!   `Leaf` / `Series` / `Parallel` tasks.

pub mod registry;
pub mod runner;

pub use registry::{Task, TaskKind, TaskName, TaskRegistry};
pub use runner::run_task;
