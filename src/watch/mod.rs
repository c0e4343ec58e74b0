// src/watch/mod.rs

//! File watching and task re-invocation.
//!
//! This module is responsible for:
//! - Compiling per-task `watch` / `exclude` glob patterns into bindings.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Serializing re-invocations per binding so two rapid change events can
//!   never produce overlapping runs writing the same destination files.
//!
//! It does **not** know how pipelines work; it only turns filesystem
//! changes into task runs and reload signals.

pub mod bindings;
pub mod patterns;
pub mod watcher;

pub use bindings::spawn_binding_worker;
pub use patterns::{build_watch_bindings, BindingProfile, WatchDefaults};
pub use watcher::{spawn_watcher, WatchController};
