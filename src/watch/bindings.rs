// src/watch/bindings.rs

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::model::ReloadKind;
use crate::pipeline::spec::PipelineDriver;
use crate::serve::reload::ReloadHub;
use crate::task::registry::{TaskName, TaskRegistry};
use crate::task::runner::run_task;

/// Spawn the worker loop for one watch binding and return its event sender.
///
/// Each binding owns exactly one worker, and the worker runs the bound task
/// to completion before taking the next queued event. That single-consumer
/// queue is what serializes overlapping notifications for the same binding:
/// two rapid change events run the task exactly twice, never concurrently.
///
/// A failed run is logged and dropped; the worker keeps consuming events,
/// so the next change re-invokes the task (the de facto recovery path).
/// After a successful run the binding's reload kind is broadcast to the
/// dev server.
pub fn spawn_binding_worker(
    task: TaskName,
    reload: ReloadKind,
    registry: Arc<TaskRegistry>,
    driver: Arc<dyn PipelineDriver>,
    hub: ReloadHub,
) -> mpsc::UnboundedSender<PathBuf> {
    let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();

    tokio::spawn(async move {
        while let Some(path) = rx.recv().await {
            info!(task = %task, path = %path.display(), "change event -> re-running task");

            match run_task(registry.clone(), driver.clone(), task.clone()).await {
                Ok(()) => hub.notify(reload),
                Err(err) if err.is_stage_failure() => {
                    warn!(task = %task, error = %err, "transform stage failed; waiting for the next change");
                }
                Err(err) => {
                    warn!(task = %task, error = %err, "watch-triggered run failed; still watching");
                }
            }
        }

        info!(task = %task, "binding worker stopped (watcher dropped)");
    });

    tx
}
