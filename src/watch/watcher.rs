// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::pipeline::spec::PipelineDriver;
use crate::serve::reload::ReloadHub;
use crate::task::registry::TaskRegistry;
use crate::watch::bindings::spawn_binding_worker;
use crate::watch::patterns::BindingProfile;

/// Handle for the filesystem watch controller.
///
/// Exists mainly so the underlying `RecommendedWatcher` stays alive;
/// dropping this handle stops file watching and, once their queues drain,
/// the per-binding workers.
pub struct WatchController {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchController").finish()
    }
}

/// Enter the watching state: observe `root` recursively and route each
/// changed path to the workers of the bindings whose patterns match it.
///
/// - `root` is the project root against which all glob patterns are evaluated.
/// - `profiles` is the compiled per-binding pattern set; one serialized
///   worker is spawned per binding.
/// - Successful runs report through `hub`.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<BindingProfile>,
    registry: Arc<TaskRegistry>,
    driver: Arc<dyn PipelineDriver>,
    hub: ReloadHub,
) -> crate::errors::Result<WatchController> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone()); // best-effort

    // One serialized worker per binding; index-aligned with `profiles`.
    let workers: Vec<mpsc::UnboundedSender<PathBuf>> = profiles
        .iter()
        .map(|profile| {
            spawn_binding_worker(
                profile.task().to_string(),
                profile.reload(),
                registry.clone(),
                driver.clone(),
                hub.clone(),
            )
        })
        .collect();

    let profiles = Arc::new(profiles);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // Can't log via tracing from the notify thread reliably.
                    eprintln!("pipewright: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("pipewright: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!(root = %root.display(), "watch controller started");

    // Dispatcher: consume notify events, fan changed paths out to bindings.
    let async_root = root.clone();
    let async_profiles = Arc::clone(&profiles);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            debug!(?event, "received notify event");

            for path in &event.paths {
                let Some(rel_str) = relative_str(&async_root, path) else {
                    warn!(path = %path.display(), "could not relativize changed path against root");
                    continue;
                };

                for (profile, worker) in async_profiles.iter().zip(workers.iter()) {
                    if profile.matches(&rel_str) {
                        debug!(task = %profile.task(), path = %rel_str, "watch match -> queueing run");
                        if worker.send(path.clone()).is_err() {
                            warn!(task = %profile.task(), "binding worker gone; dropping event");
                        }
                    }
                }
            }
        }

        debug!("watch dispatcher loop ended");
    });

    Ok(WatchController { _inner: watcher })
}

/// Convert a path into a string relative to `root`, with forward slashes.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
