// src/watch/patterns.rs

use std::fmt;

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::{ConfigFile, ReloadKind};
use crate::errors::Result;
use crate::task::registry::TaskName;

/// Default watch configuration from `[default]` in the config.
#[derive(Debug, Clone, Default)]
pub struct WatchDefaults {
    pub watch: Vec<String>,
    pub exclude: Vec<String>,
}

/// Compiled watch binding for a single task: the patterns that trigger it
/// and the reload signal to emit after a successful run.
///
/// Patterns are relative to the project root; the watcher passes relative
/// paths (e.g. `"app/src/scss/site.scss"`) into [`matches`](Self::matches).
#[derive(Clone)]
pub struct BindingProfile {
    task: TaskName,
    reload: ReloadKind,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for BindingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingProfile")
            .field("task", &self.task)
            .field("reload", &self.reload)
            .finish_non_exhaustive()
    }
}

impl BindingProfile {
    /// Name of the task this binding invokes.
    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn reload(&self) -> ReloadKind {
        self.reload
    }

    /// True if a change to the given root-relative path should trigger the
    /// bound task.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build one compiled binding per task that has an effective watch list.
///
/// Merge rules for the `watch` and `exclude` dimensions:
/// - If `append_default_watch = true`, effective list is
///   `task.watch + default.watch`.
/// - Else, if `task.watch` is Some, use only that.
/// - Else, use `default.watch`.
///
/// Tasks whose effective watch list ends up empty get no binding.
pub fn build_watch_bindings(cfg: &ConfigFile) -> Result<Vec<BindingProfile>> {
    let defaults = WatchDefaults {
        watch: cfg.default.watch.clone(),
        exclude: cfg.default.exclude.clone(),
    };

    let mut profiles = Vec::new();

    for (name, task) in cfg.task.iter() {
        let watch_patterns = effective_patterns(
            task.watch.as_ref(),
            &defaults.watch,
            task.append_default_watch,
        );

        if watch_patterns.is_empty() {
            continue;
        }

        let exclude_patterns = effective_patterns(
            task.exclude.as_ref(),
            &defaults.exclude,
            task.append_default_exclude,
        );

        let watch_set = build_globset(&watch_patterns)
            .with_context(|| format!("building watch globset for task {name}"))?;

        let exclude_set = if exclude_patterns.is_empty() {
            None
        } else {
            Some(
                build_globset(&exclude_patterns)
                    .with_context(|| format!("building exclude globset for task {name}"))?,
            )
        };

        profiles.push(BindingProfile {
            task: name.clone(),
            reload: task.effective_reload(),
            watch_set,
            exclude_set,
        });
    }

    Ok(profiles)
}

fn effective_patterns(
    task_list: Option<&Vec<String>>,
    default_list: &[String],
    append_default: bool,
) -> Vec<String> {
    match (task_list, append_default) {
        (Some(list), true) => {
            let mut combined = list.clone();
            combined.extend(default_list.iter().cloned());
            combined
        }
        (Some(list), false) => list.clone(),
        (None, _) => default_list.to_vec(),
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
