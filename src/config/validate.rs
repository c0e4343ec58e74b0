// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, TaskConfig};
use crate::errors::{PipewrightError, Result};

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one task
/// - every task has exactly one kind (pipeline, series or parallel)
/// - pipeline `src` lists are non-empty and stage references exist
/// - composite children refer to existing tasks, never to themselves
/// - the composition graph has no cycles
/// - `build.build_task` and `serve.compile_task` refer to existing tasks
/// - `serve.port` is non-zero
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_kinds(cfg)?;
    validate_children(cfg)?;
    validate_composition_graph(cfg)?;
    validate_entry_points(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &ConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(PipewrightError::Config(
            "config must contain at least one [task.<name>] section".into(),
        ));
    }
    Ok(())
}

fn validate_task_kinds(cfg: &ConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        let kinds = [
            task.pipeline.is_some(),
            task.series.is_some(),
            task.parallel.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();

        if kinds != 1 {
            return Err(PipewrightError::Config(format!(
                "task '{name}' must set exactly one of `pipeline`, `series`, `parallel` (found {kinds})"
            )));
        }

        if let Some(pipeline) = &task.pipeline {
            if pipeline.src.is_empty() {
                return Err(PipewrightError::Config(format!(
                    "task '{name}' has an empty `src` list"
                )));
            }
            for stage in &pipeline.stages {
                if !cfg.stage.contains_key(stage) {
                    return Err(PipewrightError::Config(format!(
                        "task '{name}' references unknown stage '{stage}'"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn validate_children(cfg: &ConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for child in children_of(task) {
            if !cfg.task.contains_key(child) {
                return Err(PipewrightError::Config(format!(
                    "task '{name}' references unknown child task '{child}'"
                )));
            }
            if child == name {
                return Err(PipewrightError::Config(format!(
                    "task '{name}' cannot contain itself"
                )));
            }
        }
    }
    Ok(())
}

fn validate_composition_graph(cfg: &ConfigFile) -> Result<()> {
    // Edge direction: child -> parent. A topological sort fails iff the
    // composition graph contains a cycle.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for child in children_of(task) {
            graph.add_edge(child.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(PipewrightError::Cycle(cycle.node_id().to_string())),
    }
}

fn validate_entry_points(cfg: &ConfigFile) -> Result<()> {
    if cfg.serve.port == 0 {
        return Err(PipewrightError::Config(
            "[serve].port must be non-zero".into(),
        ));
    }

    if !cfg.task.contains_key(&cfg.build.build_task) {
        return Err(PipewrightError::Config(format!(
            "[build].build_task refers to unknown task '{}'",
            cfg.build.build_task
        )));
    }

    if !cfg.task.contains_key(&cfg.serve.compile_task) {
        return Err(PipewrightError::Config(format!(
            "[serve].compile_task refers to unknown task '{}'",
            cfg.serve.compile_task
        )));
    }

    Ok(())
}

fn children_of(task: &TaskConfig) -> impl Iterator<Item = &String> {
    task.series
        .iter()
        .flatten()
        .chain(task.parallel.iter().flatten())
}
