// src/task/registry.rs

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::model::ConfigFile;
use crate::errors::{PipewrightError, Result};
use crate::pipeline::spec::{PipelineSpec, StageCommand};

/// Public type alias for task names throughout the crate.
pub type TaskName = String;

/// How a task is composed.
///
/// Composite kinds reference children by name; the evaluator resolves them
/// through the registry, so the same task can appear under several parents.
#[derive(Debug, Clone)]
pub enum TaskKind {
    /// One pipeline invocation.
    Leaf(PipelineSpec),
    /// Children run strictly in declared order; first failure aborts the
    /// remaining children.
    Series(Vec<TaskName>),
    /// Children run concurrently; all must succeed.
    Parallel(Vec<TaskName>),
}

/// A named unit of build work.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: TaskName,
    pub kind: TaskKind,
}

/// Holds all named tasks. Composition references are by name, and the
/// config validator has already guaranteed they exist and form no cycle.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: HashMap<TaskName, Arc<Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under its name, replacing any existing entry.
    pub fn register(&mut self, task: Task) {
        self.tasks.insert(task.name.clone(), Arc::new(task));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Task>> {
        self.tasks.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    /// Build the registry from a validated [`ConfigFile`], resolving stage
    /// names into concrete commands.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let mut registry = Self::new();

        for (name, tc) in cfg.task.iter() {
            let kind = if let Some(pipeline) = &tc.pipeline {
                let mut stages = Vec::with_capacity(pipeline.stages.len());
                for stage_name in &pipeline.stages {
                    let stage = cfg.stage.get(stage_name).ok_or_else(|| {
                        PipewrightError::Config(format!(
                            "task '{name}' references unknown stage '{stage_name}'"
                        ))
                    })?;
                    stages.push(StageCommand {
                        name: stage_name.clone(),
                        cmd: stage.cmd.clone(),
                    });
                }

                TaskKind::Leaf(PipelineSpec {
                    sources: pipeline.src.clone(),
                    dest: PathBuf::from(&pipeline.dest),
                    concat: pipeline.concat.clone(),
                    stages,
                })
            } else if let Some(children) = &tc.series {
                TaskKind::Series(children.clone())
            } else if let Some(children) = &tc.parallel {
                TaskKind::Parallel(children.clone())
            } else {
                return Err(PipewrightError::Config(format!(
                    "task '{name}' has no pipeline, series or parallel definition"
                )));
            };

            registry.register(Task {
                name: name.clone(),
                kind,
            });
        }

        Ok(registry)
    }
}
