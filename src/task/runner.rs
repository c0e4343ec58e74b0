// src/task/runner.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::errors::{PipewrightError, Result};
use crate::pipeline::spec::PipelineDriver;
use crate::task::registry::{TaskKind, TaskName, TaskRegistry};

/// Run a named task to completion.
///
/// This is the single recursive evaluator over the task variants:
///
/// - `Leaf`: one pipeline invocation through the driver.
/// - `Series`: children strictly in declared order; the first failure
///   aborts the remaining children and becomes the task's result.
/// - `Parallel`: all children spawned concurrently; every child is allowed
///   to finish even when a sibling fails, and the task succeeds iff all
///   children succeed. The first observed failure is the reported one.
///
/// Returns a boxed future so the recursion through composite tasks and
/// `JoinSet::spawn` (which needs `'static`) both type-check.
pub fn run_task(
    registry: Arc<TaskRegistry>,
    driver: Arc<dyn PipelineDriver>,
    name: TaskName,
) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
    Box::pin(async move {
        let task = registry
            .get(&name)
            .ok_or_else(|| PipewrightError::TaskNotFound(name.clone()))?;

        match &task.kind {
            TaskKind::Leaf(spec) => {
                debug!(task = %task.name, "running leaf pipeline");
                driver.run_leaf(&task.name, spec).await
            }

            TaskKind::Series(children) => {
                for child in children {
                    debug!(task = %task.name, child = %child, "series: next child");
                    run_task(registry.clone(), driver.clone(), child.clone()).await?;
                }
                Ok(())
            }

            TaskKind::Parallel(children) => {
                let mut set = JoinSet::new();
                for child in children {
                    set.spawn(run_task(registry.clone(), driver.clone(), child.clone()));
                }

                let mut first_failure: Option<PipewrightError> = None;
                while let Some(joined) = set.join_next().await {
                    match joined {
                        Ok(Ok(())) => {}
                        Ok(Err(err)) => {
                            if first_failure.is_none() {
                                first_failure = Some(err);
                            } else {
                                warn!(task = %task.name, error = %err, "additional parallel child failed");
                            }
                        }
                        Err(join_err) => {
                            let err = PipewrightError::Other(anyhow!(
                                "parallel child of '{}' panicked: {join_err}",
                                task.name
                            ));
                            if first_failure.is_none() {
                                first_failure = Some(err);
                            }
                        }
                    }
                }

                match first_failure {
                    Some(err) => Err(err),
                    None => Ok(()),
                }
            }
        }
    })
}
