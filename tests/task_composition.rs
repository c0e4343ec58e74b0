use std::collections::HashSet;
use std::error::Error;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use pipewright::errors::{PipewrightError, Result as PwResult};
use pipewright::pipeline::spec::{PipelineDriver, PipelineSpec};
use pipewright::task::{run_task, Task, TaskKind, TaskRegistry};

type TestResult = Result<(), Box<dyn Error>>;

/// Driver that records leaf invocations in order and fails the configured
/// task names, without touching the filesystem.
struct FakeDriver {
    log: Mutex<Vec<String>>,
    failing: HashSet<String>,
}

impl FakeDriver {
    fn new(failing: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            log: Mutex::new(Vec::new()),
            failing: failing.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn invocations(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl PipelineDriver for FakeDriver {
    fn run_leaf<'a>(
        &'a self,
        task: &'a str,
        _spec: &'a PipelineSpec,
    ) -> Pin<Box<dyn Future<Output = PwResult<()>> + Send + 'a>> {
        Box::pin(async move {
            self.log.lock().unwrap().push(task.to_string());
            if self.failing.contains(task) {
                Err(PipewrightError::Stage {
                    stage: "fake".into(),
                    status: 1,
                    stderr: format!("{task} was configured to fail"),
                })
            } else {
                Ok(())
            }
        })
    }
}

fn leaf(name: &str) -> Task {
    Task {
        name: name.into(),
        kind: TaskKind::Leaf(PipelineSpec {
            sources: vec![format!("src/{name}/*")],
            dest: PathBuf::from("out"),
            concat: None,
            stages: vec![],
        }),
    }
}

fn registry(tasks: Vec<Task>) -> Arc<TaskRegistry> {
    let mut registry = TaskRegistry::new();
    for task in tasks {
        registry.register(task);
    }
    Arc::new(registry)
}

#[tokio::test]
async fn series_runs_children_in_declared_order() -> TestResult {
    let driver = FakeDriver::new(&[]);
    let registry = registry(vec![
        leaf("styles"),
        leaf("scripts"),
        Task {
            name: "compile".into(),
            kind: TaskKind::Series(vec!["styles".into(), "scripts".into()]),
        },
    ]);

    run_task(registry, driver.clone(), "compile".into()).await?;

    assert_eq!(driver.invocations(), vec!["styles", "scripts"]);
    Ok(())
}

#[tokio::test]
async fn series_aborts_after_first_failure() -> TestResult {
    let driver = FakeDriver::new(&["styles"]);
    let registry = registry(vec![
        leaf("styles"),
        leaf("scripts"),
        Task {
            name: "compile".into(),
            kind: TaskKind::Series(vec!["styles".into(), "scripts".into()]),
        },
    ]);

    let result = run_task(registry, driver.clone(), "compile".into()).await;

    assert!(result.is_err());
    // The failing child ran, the one after it was never invoked.
    assert_eq!(driver.invocations(), vec!["styles"]);
    Ok(())
}

#[tokio::test]
async fn parallel_succeeds_when_all_children_succeed() -> TestResult {
    let driver = FakeDriver::new(&[]);
    let registry = registry(vec![
        leaf("styles"),
        leaf("scripts"),
        leaf("images"),
        Task {
            name: "compile".into(),
            kind: TaskKind::Parallel(vec![
                "styles".into(),
                "scripts".into(),
                "images".into(),
            ]),
        },
    ]);

    run_task(registry, driver.clone(), "compile".into()).await?;

    let mut ran = driver.invocations();
    ran.sort();
    assert_eq!(ran, vec!["images", "scripts", "styles"]);
    Ok(())
}

#[tokio::test]
async fn parallel_fails_when_any_child_fails_but_siblings_finish() -> TestResult {
    let driver = FakeDriver::new(&["scripts"]);
    let registry = registry(vec![
        leaf("styles"),
        leaf("scripts"),
        leaf("images"),
        Task {
            name: "compile".into(),
            kind: TaskKind::Parallel(vec![
                "styles".into(),
                "scripts".into(),
                "images".into(),
            ]),
        },
    ]);

    let result = run_task(registry, driver.clone(), "compile".into()).await;

    assert!(matches!(result, Err(PipewrightError::Stage { .. })));
    // No forced cancellation: every sibling still ran.
    let mut ran = driver.invocations();
    ran.sort();
    assert_eq!(ran, vec!["images", "scripts", "styles"]);
    Ok(())
}

#[tokio::test]
async fn nested_composition_evaluates_recursively() -> TestResult {
    let driver = FakeDriver::new(&[]);
    let registry = registry(vec![
        leaf("styles"),
        leaf("scripts"),
        leaf("markup"),
        Task {
            name: "compile".into(),
            kind: TaskKind::Parallel(vec!["styles".into(), "scripts".into()]),
        },
        Task {
            name: "build".into(),
            kind: TaskKind::Series(vec!["compile".into(), "markup".into()]),
        },
    ]);

    run_task(registry, driver.clone(), "build".into()).await?;

    let ran = driver.invocations();
    assert_eq!(ran.len(), 3);
    // The series child after the parallel group runs last.
    assert_eq!(ran[2], "markup");
    Ok(())
}

#[tokio::test]
async fn unknown_task_is_reported() -> TestResult {
    let driver = FakeDriver::new(&[]);
    let registry = registry(vec![leaf("styles")]);

    let result = run_task(registry, driver, "nope".into()).await;
    assert!(matches!(result, Err(PipewrightError::TaskNotFound(name)) if name == "nope"));
    Ok(())
}
