use std::error::Error;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use pipewright::config::ReloadKind;
use pipewright::errors::{PipewrightError, Result as PwResult};
use pipewright::pipeline::spec::{PipelineDriver, PipelineSpec};
use pipewright::serve::{ReloadHub, ReloadSignal};
use pipewright::task::{Task, TaskKind, TaskRegistry};
use pipewright::watch::spawn_binding_worker;

type TestResult = Result<(), Box<dyn Error>>;

/// Driver that sleeps inside each leaf run and counts overlapping entries.
struct SlowDriver {
    in_flight: AtomicUsize,
    overlaps: AtomicUsize,
    runs: AtomicUsize,
    fail_first: bool,
}

impl SlowDriver {
    fn new(fail_first: bool) -> Arc<Self> {
        Arc::new(Self {
            in_flight: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
            runs: AtomicUsize::new(0),
            fail_first,
        })
    }
}

impl PipelineDriver for SlowDriver {
    fn run_leaf<'a>(
        &'a self,
        _task: &'a str,
        _spec: &'a PipelineSpec,
    ) -> Pin<Box<dyn Future<Output = PwResult<()>> + Send + 'a>> {
        Box::pin(async move {
            if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }

            tokio::time::sleep(Duration::from_millis(50)).await;

            let run = self.runs.fetch_add(1, Ordering::SeqCst);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_first && run == 0 {
                Err(PipewrightError::Stage {
                    stage: "slow".into(),
                    status: 1,
                    stderr: "first run fails".into(),
                })
            } else {
                Ok(())
            }
        })
    }
}

fn styles_registry() -> Arc<TaskRegistry> {
    let mut registry = TaskRegistry::new();
    registry.register(Task {
        name: "styles".into(),
        kind: TaskKind::Leaf(PipelineSpec {
            sources: vec!["app/src/scss/*.scss".into()],
            dest: PathBuf::from("app/src/css"),
            concat: Some("style.min.css".into()),
            stages: vec![],
        }),
    });
    Arc::new(registry)
}

#[tokio::test]
async fn rapid_events_on_one_binding_run_twice_without_overlap() -> TestResult {
    let driver = SlowDriver::new(false);
    let hub = ReloadHub::new();
    let mut signals = hub.subscribe();

    let worker = spawn_binding_worker(
        "styles".into(),
        ReloadKind::Partial,
        styles_registry(),
        driver.clone(),
        hub,
    );

    // Two change events before the first run can possibly finish.
    worker.send(PathBuf::from("app/src/scss/site.scss"))?;
    worker.send(PathBuf::from("app/src/scss/site.scss"))?;

    for _ in 0..2 {
        let signal = timeout(Duration::from_secs(5), signals.recv()).await??;
        assert_eq!(signal, ReloadSignal::Partial);
    }

    assert_eq!(driver.runs.load(Ordering::SeqCst), 2);
    assert_eq!(driver.overlaps.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn failed_run_keeps_the_worker_alive() -> TestResult {
    let driver = SlowDriver::new(true);
    let hub = ReloadHub::new();
    let mut signals = hub.subscribe();

    let worker = spawn_binding_worker(
        "styles".into(),
        ReloadKind::Full,
        styles_registry(),
        driver.clone(),
        hub,
    );

    worker.send(PathBuf::from("app/src/scss/site.scss"))?;
    worker.send(PathBuf::from("app/src/scss/site.scss"))?;

    // Only the second (successful) run reports a reload.
    let signal = timeout(Duration::from_secs(5), signals.recv()).await??;
    assert_eq!(signal, ReloadSignal::Full);

    assert_eq!(driver.runs.load(Ordering::SeqCst), 2);
    assert!(signals.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn reload_kind_none_emits_no_signal() -> TestResult {
    let driver = SlowDriver::new(false);
    let hub = ReloadHub::new();
    let mut signals = hub.subscribe();

    let worker = spawn_binding_worker(
        "styles".into(),
        ReloadKind::None,
        styles_registry(),
        driver.clone(),
        hub,
    );

    worker.send(PathBuf::from("app/src/scss/site.scss"))?;

    // Wait until the run definitely finished, then check nothing arrived.
    timeout(Duration::from_secs(5), async {
        while driver.runs.load(Ordering::SeqCst) < 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    assert!(signals.try_recv().is_err());
    Ok(())
}
