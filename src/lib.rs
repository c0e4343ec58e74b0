// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod serve;
pub mod task;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, Command};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::errors::Result;
use crate::pipeline::runner::PipelineRunner;
use crate::pipeline::spec::PipelineDriver;
use crate::serve::reload::ReloadHub;
use crate::task::registry::{TaskKind, TaskRegistry};
use crate::task::runner::run_task;
use crate::watch::patterns::build_watch_bindings;
use crate::watch::watcher::spawn_watcher;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - task registry + pipeline runner
/// - for `build`: output cleanup + one task run
/// - for `default`: compile, dev server, file watcher, Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let mut cfg = load_and_validate(&config_path)?;

    if let Some(port) = args.port {
        cfg.serve.port = port;
    }

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let root = config_root_dir(&config_path);

    match args.command.unwrap_or(Command::Default) {
        Command::Build => run_build(&cfg, &root).await,
        Command::Default => run_default(&cfg, &root).await,
    }
}

/// One-shot build: delete the output directory, run the configured build
/// task, exit. Any failure (stage or filesystem) is fatal here.
pub async fn run_build(cfg: &ConfigFile, root: &Path) -> Result<()> {
    let out_dir = root.join(&cfg.build.out_dir);

    // The cleanup always targets the actual build destination, so every
    // `build` starts from an empty output tree with no stale artifacts.
    if out_dir.exists() {
        info!(out_dir = %out_dir.display(), "removing existing output directory");
        tokio::fs::remove_dir_all(&out_dir)
            .await
            .with_context(|| format!("removing output directory {:?}", out_dir))?;
    }

    let registry = Arc::new(TaskRegistry::from_config(cfg)?);
    let driver: Arc<dyn PipelineDriver> = Arc::new(PipelineRunner::new(root));

    run_task(registry, driver, cfg.build.build_task.clone()).await?;

    info!(task = %cfg.build.build_task, "build finished");
    Ok(())
}

/// Watch + serve mode: compile once, start the dev server and the watch
/// controller, run until Ctrl-C.
async fn run_default(cfg: &ConfigFile, root: &Path) -> Result<()> {
    let registry = Arc::new(TaskRegistry::from_config(cfg)?);
    let driver: Arc<dyn PipelineDriver> = Arc::new(PipelineRunner::new(root));

    // A broken source at startup shouldn't keep the dev loop from coming
    // up; the next save re-triggers the task through the watcher.
    if let Err(err) = run_task(
        registry.clone(),
        driver.clone(),
        cfg.serve.compile_task.clone(),
    )
    .await
    {
        warn!(task = %cfg.serve.compile_task, error = %err, "initial compile failed; watching anyway");
    }

    let hub = ReloadHub::new();

    let profiles = build_watch_bindings(cfg)?;
    info!(bindings = profiles.len(), "starting watch controller");
    let _watcher = spawn_watcher(root, profiles, registry, driver, hub.clone())?;

    let serve_root = root.join(&cfg.serve.root);
    let server = tokio::spawn(serve::server::serve(serve_root, cfg.serve.port, hub));

    tokio::select! {
        joined = server => {
            joined.map_err(|e| anyhow::anyhow!("dev server task panicked: {e}"))??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl+C")?;
            info!("shutdown requested, stopping");
        }
    }

    Ok(())
}

/// Figure out the project root all patterns are evaluated against.
/// Currently: directory containing the config file, or `.`.
fn config_root_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Simple dry-run output: print tasks, composition and watch bindings.
fn print_dry_run(cfg: &ConfigFile) {
    println!("pipewright dry-run");
    println!("  serve.port = {}", cfg.serve.port);
    println!("  serve.root = {}", cfg.serve.root);
    println!("  build.out_dir = {}", cfg.build.out_dir);
    println!();

    println!("stages ({}):", cfg.stage.len());
    for (name, stage) in cfg.stage.iter() {
        println!("  - {name}: {}", stage.cmd);
    }
    println!();

    println!("tasks ({}):", cfg.task.len());
    let registry = match TaskRegistry::from_config(cfg) {
        Ok(r) => r,
        Err(err) => {
            println!("  (failed to build registry: {err})");
            return;
        }
    };

    for name in cfg.task.keys() {
        let Some(task) = registry.get(name) else {
            continue;
        };
        match &task.kind {
            TaskKind::Leaf(spec) => {
                println!("  - {name} (pipeline)");
                println!("      src: {:?}", spec.sources);
                println!("      dest: {}", spec.dest.display());
                if let Some(concat) = &spec.concat {
                    println!("      concat: {concat}");
                }
                if !spec.stages.is_empty() {
                    let names: Vec<&str> =
                        spec.stages.iter().map(|s| s.name.as_str()).collect();
                    println!("      stages: {names:?}");
                }
            }
            TaskKind::Series(children) => {
                println!("  - {name} (series)");
                println!("      children: {children:?}");
            }
            TaskKind::Parallel(children) => {
                println!("  - {name} (parallel)");
                println!("      children: {children:?}");
            }
        }

        if let Some(tc) = cfg.task.get(name) {
            if let Some(watch) = &tc.watch {
                if !watch.is_empty() {
                    println!("      watch: {watch:?} (reload: {:?})", tc.effective_reload());
                }
            }
            if let Some(exclude) = &tc.exclude {
                if !exclude.is_empty() {
                    println!("      exclude: {exclude:?}");
                }
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
