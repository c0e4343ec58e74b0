// src/pipeline/stage.rs

use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{PipewrightError, Result};
use crate::pipeline::spec::StageCommand;

/// Run one transform stage: pipe `input` through the stage's external
/// command and return its stdout.
///
/// The command is executed through the platform shell, the same way task
/// commands usually are in build runners. A non-zero exit status is a stage
/// failure carrying the captured stderr; the tool's transformation semantics
/// are entirely its own business.
pub async fn apply_stage(stage: &StageCommand, input: Vec<u8>) -> Result<Vec<u8>> {
    debug!(stage = %stage.name, bytes = input.len(), "applying stage");

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&stage.cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&stage.cmd);
        c
    };

    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for stage '{}'", stage.name))?;

    // Feed stdin from a separate task so a filter that writes output before
    // draining its input cannot deadlock against us.
    let mut stdin = child
        .stdin
        .take()
        .with_context(|| format!("no stdin handle for stage '{}'", stage.name))?;
    let writer = tokio::spawn(async move {
        let res = stdin.write_all(&input).await;
        drop(stdin);
        res
    });

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for process of stage '{}'", stage.name))?;

    // A filter may close stdin before draining it; a broken-pipe write is
    // not a failure on its own, the exit status decides.
    if let Ok(Err(err)) = writer.await {
        debug!(stage = %stage.name, error = %err, "stage closed stdin early");
    }

    if !output.status.success() {
        return Err(PipewrightError::Stage {
            stage: stage.name.clone(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}
