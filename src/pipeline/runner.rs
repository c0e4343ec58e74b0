// src/pipeline/runner.rs

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::Context;
use tracing::{debug, info};

use crate::errors::Result;
use crate::pipeline::sources::resolve_pattern;
use crate::pipeline::spec::{PipelineDriver, PipelineSpec};
use crate::pipeline::stage::apply_stage;

/// One in-flight artifact flowing through the pipeline stages.
#[derive(Debug)]
struct BatchItem {
    /// Name relative to the destination directory.
    name: String,
    contents: Vec<u8>,
}

/// Production pipeline executor.
///
/// For each run: resolve sources against the current filesystem state,
/// read them, optionally concatenate, apply the transform stages in order,
/// write the results under the destination directory.
pub struct PipelineRunner {
    root: PathBuf,
}

impl PipelineRunner {
    /// `root` is the project root all pipeline paths are relative to.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn run(&self, task: &str, spec: &PipelineSpec) -> Result<()> {
        info!(task, dest = %spec.dest.display(), "pipeline started");

        let mut items = self.collect_sources(spec).await?;

        if items.is_empty() {
            debug!(task, "no sources matched; pipeline is a no-op");
            return Ok(());
        }

        if let Some(name) = &spec.concat {
            items = vec![concat_items(name, items)];
        }

        for stage in &spec.stages {
            for item in items.iter_mut() {
                let input = std::mem::take(&mut item.contents);
                item.contents = apply_stage(stage, input).await?;
            }
        }

        self.write_items(spec, &items).await?;

        info!(task, artifacts = items.len(), "pipeline finished");
        Ok(())
    }

    /// Resolve every source pattern in declared order and read the matches.
    async fn collect_sources(&self, spec: &PipelineSpec) -> Result<Vec<BatchItem>> {
        let mut items = Vec::new();

        for pattern in &spec.sources {
            for source in resolve_pattern(&self.root, pattern)? {
                let contents = tokio::fs::read(&source.path)
                    .await
                    .with_context(|| format!("reading source file {:?}", source.path))?;
                items.push(BatchItem {
                    name: source.rel,
                    contents,
                });
            }
        }

        Ok(items)
    }

    async fn write_items(&self, spec: &PipelineSpec, items: &[BatchItem]) -> Result<()> {
        let dest_dir = self.root.join(&spec.dest);

        for item in items {
            let path = dest_dir.join(&item.name);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating destination directory {:?}", parent))?;
            }
            tokio::fs::write(&path, &item.contents)
                .await
                .with_context(|| format!("writing artifact {:?}", path))?;
            debug!(path = %path.display(), bytes = item.contents.len(), "wrote artifact");
        }

        Ok(())
    }
}

/// Join all items, in resolution order, into a single named artifact.
/// Items are separated by a newline so text sources stay line-addressable.
fn concat_items(name: &str, items: Vec<BatchItem>) -> BatchItem {
    let mut contents = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 && !contents.ends_with(b"\n") {
            contents.push(b'\n');
        }
        contents.extend_from_slice(&item.contents);
    }
    BatchItem {
        name: name.to_string(),
        contents,
    }
}

impl PipelineDriver for PipelineRunner {
    fn run_leaf<'a>(
        &'a self,
        task: &'a str,
        spec: &'a PipelineSpec,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.run(task, spec))
    }
}
