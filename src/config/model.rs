// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// A small project looks like:
///
/// ```toml
/// [serve]
/// port = 3000
/// root = "app"
/// compile_task = "compile"
///
/// [build]
/// out_dir = "dist"
/// build_task = "build"
///
/// [stage.cssmin]
/// cmd = "cssnano"
///
/// [task.styles]
/// pipeline = { src = ["app/src/scss/*.scss"], dest = "app/src/css", concat = "style.min.css", stages = ["cssmin"] }
/// watch = ["app/src/scss/*.scss"]
/// reload = "partial"
///
/// [task.build]
/// series = ["compile", "collect"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Static server settings from `[serve]`.
    #[serde(default)]
    pub serve: ServeSection,

    /// One-shot build settings from `[build]`.
    #[serde(default)]
    pub build: BuildSection,

    /// Defaults for `watch` / `exclude` from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// External transform commands from `[stage.<name>]`.
    #[serde(default)]
    pub stage: BTreeMap<String, StageConfig>,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[serve]` section: where the dev server runs and which task compiles
/// the site before serving.
#[derive(Debug, Clone, Deserialize)]
pub struct ServeSection {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served as the site root.
    #[serde(default = "default_serve_root")]
    pub root: String,

    /// Task run once before the server starts in `default` mode.
    #[serde(default = "default_compile_task")]
    pub compile_task: String,
}

fn default_port() -> u16 {
    3000
}

fn default_serve_root() -> String {
    "app".to_string()
}

fn default_compile_task() -> String {
    "compile".to_string()
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            root: default_serve_root(),
            compile_task: default_compile_task(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Output directory, deleted and rebuilt from scratch on every `build`.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Task invoked by the `build` subcommand.
    #[serde(default = "default_build_task")]
    pub build_task: String,
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_build_task() -> String {
    "build".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            build_task: default_build_task(),
        }
    }
}

/// `[default]` section: watch/exclude patterns applied to tasks that do not
/// override them.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    #[serde(default)]
    pub watch: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[stage.<name>]` section: one external transform command.
///
/// The command is run as a filter: file contents on stdin, transformed
/// contents expected on stdout. Non-zero exit marks the stage as failed.
#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    pub cmd: String,
}

/// `[task.<name>]` section.
///
/// Exactly one of `pipeline`, `series`, `parallel` must be set; this is
/// enforced by `config::validate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Leaf task: one pipeline invocation.
    #[serde(default)]
    pub pipeline: Option<PipelineConfig>,

    /// Composite task: children run strictly in declared order.
    #[serde(default)]
    pub series: Option<Vec<String>>,

    /// Composite task: children run concurrently.
    #[serde(default)]
    pub parallel: Option<Vec<String>>,

    /// Watch patterns that re-trigger this task on file changes.
    ///
    /// If `None`, the task uses `default.watch` (and gets no binding when
    /// that is empty too).
    #[serde(default)]
    pub watch: Option<Vec<String>>,

    /// Watch exclude patterns; if `None`, the task uses `default.exclude`.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// If true, `default.watch` is appended to `task.watch` instead of
    /// being replaced by it.
    #[serde(default)]
    pub append_default_watch: bool,

    /// If true, `default.exclude` is appended to `task.exclude`.
    #[serde(default)]
    pub append_default_exclude: bool,

    /// Reload signal emitted after a successful watch-triggered run.
    #[serde(default)]
    pub reload: Option<ReloadKind>,
}

impl TaskConfig {
    /// Effective reload kind: `partial` unless the config says otherwise.
    pub fn effective_reload(&self) -> ReloadKind {
        self.reload.unwrap_or(ReloadKind::Partial)
    }
}

/// What the dev server tells connected clients after a successful
/// watch-triggered rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadKind {
    /// No signal at all.
    None,
    /// In-place refresh of styles/scripts.
    Partial,
    /// Full page reload (markup changes).
    Full,
}

/// Inline pipeline table for a leaf task.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Source glob patterns, resolved in declared order on every run.
    pub src: Vec<String>,

    /// Destination directory, relative to the project root.
    pub dest: String,

    /// If set, all resolved sources are concatenated (in resolution order)
    /// into a single artifact with this name before the stages run.
    #[serde(default)]
    pub concat: Option<String>,

    /// Names of `[stage.<name>]` entries applied in order. Empty means the
    /// pipeline is a plain copy.
    #[serde(default)]
    pub stages: Vec<String>,
}
