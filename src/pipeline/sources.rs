// src/pipeline/sources.rs

use std::path::{Path, PathBuf};

use globset::Glob;
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{PipewrightError, Result};

/// One file matched by a source pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Absolute (or root-joined) path to the file on disk.
    pub path: PathBuf,
    /// Path relative to the pattern's static prefix, with forward slashes.
    ///
    /// This is the name the file keeps under the destination directory, so
    /// `app/src/img/**/*` preserves subdirectories below `app/src/img`.
    pub rel: String,
}

/// Expand a single glob pattern against the filesystem under `root`.
///
/// Results come back in deterministic enumeration order (directory walk
/// sorted by file name). Resolution happens at call time on every run; the
/// current filesystem state is always what gets matched.
///
/// - A literal pattern (no glob metacharacters) that does not name an
///   existing file is an error.
/// - A glob pattern with zero matches resolves to an empty list.
pub fn resolve_pattern(root: &Path, pattern: &str) -> Result<Vec<ResolvedSource>> {
    let (prefix, rest) = split_static_prefix(pattern);

    if rest.is_empty() {
        // Literal path, no globbing needed.
        let path = root.join(&prefix);
        if !path.is_file() {
            return Err(PipewrightError::MissingSource(path));
        }
        let rel = Path::new(&prefix)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| prefix.clone());
        return Ok(vec![ResolvedSource { path, rel }]);
    }

    let matcher = Glob::new(pattern)?.compile_matcher();

    let base = if prefix.is_empty() {
        root.to_path_buf()
    } else {
        root.join(&prefix)
    };

    if !base.is_dir() {
        debug!(pattern, base = %base.display(), "glob base directory missing; no matches");
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    for entry in WalkDir::new(&base).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            PipewrightError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other("filesystem walk failed")
            }))
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel_to_root) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel_str = slashed(rel_to_root);

        if matcher.is_match(&rel_str) {
            let rel = entry
                .path()
                .strip_prefix(&base)
                .map(slashed)
                .unwrap_or_else(|_| rel_str.clone());
            matches.push(ResolvedSource {
                path: entry.path().to_path_buf(),
                rel,
            });
        }
    }

    debug!(pattern, count = matches.len(), "resolved source pattern");
    Ok(matches)
}

/// Split a pattern into its leading literal directory components and the
/// remainder starting at the first component containing a metacharacter.
///
/// `"app/src/scss/*.scss"` -> (`"app/src/scss"`, `"*.scss"`),
/// `"app/index.html"` -> (`"app/index.html"`, `""`).
fn split_static_prefix(pattern: &str) -> (String, String) {
    let mut literal = Vec::new();
    let mut components = pattern.split('/').peekable();

    while let Some(part) = components.peek() {
        if has_meta(part) {
            break;
        }
        literal.push(*part);
        components.next();
    }

    let rest: Vec<&str> = components.collect();
    (literal.join("/"), rest.join("/"))
}

fn has_meta(component: &str) -> bool {
    component
        .chars()
        .any(|c| matches!(c, '*' | '?' | '[' | ']' | '{' | '}'))
}

fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
