//! Lesson file discovery.
//!
//! Turns CLI inputs (files and directories) into the deterministic path list
//! the indexer expects. Directories are walked recursively and their lessons
//! sorted by root-relative path; explicit files keep argument order.

use std::path::{Component, Path, PathBuf};

use regex::Regex;
use tracing::{debug, instrument};

use lessondex_shared::{AppConfig, LessondexError, Result};

use crate::assembler::validate_index;

/// Which files count as lessons.
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// Accepted extensions, without the dot, compared case-insensitively.
    pub extensions: Vec<String>,
    /// Root-relative paths matching any of these are skipped.
    pub exclude: Vec<Regex>,
    /// Directories never walked, typically where an index is written.
    pub skip_dirs: Vec<PathBuf>,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["md".into(), "markdown".into()],
            exclude: Vec::new(),
            skip_dirs: Vec::new(),
        }
    }
}

impl DiscoverOptions {
    /// Build options from config, compiling the exclude patterns.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let exclude = config
            .discovery
            .exclude_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    LessondexError::config(format!("invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            extensions: config.defaults.extensions.clone(),
            exclude,
            skip_dirs: Vec::new(),
        })
    }

    /// Never walk into `dir`. It does not need to exist yet.
    pub fn skip_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.skip_dirs
            .push(dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()));
        self
    }

    fn is_skipped_dir(&self, dir: &Path) -> bool {
        if self.skip_dirs.is_empty() {
            return false;
        }
        let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        self.skip_dirs.contains(&dir)
    }

    fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(relative))
    }
}

/// Expand inputs into lesson paths: directories are walked, files pass through.
pub fn expand_inputs(inputs: &[PathBuf], opts: &DiscoverOptions) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        let meta = std::fs::metadata(input).map_err(|e| LessondexError::read(input, e))?;
        if meta.is_dir() {
            paths.extend(discover(input, opts)?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

/// Walk `root` and return every lesson file, sorted by root-relative path.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn discover(root: &Path, opts: &DiscoverOptions) -> Result<Vec<PathBuf>> {
    let mut found: Vec<(String, PathBuf)> = Vec::new();
    walk(root, root, opts, &mut found)?;
    found.sort_by(|a, b| a.0.cmp(&b.0));

    debug!(count = found.len(), "lesson files discovered");
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

fn walk(
    root: &Path,
    dir: &Path,
    opts: &DiscoverOptions,
    found: &mut Vec<(String, PathBuf)>,
) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| LessondexError::read(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| LessondexError::read(dir, e))?;
        let path = entry.path();

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let relative = relative_slash_path(&path, root);
        if opts.is_excluded(&relative) {
            debug!(path = %relative, "excluded by pattern");
            continue;
        }

        let file_type = entry.file_type().map_err(|e| LessondexError::read(&path, e))?;
        if file_type.is_dir() {
            if opts.is_skipped_dir(&path) || is_index_dir(&path) {
                debug!(path = %relative, "skipping index directory");
                continue;
            }
            walk(root, &path, opts, found)?;
        } else if opts.accepts_extension(&path) {
            found.push((relative, path));
        }
    }

    Ok(())
}

/// A directory holding a previously assembled index.
fn is_index_dir(dir: &Path) -> bool {
    dir.join("manifest.json").is_file() && validate_index(dir).is_ok()
}

/// `path` relative to `root`, joined with `/` on every platform.
pub fn relative_slash_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter(|c| matches!(c, Component::Normal(_) | Component::ParentDir))
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
