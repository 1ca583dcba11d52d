//! Candidate source file discovery.
//!
//! Uses `ignore` for `.gitignore`-aware traversal and `globset` for the
//! project's own ignore lists.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::debug;

use crate::error::Result;

/// What to skip while collecting source files.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub ignore_dirs: Vec<String>,
    pub ignore_files: Vec<String>,
    pub extensions: Vec<String>,
    /// Directories never entered, such as the dictionary store.
    pub exclude: Vec<PathBuf>,
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_dirs(mut self, dirs: Vec<String>) -> Self {
        self.ignore_dirs = dirs;
        self
    }

    pub fn with_ignore_files(mut self, files: Vec<String>) -> Self {
        self.ignore_files = files;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_exclude(mut self, dir: PathBuf) -> Self {
        self.exclude.push(dir);
        self
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

struct Filter {
    root: PathBuf,
    dirs: GlobSet,
    files: GlobSet,
    extensions: Vec<String>,
    exclude: Vec<PathBuf>,
}

impl Filter {
    fn new(root: &Path, options: &WalkOptions) -> Result<Filter> {
        Ok(Filter {
            root: root.to_path_buf(),
            dirs: build_globset(&options.ignore_dirs)?,
            files: build_globset(&options.ignore_files)?,
            extensions: options.extensions.clone(),
            exclude: options.exclude.clone(),
        })
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|dir| path.starts_with(dir))
    }

    fn skip_dir(&self, path: &Path) -> bool {
        if path.file_name().is_some_and(|n| n == "node_modules") || self.is_excluded(path) {
            return true;
        }
        let relative = self.relative(path);
        self.dirs.is_match(relative)
            || path.file_name().is_some_and(|n| self.dirs.is_match(n))
    }

    fn accept_file(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
        if !has_extension || self.is_excluded(path) {
            return false;
        }
        let relative = self.relative(path);
        if self.files.is_match(relative) || path.file_name().is_some_and(|n| self.files.is_match(n)) {
            return false;
        }
        // Files below an ignored directory given explicitly.
        !relative
            .ancestors()
            .skip(1)
            .filter(|a| !a.as_os_str().is_empty())
            .any(|a| self.skip_dir(&self.root.join(a)))
    }
}

/// Every candidate source file under `start`, sorted.
pub fn list_files(root: &Path, start: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>> {
    let filter = Arc::new(Filter::new(root, options)?);
    let mut out = BTreeSet::new();
    walk_dir(&filter, start, &mut out)?;
    debug!(start = %start.display(), files = out.len(), "collected source files");
    Ok(out.into_iter().collect())
}

fn walk_dir(filter: &Arc<Filter>, start: &Path, out: &mut BTreeSet<PathBuf>) -> Result<()> {
    let prune = Arc::clone(filter);
    let walker = WalkBuilder::new(start)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .hidden(true)
        .ignore(true)
        .parents(true)
        .filter_entry(move |entry| {
            !(entry.file_type().is_some_and(|t| t.is_dir()) && prune.skip_dir(entry.path()))
        })
        .build();

    for entry in walker {
        let entry = entry?;
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_file() && filter.accept_file(entry.path()) {
            out.insert(entry.path().to_path_buf());
        }
    }
    Ok(())
}

/// Resolves explicit inputs (files or directories, relative to `root`) into
/// candidate source files. Directories are walked; files are kept when they
/// pass the same filters.
pub fn collect_targets(root: &Path, inputs: &[PathBuf], options: &WalkOptions) -> Result<Vec<PathBuf>> {
    let filter = Arc::new(Filter::new(root, options)?);
    let mut out = BTreeSet::new();
    for input in inputs {
        let path = root.join(input);
        if path.is_dir() {
            walk_dir(&filter, &path, &mut out)?;
        } else if path.is_file() {
            if filter.accept_file(&path) {
                out.insert(path);
            }
        } else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
            .into());
        }
    }
    Ok(out.into_iter().collect())
}
