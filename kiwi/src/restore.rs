//! Restore: key references → the literal text they stand for.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::KEY_ROOT;
use crate::config::ProjectConfig;
use crate::dictionary::LanguageDictionary;
use crate::error::{Error, Result};
use crate::object_literal::quote_single;
use crate::replace::{Edit, ReplacementPlan};
use crate::report::{Issue, RestoreReport};
use crate::scanner::{OccurrenceKind, ScanOptions, TextOccurrence, find_chinese_text};
use crate::store::DictionaryStore;
use crate::walk::{WalkOptions, collect_targets};

/// Options for one restore run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Files or directories, relative to the root. Empty means the root.
    pub inputs: Vec<PathBuf>,
    /// Calls whose key-reference arguments are restored.
    pub functions: Vec<String>,
    /// Dictionary location; defaults to `<kiwiDir>/<srcLang>`.
    pub dictionary: Option<PathBuf>,
    pub dry_run: bool,
}

impl RestoreOptions {
    pub fn new<I, S>(functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RestoreOptions {
            functions: functions.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.inputs.push(input.into());
        self
    }

    pub fn with_dictionary(mut self, path: impl Into<PathBuf>) -> Self {
        self.dictionary = Some(path.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Splits a `;`-separated function list, dropping blanks.
pub fn parse_function_list(list: &str) -> Vec<String> {
    list.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn escape_template(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// The literal that replaces a key reference whose dictionary value is `text`.
pub fn restored_literal(text: &str, kind: &OccurrenceKind) -> String {
    match kind {
        OccurrenceKind::KeyCall { values } if !values.is_empty() => {
            let mut out = escape_template(text);
            for (name, expr) in values {
                out = out.replace(&format!("{{{name}}}"), &format!("${{{expr}}}"));
            }
            format!("`{out}`")
        }
        _ => quote_single(text),
    }
}

/// The rewrite computed for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRestore {
    pub output: String,
    pub restored: usize,
    /// References with no dictionary value; their spans are left as they were.
    pub misses: Vec<Issue>,
}

fn lookup<'d>(dictionary: &'d LanguageDictionary, occurrence: &TextOccurrence) -> Option<&'d str> {
    let key = occurrence
        .text
        .strip_prefix(KEY_ROOT)
        .and_then(|k| k.strip_prefix('.'))
        .unwrap_or(&occurrence.text);
    dictionary.get_normalized(key)
}

/// Scans `source` for key references in the target calls and swaps each one
/// for its literal text. Nothing is written.
pub fn restore_source(
    source: &str,
    path: &Path,
    dictionary: &LanguageDictionary,
    scan: &ScanOptions,
) -> Result<FileRestore> {
    let occurrences = find_chinese_text(source, path, scan)?;
    debug!(file = %path.display(), references = occurrences.len(), "scanned");

    let mut plan = ReplacementPlan::new();
    let mut misses = Vec::new();
    for occurrence in &occurrences {
        match lookup(dictionary, occurrence) {
            Some(text) => plan.push(Edit::new(
                occurrence.range.start,
                occurrence.range.end,
                restored_literal(text, &occurrence.kind),
            )),
            None => {
                let key = occurrence.text.clone();
                misses.push(Issue::occurrence(
                    path,
                    occurrence,
                    &Error::DictionaryLookupMiss { key },
                ));
            }
        }
    }

    Ok(FileRestore {
        restored: plan.len(),
        output: plan.apply(source)?,
        misses,
    })
}

/// Runs restore over a project.
pub struct RestoreEngine {
    root: PathBuf,
    config: ProjectConfig,
}

impl RestoreEngine {
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        RestoreEngine {
            root: root.into(),
            config,
        }
    }

    /// Loads the dictionary named by `options`, or the source locale.
    pub fn dictionary(&self, options: &RestoreOptions) -> Result<LanguageDictionary> {
        match &options.dictionary {
            Some(path) => DictionaryStore::load_path(&self.root.join(path)),
            None => DictionaryStore::new(
                self.config.kiwi_dir_path(&self.root),
                self.config.module_format()?,
            )
            .load_locale(&self.config.src_lang),
        }
    }

    /// Candidate files for `options`, sorted; never inside the dictionary store.
    pub fn files(&self, options: &RestoreOptions) -> Result<Vec<PathBuf>> {
        let walk = WalkOptions::new()
            .with_ignore_dirs(self.config.ignore_dir.clone())
            .with_ignore_files(self.config.ignore_file.clone())
            .with_extensions(self.config.extensions.clone())
            .with_exclude(self.config.kiwi_dir_path(&self.root));
        let inputs = if options.inputs.is_empty() {
            vec![self.root.clone()]
        } else {
            options.inputs.clone()
        };
        collect_targets(&self.root, &inputs, &walk)
    }

    pub fn run(&self, options: &RestoreOptions) -> Result<RestoreReport> {
        self.run_with_progress(options, |_, _, _| {})
    }

    /// Like [`run`](Self::run), calling `progress(index, total, file)` before each file.
    pub fn run_with_progress<F>(&self, options: &RestoreOptions, mut progress: F) -> Result<RestoreReport>
    where
        F: FnMut(usize, usize, &Path),
    {
        if options.functions.is_empty() {
            return Err(Error::Config("restore needs at least one function name".to_string()));
        }
        let dictionary = self.dictionary(options)?;
        let scan = ScanOptions::restore(options.functions.iter().cloned());
        let files = self.files(options)?;

        let mut report = RestoreReport {
            dry_run: options.dry_run,
            ..RestoreReport::default()
        };
        for (index, file) in files.iter().enumerate() {
            let relative = file.strip_prefix(&self.root).unwrap_or(file);
            progress(index, files.len(), relative);
            report.files_scanned += 1;

            let source = match fs::read_to_string(file) {
                Ok(source) => source,
                Err(err) => {
                    report.issues.push(Issue::file(relative, &err.into()));
                    continue;
                }
            };
            let restore = match restore_source(&source, relative, &dictionary, &scan) {
                Ok(restore) => restore,
                Err(err) => {
                    report.issues.push(Issue::file(relative, &err));
                    continue;
                }
            };
            report.issues.extend(restore.misses);
            if restore.output == source {
                continue;
            }
            if !options.dry_run {
                if let Err(err) = fs::write(file, &restore.output) {
                    report.issues.push(Issue::file(relative, &err.into()));
                    continue;
                }
                info!(file = %relative.display(), restored = restore.restored, "restored source");
                report.files_written.push(relative.to_path_buf());
            }
            report.files_changed += 1;
            report.restored += restore.restored;
        }
        info!(
            files = report.files_scanned,
            changed = report.files_changed,
            restored = report.restored,
            issues = report.issues.len(),
            "restore finished"
        );
        Ok(report)
    }
}
