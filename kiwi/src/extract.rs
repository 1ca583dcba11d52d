//! Extraction: literal text → dictionary entries + key references.

use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::KEY_ROOT;
use crate::assign::{KeyAssigner, KeyAssignment, parse_prefix};
use crate::config::ProjectConfig;
use crate::error::Result;
use crate::replace::{Edit, ReplacementPlan};
use crate::report::{ExtractReport, Issue, NewEntry};
use crate::scanner::{OccurrenceKind, ScanOptions, find_chinese_text, script_start};
use crate::store::DictionaryStore;
use crate::suggest::suggest_namespace;
use crate::translate::Translator;
use crate::walk::{WalkOptions, collect_targets};

lazy_static! {
    static ref IMPORT_I18N_REGEX: Regex = Regex::new(r"(?m)^\s*import\s+I18N\b").unwrap();
}

/// Options for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// File or directory to process, relative to the root. Defaults to the root.
    pub target: Option<PathBuf>,
    /// Explicit key prefix such as `I18N.common`.
    pub prefix: Option<String>,
    /// Compute everything, write nothing.
    pub dry_run: bool,
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// The rewrite computed for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExtraction {
    pub output: String,
    pub assignments: Vec<KeyAssignment>,
    /// Occurrences that got no key.
    pub issues: Vec<Issue>,
}

/// The expression that replaces an occurrence's range.
pub fn replacement_expression(assignment: &KeyAssignment) -> String {
    let reference = assignment.reference();
    match &assignment.occurrence.kind {
        OccurrenceKind::TemplateLiteral { expressions } if !expressions.is_empty() => {
            let values = expressions
                .iter()
                .enumerate()
                .map(|(i, expr)| format!("val{}: {}", i + 1, expr))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{KEY_ROOT}.get({reference}, {{ {values} }})")
        }
        OccurrenceKind::JsxText | OccurrenceKind::JsxAttribute => format!("{{{reference}}}"),
        OccurrenceKind::VueText => format!("{{{{ {reference} }}}}"),
        OccurrenceKind::VueAttribute { name } => format!(":{name}=\"{reference}\""),
        _ => reference,
    }
}

/// `true` when `source` already imports the key mechanism.
pub fn has_import(source: &str, import_statement: &str) -> bool {
    let statement = import_statement.trim();
    (!statement.is_empty() && source.contains(statement)) || IMPORT_I18N_REGEX.is_match(source)
}

/// Scans `source`, assigns keys and computes the rewritten text.
///
/// `path` decides the dialect and the key namespace. Nothing is written.
pub fn extract_source(
    source: &str,
    path: &Path,
    assigner: &mut KeyAssigner<'_>,
    scan: &ScanOptions,
    import_statement: &str,
) -> Result<FileExtraction> {
    let occurrences = find_chinese_text(source, path, scan)?;
    let namespace = suggest_namespace(path);
    debug!(file = %path.display(), occurrences = occurrences.len(), "scanned");

    let mut plan = ReplacementPlan::new();
    let mut assignments = Vec::new();
    let mut issues = Vec::new();

    for occurrence in occurrences {
        match assigner.assign(&namespace, occurrence.clone()) {
            Ok(assignment) => {
                plan.push(Edit::new(
                    assignment.occurrence.range.start,
                    assignment.occurrence.range.end,
                    replacement_expression(&assignment),
                ));
                assignments.push(assignment);
            }
            Err(err) => issues.push(Issue::occurrence(path, &occurrence, &err)),
        }
    }

    if !assignments.is_empty() && !import_statement.trim().is_empty() && !has_import(source, import_statement) {
        match script_start(source, path) {
            Some(at) => plan.push(Edit::insert(at, format!("{}\n", import_statement.trim()))),
            None => warn!(file = %path.display(), "no <script> block, import not inserted"),
        }
    }

    let output = plan.apply(source)?;
    Ok(FileExtraction {
        output,
        assignments,
        issues,
    })
}

/// Runs extraction over a project.
pub struct ExtractEngine<'a> {
    root: PathBuf,
    config: ProjectConfig,
    translator: &'a dyn Translator,
}

impl<'a> ExtractEngine<'a> {
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig, translator: &'a dyn Translator) -> Self {
        ExtractEngine {
            root: root.into(),
            config,
            translator,
        }
    }

    pub fn store(&self) -> Result<DictionaryStore> {
        Ok(DictionaryStore::new(
            self.config.kiwi_dir_path(&self.root),
            self.config.module_format()?,
        ))
    }

    /// Candidate files for `options`, sorted.
    pub fn files(&self, options: &ExtractOptions) -> Result<Vec<PathBuf>> {
        let walk = WalkOptions::new()
            .with_ignore_dirs(self.config.ignore_dir.clone())
            .with_ignore_files(self.config.ignore_file.clone())
            .with_extensions(self.config.extensions.clone())
            .with_exclude(self.config.kiwi_dir_path(&self.root));
        let target = options.target.clone().unwrap_or_else(|| self.root.clone());
        collect_targets(&self.root, &[target], &walk)
    }

    pub fn run(&self, options: &ExtractOptions) -> Result<ExtractReport> {
        self.run_with_progress(options, |_, _, _| {})
    }

    /// Like [`run`](Self::run), calling `progress(index, total, file)` before each file.
    ///
    /// Only setup failures (bad prefix, unreadable dictionary, walk errors)
    /// return `Err`; per-file problems land in the report.
    pub fn run_with_progress<F>(&self, options: &ExtractOptions, mut progress: F) -> Result<ExtractReport>
    where
        F: FnMut(usize, usize, &Path),
    {
        let prefix = options.prefix.as_deref().map(parse_prefix).transpose()?;
        let store = self.store()?;
        let dictionary = store.load_locale(&self.config.src_lang)?;
        let mut assigner = KeyAssigner::new(dictionary, self.translator).with_prefix(prefix);
        let scan = ScanOptions::extract(self.config.ignore_fn_list.iter().cloned());
        let files = self.files(options)?;

        let mut report = ExtractReport {
            dry_run: options.dry_run,
            ..ExtractReport::default()
        };
        for (index, file) in files.iter().enumerate() {
            let relative = file.strip_prefix(&self.root).unwrap_or(file);
            progress(index, files.len(), relative);
            self.extract_file(&store, &mut assigner, &scan, file, options.dry_run, &mut report);
        }
        info!(
            files = report.files_scanned,
            changed = report.files_changed,
            new_entries = report.new_entries.len(),
            issues = report.issues.len(),
            "extraction finished"
        );
        Ok(report)
    }

    fn extract_file(
        &self,
        store: &DictionaryStore,
        assigner: &mut KeyAssigner<'_>,
        scan: &ScanOptions,
        file: &Path,
        dry_run: bool,
        report: &mut ExtractReport,
    ) {
        let relative = file.strip_prefix(&self.root).unwrap_or(file);
        report.files_scanned += 1;

        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(err) => {
                report.issues.push(Issue::file(relative, &err.into()));
                return;
            }
        };

        let checkpoint = assigner.checkpoint();
        let extraction = match extract_source(&source, relative, assigner, scan, &self.config.import_i18n) {
            Ok(extraction) => extraction,
            Err(err) => {
                assigner.rollback(checkpoint);
                report.issues.push(Issue::file(relative, &err));
                return;
            }
        };
        report.issues.extend(extraction.issues);
        if extraction.assignments.is_empty() {
            return;
        }

        let new_entries: Vec<(String, String)> = extraction
            .assignments
            .iter()
            .filter(|a| a.needs_write)
            .map(|a| (a.key.clone(), a.occurrence.text.clone()))
            .collect();
        let changed = extraction.output != source;

        if !dry_run {
            // Entries go first: a failed source write then only leaves unused
            // entries, which the next run reuses by value.
            match store.persist(&self.config.src_lang, &new_entries) {
                Ok(written) => {
                    for path in written {
                        if !report.dictionary_files_written.contains(&path) {
                            report.dictionary_files_written.push(path);
                        }
                    }
                }
                Err(err) => {
                    assigner.rollback(checkpoint);
                    report.issues.push(Issue::file(relative, &err));
                    return;
                }
            }
            if changed {
                if let Err(err) = fs::write(file, &extraction.output) {
                    report.issues.push(Issue::file(relative, &err.into()));
                    return;
                }
                info!(file = %relative.display(), keys = extraction.assignments.len(), "rewrote source");
                report.files_written.push(relative.to_path_buf());
            }
        }

        if changed {
            report.files_changed += 1;
        }
        report.occurrences += extraction.assignments.len();
        report.reused_keys += extraction.assignments.iter().filter(|a| !a.needs_write).count();
        report
            .new_entries
            .extend(new_entries.into_iter().map(|(key, text)| NewEntry { key, text }));
    }
}
