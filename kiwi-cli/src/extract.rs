use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use kiwi::{
    ExtractEngine, ExtractOptions, ExtractReport, FallbackTranslator, GlossaryTranslator,
    ProjectConfig, Translator,
};
use serde_json::json;
use tracing::debug;

use crate::report::{print_issues, strict_failure, write_report};
use crate::validation::{
    validate_file_path, validate_input_path, validate_output_path, validate_prefix, validate_root,
};

#[derive(Debug, Clone)]
pub struct ExtractCommandOptions {
    pub root: PathBuf,
    pub target: Option<PathBuf>,
    pub prefix: Option<String>,
    pub glossary: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
    pub dry_run: bool,
    pub strict: bool,
}

pub fn run_extract_command(opts: ExtractCommandOptions) -> Result<(), String> {
    validate_root(&opts.root)?;
    if let Some(target) = &opts.target {
        validate_input_path(&opts.root, target)?;
    }
    if let Some(prefix) = &opts.prefix {
        validate_prefix(prefix)?;
    }
    if let Some(glossary) = &opts.glossary {
        validate_file_path(glossary)?;
    }
    if let Some(report_path) = &opts.report_json {
        validate_output_path(report_path)?;
    }

    let config = ProjectConfig::load(&opts.root).map_err(|e| e.to_string())?;
    debug!(src_lang = %config.src_lang, kiwi_dir = %config.kiwi_dir, "loaded project config");
    let translator: Box<dyn Translator> = match &opts.glossary {
        Some(path) => {
            let glossary = GlossaryTranslator::from_file(path)
                .map_err(|e| format!("Failed to load glossary '{}': {}", path.display(), e))?;
            Box::new(glossary)
        }
        None => Box::new(FallbackTranslator),
    };

    let mut options = ExtractOptions::new().with_dry_run(opts.dry_run);
    if let Some(target) = &opts.target {
        options = options.with_target(target.clone());
    }
    if let Some(prefix) = &opts.prefix {
        options = options.with_prefix(prefix.clone());
    }

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap(),
    );
    progress_bar.set_message("Scanning source files...");

    let engine = ExtractEngine::new(&opts.root, config, translator.as_ref());
    let report = match engine.run_with_progress(&options, |index, total, file| {
        progress_bar.set_message(format!("[{}/{}] {}", index + 1, total, file.display()));
        progress_bar.tick();
    }) {
        Ok(report) => report,
        Err(e) => {
            progress_bar.finish_with_message("❌ Extraction failed");
            return Err(e.to_string());
        }
    };
    progress_bar.finish_with_message(format!(
        "✅ Scanned {} file(s)",
        report.files_scanned
    ));

    println!("Files scanned: {}", report.files_scanned);
    println!("Files changed: {}", report.files_changed);
    println!("Occurrences replaced: {}", report.occurrences);
    println!("Reused keys: {}", report.reused_keys);
    println!("New entries: {}", report.new_entries.len());
    for entry in &report.new_entries {
        println!("  + {} = {}", entry.key, entry.text);
    }
    for path in &report.dictionary_files_written {
        println!("Dictionary written: {}", path.display());
    }
    print_issues(&report.issues);

    if let Some(report_path) = &opts.report_json {
        write_report(report_path, &extract_payload(&opts, &report))?;
        println!("Report JSON written: {}", report_path.display());
    }

    if opts.strict && !report.issues.is_empty() {
        return Err(strict_failure("Extract", &report.issues));
    }

    if opts.dry_run {
        println!("Dry-run mode: no files were written");
    }
    Ok(())
}

fn extract_payload(opts: &ExtractCommandOptions, report: &ExtractReport) -> serde_json::Value {
    json!({
        "command": "extract",
        "root": opts.root,
        "target": opts.target,
        "prefix": opts.prefix,
        "strict": opts.strict,
        "dry_run": opts.dry_run,
        "summary": {
            "files_scanned": report.files_scanned,
            "files_changed": report.files_changed,
            "occurrences": report.occurrences,
            "reused_keys": report.reused_keys,
            "new_entries": report.new_entries.len(),
            "issues": report.issues.len()
        },
        "new_entries": report.new_entries,
        "files_written": report.files_written,
        "dictionary_files_written": report.dictionary_files_written,
        "issues": report.issues
    })
}
