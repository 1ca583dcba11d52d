use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use kiwi::{ProjectConfig, RestoreEngine, RestoreOptions, RestoreReport};
use serde_json::json;

use crate::report::{print_issues, strict_failure, write_report};
use crate::validation::{
    validate_function_list, validate_input_path, validate_output_path, validate_root,
};

#[derive(Debug, Clone)]
pub struct RestoreCommandOptions {
    pub root: PathBuf,
    /// `;`-separated callee names, as given on the command line.
    pub functions: String,
    /// Comma-separated files or directories relative to root.
    pub files: Option<String>,
    pub dict: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
    pub dry_run: bool,
    pub strict: bool,
}

/// Split a `--file` value on commas, dropping blanks.
pub fn parse_file_list(list: &str) -> Vec<PathBuf> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

pub fn run_restore_command(opts: RestoreCommandOptions) -> Result<(), String> {
    validate_root(&opts.root)?;
    let functions = validate_function_list(&opts.functions)?;
    let inputs = opts.files.as_deref().map(parse_file_list).unwrap_or_default();
    for input in &inputs {
        validate_input_path(&opts.root, input)?;
    }
    if let Some(dict) = &opts.dict {
        validate_input_path(&opts.root, dict)?;
    }
    if let Some(report_path) = &opts.report_json {
        validate_output_path(report_path)?;
    }

    let config = ProjectConfig::load(&opts.root).map_err(|e| e.to_string())?;
    let mut options = RestoreOptions::new(functions.iter().cloned()).with_dry_run(opts.dry_run);
    for input in &inputs {
        options = options.with_input(input.clone());
    }
    if let Some(dict) = &opts.dict {
        options = options.with_dictionary(dict.clone());
    }

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap(),
    );
    progress_bar.set_message("Loading dictionary...");

    let engine = RestoreEngine::new(&opts.root, config);
    let report = match engine.run_with_progress(&options, |index, total, file| {
        progress_bar.set_message(format!("[{}/{}] {}", index + 1, total, file.display()));
        progress_bar.tick();
    }) {
        Ok(report) => report,
        Err(e) => {
            progress_bar.finish_with_message("❌ Restore failed");
            return Err(e.to_string());
        }
    };
    progress_bar.finish_with_message(format!(
        "✅ Scanned {} file(s)",
        report.files_scanned
    ));

    println!("Functions: {}", functions.join(", "));
    println!("Files scanned: {}", report.files_scanned);
    println!("Files changed: {}", report.files_changed);
    println!("Restored: {}", report.restored);
    print_issues(&report.issues);

    if let Some(report_path) = &opts.report_json {
        write_report(report_path, &restore_payload(&opts, &functions, &report))?;
        println!("Report JSON written: {}", report_path.display());
    }

    if opts.strict && !report.issues.is_empty() {
        return Err(strict_failure("Restore", &report.issues));
    }

    if opts.dry_run {
        println!("Dry-run mode: no files were written");
    }
    Ok(())
}

fn restore_payload(
    opts: &RestoreCommandOptions,
    functions: &[String],
    report: &RestoreReport,
) -> serde_json::Value {
    json!({
        "command": "restore",
        "root": opts.root,
        "functions": functions,
        "dict": opts.dict,
        "strict": opts.strict,
        "dry_run": opts.dry_run,
        "summary": {
            "files_scanned": report.files_scanned,
            "files_changed": report.files_changed,
            "restored": report.restored,
            "issues": report.issues.len()
        },
        "files_written": report.files_written,
        "issues": report.issues
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_list() {
        assert_eq!(
            parse_file_list("src/a.ts, src/pages ,,"),
            vec![PathBuf::from("src/a.ts"), PathBuf::from("src/pages")]
        );
        assert!(parse_file_list("").is_empty());
    }
}
