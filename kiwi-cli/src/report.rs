use std::collections::BTreeMap;
use std::path::Path;

use kiwi::{Issue, IssueKind};

/// Write a report payload as pretty JSON.
pub fn write_report(path: &Path, payload: &serde_json::Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(payload)
        .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
    std::fs::write(path, text)
        .map_err(|e| format!("Failed to write report JSON '{}': {}", path.display(), e))
}

pub fn print_issues(issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }
    println!("Issues: {}", issues.len());
    for issue in issues {
        match &issue.range {
            Some(range) => println!(
                "  [{}] {} @{}..{}: {}",
                kind_label(issue.kind),
                issue.file.display(),
                range.start,
                range.end,
                issue.message
            ),
            None => println!(
                "  [{}] {}: {}",
                kind_label(issue.kind),
                issue.file.display(),
                issue.message
            ),
        }
    }
}

/// Error message for `--strict` runs that recorded issues, e.g.
/// `Extract policy failure (scan_error=1, dictionary_lookup_miss=2)`.
pub fn strict_failure(command: &str, issues: &[Issue]) -> String {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for issue in issues {
        *counts.entry(kind_label(issue.kind)).or_default() += 1;
    }
    let reasons: Vec<String> = counts
        .into_iter()
        .map(|(kind, count)| format!("{}={}", kind, count))
        .collect();
    format!("{} policy failure ({})", command, reasons.join(", "))
}

fn kind_label(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::ScanError => "scan_error",
        IssueKind::KeyCollisionExhausted => "key_collision_exhausted",
        IssueKind::DictionaryLookupMiss => "dictionary_lookup_miss",
        IssueKind::EditError => "edit_error",
        IssueKind::IoError => "io_error",
        IssueKind::DictionaryError => "dictionary_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn issue(kind: IssueKind) -> Issue {
        Issue {
            kind,
            file: PathBuf::from("src/a.ts"),
            range: None,
            text: None,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_strict_failure_counts_by_kind() {
        let issues = vec![
            issue(IssueKind::DictionaryLookupMiss),
            issue(IssueKind::ScanError),
            issue(IssueKind::DictionaryLookupMiss),
        ];
        assert_eq!(
            strict_failure("Restore", &issues),
            "Restore policy failure (dictionary_lookup_miss=2, scan_error=1)"
        );
    }
}
