//! Run reports with counters and per-file issues.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;
use crate::scanner::{Range, TextOccurrence};

/// Issue type captured during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ScanError,
    KeyCollisionExhausted,
    DictionaryLookupMiss,
    EditError,
    IoError,
    DictionaryError,
}

impl IssueKind {
    fn of(error: &Error) -> IssueKind {
        match error {
            Error::Scan { .. } => IssueKind::ScanError,
            Error::KeyCollisionExhausted { .. } => IssueKind::KeyCollisionExhausted,
            Error::DictionaryLookupMiss { .. } => IssueKind::DictionaryLookupMiss,
            Error::OverlappingEdits { .. } | Error::EditOutOfBounds { .. } => IssueKind::EditError,
            Error::Io(_) | Error::Walk(_) => IssueKind::IoError,
            Error::DictionaryFormat { .. }
            | Error::Json(_)
            | Error::Glob(_)
            | Error::InvalidPrefix(_)
            | Error::Config(_)
            | Error::Translation(_) => IssueKind::DictionaryError,
        }
    }
}

/// Something that went wrong with one file or one occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub message: String,
}

impl Issue {
    /// An issue for a whole file.
    pub fn file(path: &Path, error: &Error) -> Issue {
        let issue = Issue {
            kind: IssueKind::of(error),
            file: path.to_path_buf(),
            range: None,
            text: None,
            message: error.to_string(),
        };
        warn!(file = %path.display(), kind = ?issue.kind, "{}", issue.message);
        issue
    }

    /// An issue tied to one occurrence in a file.
    pub fn occurrence(path: &Path, occurrence: &TextOccurrence, error: &Error) -> Issue {
        let issue = Issue {
            kind: IssueKind::of(error),
            file: path.to_path_buf(),
            range: Some(occurrence.range),
            text: Some(occurrence.text.clone()),
            message: error.to_string(),
        };
        warn!(
            file = %path.display(),
            start = occurrence.range.start,
            kind = ?issue.kind,
            "{}",
            issue.message
        );
        issue
    }
}

/// A dictionary entry minted during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub key: String,
    pub text: String,
}

/// Extraction report with counters and issues.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractReport {
    pub dry_run: bool,
    pub files_scanned: usize,
    pub files_changed: usize,
    pub occurrences: usize,
    pub reused_keys: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub new_entries: Vec<NewEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub files_written: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dictionary_files_written: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub issues: Vec<Issue>,
}

/// Restore report with counters and issues.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RestoreReport {
    pub dry_run: bool,
    pub files_scanned: usize,
    pub files_changed: usize,
    pub restored: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub files_written: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub issues: Vec<Issue>,
}
