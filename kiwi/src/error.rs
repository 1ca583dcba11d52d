//! All error types for the kiwi crate.
//!
//! Engines never let a per-file error escape: they are recorded as
//! [`crate::report::Issue`]s instead. The variants below are what the
//! individual building blocks return.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("invalid glob: {0}")]
    Glob(#[from] globset::Error),

    #[error("scan error in {file} at offset {offset}: {message}")]
    Scan {
        file: PathBuf,
        offset: usize,
        message: String,
    },

    #[error("no free key for `{candidate}` after {attempts} attempts")]
    KeyCollisionExhausted { candidate: String, attempts: usize },

    #[error("key `{key}` has no value in the dictionary")]
    DictionaryLookupMiss { key: String },

    #[error("edits overlap: [{}, {}) and [{}, {})", first.0, first.1, second.0, second.1)]
    OverlappingEdits {
        first: (usize, usize),
        second: (usize, usize),
    },

    #[error("edit [{start}, {end}) is outside the source ({len} bytes) or splits a character")]
    EditOutOfBounds { start: usize, end: usize, len: usize },

    #[error("dictionary file {file}: {message}")]
    DictionaryFormat { file: PathBuf, message: String },

    #[error("invalid key prefix `{0}`: must start with I18N followed by `.segment` parts")]
    InvalidPrefix(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("translation unavailable: {0}")]
    Translation(String),
}

impl Error {
    /// Creates a scan error anchored at a byte offset of `file`.
    pub fn scan(file: impl Into<PathBuf>, offset: usize, message: impl Into<String>) -> Self {
        Error::Scan {
            file: file.into(),
            offset,
            message: message.into(),
        }
    }

    /// Creates a dictionary format error for `file`.
    pub fn dictionary_format(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::DictionaryFormat {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        assert!(error.to_string().contains("I/O error"));
        assert!(error.to_string().contains("File not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let error = Error::Json(json_error);
        assert!(error.to_string().contains("JSON error"));
    }

    #[test]
    fn test_scan_error() {
        let error = Error::scan("src/a.ts", 42, "unterminated string literal");
        assert_eq!(
            error.to_string(),
            "scan error in src/a.ts at offset 42: unterminated string literal"
        );
    }

    #[test]
    fn test_key_collision_exhausted() {
        let error = Error::KeyCollisionExhausted {
            candidate: "home.baoCun".to_string(),
            attempts: 10_000,
        };
        assert_eq!(
            error.to_string(),
            "no free key for `home.baoCun` after 10000 attempts"
        );
    }

    #[test]
    fn test_overlapping_edits() {
        let error = Error::OverlappingEdits {
            first: (0, 5),
            second: (3, 8),
        };
        assert_eq!(error.to_string(), "edits overlap: [0, 5) and [3, 8)");
    }

    #[test]
    fn test_invalid_prefix() {
        let error = Error::InvalidPrefix("foo.bar".to_string());
        assert!(error.to_string().contains("foo.bar"));
        assert!(error.to_string().contains("I18N"));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::DictionaryLookupMiss {
            key: "home.title".to_string(),
        };
        let debug = format!("{:?}", error);
        assert!(debug.contains("DictionaryLookupMiss"));
        assert!(debug.contains("home.title"));
    }
}
