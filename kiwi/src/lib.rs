#![forbid(unsafe_code)]
//! Source-text internationalization for JS/TS/Vue projects.
//!
//! `kiwi` finds Chinese copy in source files, moves it into keyed language
//! dictionaries and rewrites the source to reference the keys (`I18N.home.title`).
//! The restore direction swaps key references passed to chosen calls back to
//! their literal text.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kiwi::{ExtractEngine, ExtractOptions, FallbackTranslator, ProjectConfig};
//!
//! let root = std::path::Path::new(".");
//! let config = ProjectConfig::load(root)?;
//! let translator = FallbackTranslator;
//! let report = ExtractEngine::new(root, config, &translator)
//!     .run(&ExtractOptions::new().with_dry_run(true))?;
//! println!("{} new entries", report.new_entries.len());
//! # Ok::<(), kiwi::Error>(())
//! ```
//!
//! # Pipeline
//!
//! - **scanner**: lexical scan for literal text with exact byte ranges
//! - **assign**: key reuse by value, collision-free key minting
//! - **replace**: batch range replacement, applied from the end of the file
//! - **store**: `<kiwiDir>/<locale>/<namespace>.ts` dictionary modules

pub mod assign;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod extract;
pub mod object_literal;
pub mod replace;
pub mod report;
pub mod restore;
pub mod scanner;
pub mod store;
pub mod suggest;
pub mod translate;
pub mod walk;

/// Root identifier every key reference starts with.
pub const KEY_ROOT: &str = "I18N";

// Re-export most used types for easy consumption
pub use crate::{
    assign::{KeyAssigner, KeyAssignment, parse_prefix},
    config::ProjectConfig,
    dictionary::LanguageDictionary,
    error::{Error, Result},
    extract::{ExtractEngine, ExtractOptions, extract_source},
    replace::{Edit, ReplacementPlan, replace_ranges},
    report::{ExtractReport, Issue, IssueKind, RestoreReport},
    restore::{RestoreEngine, RestoreOptions, parse_function_list, restore_source},
    scanner::{OccurrenceKind, Range, ScanOptions, TextOccurrence, find_chinese_text},
    store::DictionaryStore,
    suggest::suggest_namespace,
    translate::{FallbackTranslator, GlossaryTranslator, Translator},
};
