//! CLI library for testing purposes

pub mod extract;
pub mod logging;
pub mod report;
pub mod restore;
pub mod validation;

pub use extract::{ExtractCommandOptions, run_extract_command};
pub use restore::{RestoreCommandOptions, parse_file_list, run_restore_command};
