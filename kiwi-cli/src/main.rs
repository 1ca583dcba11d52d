use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kiwi_cli::logging::init_logging;
use kiwi_cli::{
    ExtractCommandOptions, RestoreCommandOptions, run_extract_command, run_restore_command,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract and restore Chinese copy in JS/TS/Vue projects", long_about = None)]
struct Args {
    /// Project root holding kiwi-config.json (defaults to the current directory)
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Move Chinese literals into the dictionary and reference them by key.
    Extract {
        /// File or directory to scan, relative to the root
        target: Option<PathBuf>,

        /// Fixed key prefix for every new entry, e.g. I18N.common.btn
        #[arg(long)]
        prefix: Option<String>,

        /// JSON file mapping source text to an English phrase used for keys
        #[arg(long)]
        glossary: Option<PathBuf>,

        /// Write a machine-readable report to this path
        #[arg(long)]
        report_json: Option<PathBuf>,

        /// Compute everything but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Exit with an error when any issue was recorded
        #[arg(long)]
        strict: bool,
    },

    /// Put dictionary text back in place of keys passed to the given functions.
    Restore {
        /// Function names separated by `;`, e.g. "message.success;toast"
        #[arg(long = "fn", value_name = "NAMES")]
        functions: String,

        /// Comma-separated files or directories, relative to the root
        #[arg(long = "file", value_name = "PATHS")]
        files: Option<String>,

        /// Dictionary directory, index file or namespace file (defaults to <kiwiDir>/<srcLang>)
        #[arg(long)]
        dict: Option<PathBuf>,

        /// Write a machine-readable report to this path
        #[arg(long)]
        report_json: Option<PathBuf>,

        /// Compute everything but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Exit with an error when any issue was recorded
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.commands {
        Commands::Extract {
            target,
            prefix,
            glossary,
            report_json,
            dry_run,
            strict,
        } => run_extract_command(ExtractCommandOptions {
            root: args.root,
            target,
            prefix,
            glossary,
            report_json,
            dry_run,
            strict,
        }),
        Commands::Restore {
            functions,
            files,
            dict,
            report_json,
            dry_run,
            strict,
        } => run_restore_command(RestoreCommandOptions {
            root: args.root,
            functions,
            files,
            dict,
            report_json,
            dry_run,
            strict,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
