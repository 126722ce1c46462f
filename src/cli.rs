//! Command-line interface
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

pub mod args;
pub mod output;

use std::{fs, path::Path, path::PathBuf, process};

use clap::Parser;
use miette::Diagnostic;
use thiserror::Error;

use crate::{
    ebnf::{self, Document},
    errors::{print_error, ParseError, Source},
};
use args::{Command, GrammarkitArgs};

// ============================================================================
// CLI ERRORS
// ============================================================================

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("cannot read {}", .path.display())]
    #[diagnostic(code(grammarkit::cli::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error("cannot encode document as JSON")]
    #[diagnostic(code(grammarkit::cli::json))]
    Json(#[from] serde_json::Error),

    #[error("undefined rules: {}", .names.join(", "))]
    #[diagnostic(
        code(grammarkit::cli::undefined_rules),
        help("define a rule for every identifier used in an expression")
    )]
    UndefinedRules { names: Vec<String> },
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = GrammarkitArgs::parse();
    if let Err(error) = execute(args.command) {
        print_error(error);
        process::exit(1);
    }
}

fn execute(command: Command) -> Result<(), CliError> {
    match command {
        Command::Parse { file, json } => {
            let document = load_document(&file)?;
            if json {
                output::print_json(&document)?;
            } else {
                output::print_document(&document);
            }
        }

        Command::Check { file } => {
            let document = load_document(&file)?;
            let missing = document.undefined_references();
            if !missing.is_empty() {
                for name in &missing {
                    output::print_warning(&format!("{name} is used but never defined"));
                }
                return Err(CliError::UndefinedRules {
                    names: missing.into_iter().map(str::to_string).collect(),
                });
            }
            output::print_success(&format!(
                "{}: {} rules",
                file.display(),
                document.rules.len()
            ));
        }

        Command::Rules { file } => {
            let document = load_document(&file)?;
            output::print_rule_names(&document);
        }
    }
    Ok(())
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn load_document(path: &Path) -> Result<Document, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = Source::from_file(path.display().to_string(), content);
    Ok(ebnf::parse_source(&source)?)
}
