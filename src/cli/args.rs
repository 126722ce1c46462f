//! Defines the command-line arguments and subcommands for the grammarkit CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "grammarkit",
    version,
    about = "Read and inspect EBNF-style grammar definition files."
)]
pub struct GrammarkitArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a grammar file and print it back in normalized form.
    Parse {
        /// The path to the grammar file.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the document model as JSON instead.
        #[arg(long)]
        json: bool,
    },
    /// Parse a grammar file and make sure every referenced rule is defined.
    Check {
        /// The path to the grammar file.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// List the rules defined in a grammar file.
    Rules {
        /// The path to the grammar file.
        #[arg(required = true)]
        file: PathBuf,
    },
}
