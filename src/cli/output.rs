//! Handles all user-facing output for the CLI.
//!
//! Documents go to stdout as plain text or JSON; status lines are colorized
//! with `termcolor` when the terminal supports it.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ebnf::Document;

// ============================================================================
// DOCUMENT OUTPUT
// ============================================================================

/// Prints a document in normalized grammar syntax.
pub fn print_document(document: &Document) {
    if document.rules.is_empty() {
        println!("(empty)");
        return;
    }
    print!("{document}");
}

/// Prints a document as pretty JSON.
pub fn print_json(document: &Document) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(document)?;
    println!("{json}");
    Ok(())
}

pub fn print_rule_names(document: &Document) {
    for name in document.rule_names() {
        println!("{name}");
    }
}

// ============================================================================
// STATUS LINES
// ============================================================================

/// Prints a green success line to stdout.
pub fn print_success(message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = write_colored(&mut stdout, Color::Green, "✓ ", message);
}

/// Prints a yellow warning line to stderr.
pub fn print_warning(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = write_colored(&mut stderr, Color::Yellow, "warning: ", message);
}

fn write_colored(
    stream: &mut StandardStream,
    color: Color,
    prefix: &str,
    message: &str,
) -> io::Result<()> {
    stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stream, "{prefix}")?;
    stream.reset()?;
    writeln!(stream, "{message}")
}
