//! Grammarkit Error Handling
//!
//! Two families of errors live here:
//!
//! - [`ParseError`]: a failure while parsing. It is either a recoverable
//!   [`ErrorKind::NoMatch`] (only a switch acts on it, by trying its next
//!   alternative) or a [`ErrorKind::Fatal`] failure that always propagates.
//! - [`GrammarError`]: a configuration mistake while declaring or wiring
//!   structures.
//!
//! Both render as `miette` diagnostics.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::grammar::StructureId;

// ============================================================================
// SOURCE CONTEXT - Shared input buffer
// ============================================================================

/// A named input buffer shared between a parse call and every error it produces.
///
/// Cloning is cheap: the text lives behind an `Arc`, so failed alternatives can
/// carry a handle to the source without copying it.
#[derive(Debug, Clone)]
pub struct Source {
    named: Arc<NamedSource<String>>,
}

impl Source {
    /// Create a source from file content, keeping the file name for diagnostics.
    pub fn from_file(name: impl AsRef<str>, content: impl Into<String>) -> Self {
        Self {
            named: Arc::new(NamedSource::new(name, content.into())),
        }
    }

    /// Create a source that has no meaningful name.
    pub fn anonymous(content: impl Into<String>) -> Self {
        Self::from_file("source", content)
    }

    pub fn name(&self) -> &str {
        self.named.name()
    }

    pub fn text(&self) -> &str {
        self.named.inner()
    }

    pub fn len(&self) -> usize {
        self.text().len()
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, position: usize) -> (usize, usize) {
        let text = self.text();
        let position = position.min(text.len());
        let before = &text[..floor_char_boundary(text, position)];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        (line, column)
    }

    fn source_code(&self) -> &dyn SourceCode {
        &*self.named
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::anonymous(text)
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::anonymous(text)
    }
}

fn floor_char_boundary(text: &str, mut position: usize) -> usize {
    while !text.is_char_boundary(position) {
        position -= 1;
    }
    position
}

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// How a parse failure is allowed to travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// "This pattern or alternative does not apply here."
    NoMatch,
    /// "Parsing cannot continue."
    Fatal,
}

impl ErrorKind {
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::NoMatch => "grammarkit::parse::no_match",
            ErrorKind::Fatal => "grammarkit::parse::fatal",
        }
    }
}

/// A failed parse: kind, message and the byte offset where it happened.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub position: usize,
    source: Source,
    // a structure to render into `message` once the error leaves the grammar
    subject: Option<(&'static str, StructureId)>,
}

impl ParseError {
    pub fn no_match(message: impl Into<String>, source: &Source, position: usize) -> Self {
        Self {
            kind: ErrorKind::NoMatch,
            message: message.into(),
            position,
            source: source.clone(),
            subject: None,
        }
    }

    pub fn fatal(message: impl Into<String>, source: &Source, position: usize) -> Self {
        Self {
            kind: ErrorKind::Fatal,
            message: message.into(),
            position,
            source: source.clone(),
            subject: None,
        }
    }

    /// A recoverable miss described as `"{prefix} {structure}"`.
    ///
    /// Backtracking throws most of these away, so the structure is only
    /// rendered by [`ParseError::describe`] when the error reaches the caller.
    pub(crate) fn unmatched(
        prefix: &'static str,
        subject: StructureId,
        source: &Source,
        position: usize,
    ) -> Self {
        Self {
            kind: ErrorKind::NoMatch,
            message: String::new(),
            position,
            source: source.clone(),
            subject: Some((prefix, subject)),
        }
    }

    pub(crate) fn describe(mut self, render: impl FnOnce(StructureId) -> String) -> Self {
        if let Some((prefix, subject)) = self.subject.take() {
            self.message = format!("{prefix} {}", render(subject));
        }
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::Fatal
    }

    pub fn is_no_match(&self) -> bool {
        self.kind == ErrorKind::NoMatch
    }

    /// The buffer this error points into.
    pub fn input(&self) -> &Source {
        &self.source
    }

    /// 1-based line and column of the failure.
    pub fn line_col(&self) -> (usize, usize) {
        self.source.line_col(self.position)
    }

    fn primary_label(&self) -> &'static str {
        match self.kind {
            ErrorKind::NoMatch => "nothing matches here",
            ErrorKind::Fatal => "parsing stopped here",
        }
    }
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::NoMatch => write!(f, "no match: ")?,
            ErrorKind::Fatal => write!(f, "parse error: ")?,
        }
        match self.subject {
            Some((prefix, subject)) => write!(f, "{prefix} {subject}"),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let len = if self.position < self.source.len() { 1 } else { 0 };
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label().to_string()),
            SourceSpan::from(self.position..self.position + len),
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(self.source.source_code())
    }
}

/// Error type a mapper may return.
///
/// A [`ParseError`] travels through unchanged; anything else is turned into a
/// fatal failure at the start of the structure that invoked the mapper.
pub type MapperError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub(crate) fn mapper_failure(error: MapperError, source: &Source, position: usize) -> ParseError {
    match error.downcast::<ParseError>() {
        Ok(parse_error) => *parse_error,
        Err(other) => ParseError::fatal(other.to_string(), source, position),
    }
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// Mistakes made while declaring, binding or rewiring structures.
#[derive(Debug, Error, Diagnostic)]
pub enum GrammarError {
    #[error("invalid pattern {pattern:?}: {reason}")]
    #[diagnostic(code(grammarkit::grammar::invalid_pattern))]
    InvalidPattern { pattern: String, reason: String },

    #[error("a sequence needs at least one child structure")]
    #[diagnostic(code(grammarkit::grammar::empty_sequence))]
    EmptySequence,

    #[error("unknown structure {0}")]
    #[diagnostic(code(grammarkit::grammar::unknown_structure))]
    UnknownStructure(StructureId),

    #[error("structure {0} is already bound")]
    #[diagnostic(
        code(grammarkit::grammar::already_bound),
        help("declare a new structure instead of rebinding an existing one")
    )]
    AlreadyBound(StructureId),

    #[error("structure {0} is not a switch")]
    #[diagnostic(code(grammarkit::grammar::not_a_switch))]
    NotASwitch(StructureId),

    #[error("{alternative} is not an alternative of switch {switch}")]
    #[diagnostic(code(grammarkit::grammar::missing_alternative))]
    MissingAlternative {
        switch: StructureId,
        alternative: StructureId,
    },
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints any diagnostic with full miette formatting to stderr.
pub fn print_error<E>(error: E)
where
    E: Diagnostic + Send + Sync + 'static,
{
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
