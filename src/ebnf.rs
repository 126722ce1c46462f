//! Grammar definition files
//!
//! A small EBNF dialect, read by a grammar that is itself built from
//! [`Matcher`](crate::Matcher), [`Sequence`](crate::Sequence) and
//! [`Switch`](crate::Switch):
//!
//! ```text
//! greeting ::= "hi" name+ | 'bye' [ "now" ]
//! name     ::= /[a-z]+/ \
//!              | r"\w+"
//! ```
//!
//! Rules end at a line break; a backslash right before the line break
//! continues the rule on the next line.
//!
//! The reader recurses once per rule and once per part, so stack use grows
//! with the length of the file. Files of a few thousand lines can exhaust
//! the stack of a debug build; split very large grammars or read them on a
//! thread with a bigger stack.

pub mod ast;
pub mod literals;
mod meta;

pub use ast::{Alternative, Atom, Document, Expression, Part, Repeat, Rule};
pub use meta::MetaGrammar;

use once_cell::sync::Lazy;

use crate::errors::{GrammarError, ParseError, Source};

static META_GRAMMAR: Lazy<Result<MetaGrammar, GrammarError>> = Lazy::new(MetaGrammar::new);

/// The shared meta grammar, built on first use.
pub fn meta_grammar() -> Result<&'static MetaGrammar, &'static GrammarError> {
    Lazy::force(&META_GRAMMAR).as_ref()
}

/// Reads a grammar definition from `source`.
pub fn parse_source(source: &Source) -> Result<Document, ParseError> {
    match meta_grammar() {
        Ok(meta) => meta.parse_document(source),
        Err(error) => Err(ParseError::fatal(
            format!("grammar reader is misconfigured: {error}"),
            source,
            0,
        )),
    }
}

/// Reads a grammar definition from a string.
///
/// ```rust
/// use grammarkit::ebnf::{self, Atom};
///
/// let document = ebnf::parse("greeting ::= \"hi\" \"there\"\n").unwrap();
/// let parts = &document.rules[0].expression.alternatives[0].parts;
/// assert_eq!(parts[0].atom, Atom::Str("hi".into()));
/// ```
pub fn parse(text: &str) -> Result<Document, ParseError> {
    parse_source(&Source::anonymous(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_instance_is_reused() {
        let first = meta_grammar().unwrap() as *const MetaGrammar;
        let second = meta_grammar().unwrap() as *const MetaGrammar;
        assert_eq!(first, second);
    }

    #[test]
    fn meta_grammar_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MetaGrammar>();
    }
}
