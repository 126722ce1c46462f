//! Regex token matcher.
//!
//! A matcher is the only structure that touches the input directly. Its pattern
//! is compiled once, at bind time, and every attempt is anchored at the cursor:
//! a matcher consumes a prefix of `[start, end)` or fails, it never searches
//! forward and never reads past `end`.

use regex_automata::meta::Regex;
use regex_automata::util::captures::Captures;
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input};
use std::fmt;
use std::sync::Arc;

use crate::errors::{mapper_failure, GrammarError, MapperError, ParseError, Source};
use crate::grammar::{Origin, Parsed};
use crate::value::Value;

/// Mapper invoked with the match and the matcher that produced it.
pub type MatchMapper = Arc<
    dyn Fn(&MatchDetails<'_>, Origin<'_>) -> Result<Option<Value>, MapperError> + Send + Sync,
>;

// ============================================================================
// MATCH DETAILS
// ============================================================================

/// A successful match as seen by a mapper.
pub struct MatchDetails<'s> {
    text: &'s str,
    captures: &'s Captures,
}

impl<'s> MatchDetails<'s> {
    /// The whole match.
    pub fn as_str(&self) -> &'s str {
        self.group(0).unwrap_or_default()
    }

    pub fn start(&self) -> usize {
        self.captures.get_match().map_or(0, |m| m.start())
    }

    pub fn end(&self) -> usize {
        self.captures.get_match().map_or(0, |m| m.end())
    }

    /// Capture group `index`; group 0 is the whole match.
    pub fn group(&self, index: usize) -> Option<&'s str> {
        self.captures
            .get_group(index)
            .map(|span| &self.text[span.range()])
    }

    pub fn named(&self, name: &str) -> Option<&'s str> {
        self.captures
            .get_group_by_name(name)
            .map(|span| &self.text[span.range()])
    }

    /// Number of explicit capture groups (group 0 excluded).
    pub fn group_count(&self) -> usize {
        self.captures.group_len().saturating_sub(1)
    }

    /// Groups 1..n, `None` for groups that did not take part in the match.
    pub fn groups(&self) -> Vec<Option<String>> {
        (1..=self.group_count())
            .map(|index| self.group(index).map(str::to_string))
            .collect()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Configuration of a regex token matcher.
#[derive(Clone)]
pub struct Matcher {
    pattern: String,
    escape: bool,
    case_insensitive: bool,
    multi_line: bool,
    dot_matches_new_line: bool,
    mapper: Option<MatchMapper>,
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("pattern", &self.pattern)
            .field("escape", &self.escape)
            .field("case_insensitive", &self.case_insensitive)
            .field("multi_line", &self.multi_line)
            .field("dot_matches_new_line", &self.dot_matches_new_line)
            .field("mapper", &self.mapper.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Matcher {
    /// A matcher for a regular expression. By default it produces its capture
    /// groups, tagged with the matcher's id.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            escape: false,
            case_insensitive: false,
            multi_line: false,
            dot_matches_new_line: false,
            mapper: None,
        }
    }

    /// A matcher for exact text.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(text).escaped()
    }

    /// A matcher whose match produces no value.
    pub fn placeholder(pattern: impl Into<String>) -> Self {
        Self::new(pattern).map(|_, _| Ok(None))
    }

    /// Exact text that produces no value, e.g. punctuation.
    pub fn literal_placeholder(text: impl Into<String>) -> Self {
        Self::placeholder(text).escaped()
    }

    /// Treat the pattern as literal text.
    pub fn escaped(mut self) -> Self {
        self.escape = true;
        self
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    pub fn multi_line(mut self, yes: bool) -> Self {
        self.multi_line = yes;
        self
    }

    pub fn dot_matches_new_line(mut self, yes: bool) -> Self {
        self.dot_matches_new_line = yes;
        self
    }

    pub fn map<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&MatchDetails<'_>, Origin<'_>) -> Result<Option<Value>, MapperError>
            + Send
            + Sync
            + 'static,
    {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    /// Like [`Matcher::map`] for mappers that cannot fail and always produce a value.
    pub fn map_value<F>(self, mapper: F) -> Self
    where
        F: Fn(&MatchDetails<'_>, Origin<'_>) -> Value + Send + Sync + 'static,
    {
        self.map(move |details, origin| Ok(Some(mapper(details, origin))))
    }

    /// The pattern as written, before escaping.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn compile(self) -> Result<CompiledMatcher, GrammarError> {
        let source = if self.escape {
            regex::escape(&self.pattern)
        } else {
            self.pattern.clone()
        };
        let regex = Regex::builder()
            .syntax(
                syntax::Config::new()
                    .case_insensitive(self.case_insensitive)
                    .multi_line(self.multi_line)
                    .dot_matches_new_line(self.dot_matches_new_line),
            )
            .build(&source)
            .map_err(|error| GrammarError::InvalidPattern {
                pattern: self.pattern.clone(),
                reason: error.to_string(),
            })?;
        let mapper: MatchMapper = match self.mapper {
            Some(mapper) => mapper,
            None => Arc::new(default_mapper),
        };
        Ok(CompiledMatcher {
            pattern: self.pattern,
            regex,
            mapper,
        })
    }
}

fn default_mapper(details: &MatchDetails<'_>, origin: Origin<'_>) -> Result<Option<Value>, MapperError> {
    Ok(Some(Value::tagged(origin.id, Value::Captures(details.groups()))))
}

// ============================================================================
// COMPILED FORM
// ============================================================================

pub(crate) struct CompiledMatcher {
    pattern: String,
    regex: Regex,
    mapper: MatchMapper,
}

impl CompiledMatcher {
    pub(crate) fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn parse(
        &self,
        origin: Origin<'_>,
        source: &Source,
        start: usize,
        end: usize,
    ) -> Result<Parsed, ParseError> {
        // the haystack ends at `end`, so `$`, `\z` and `\b` see it as the end of input
        let text = &source.text()[..end];
        let input = Input::new(text).range(start..end).anchored(Anchored::Yes);
        let mut captures = self.regex.create_captures();
        self.regex.search_captures(&input, &mut captures);

        let Some(found) = captures.get_match() else {
            return Err(ParseError::unmatched("cannot match", origin.id, source, start));
        };

        let details = MatchDetails {
            text,
            captures: &captures,
        };
        let value = (self.mapper)(&details, origin)
            .map_err(|error| mapper_failure(error, source, start))?;
        Ok(Parsed {
            value,
            next: found.end(),
        })
    }
}
