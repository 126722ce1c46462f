//! Ordered choice between structures.
//!
//! Alternatives are tried in order and the first one that does not fail with
//! [`ErrorKind::NoMatch`](crate::ErrorKind::NoMatch) wins. A fatal failure in
//! an alternative stops the search.

use std::fmt;
use std::sync::Arc;

use super::Mode;
use crate::errors::{mapper_failure, MapperError, ParseError, Source};
use crate::grammar::{Grammar, Origin, Parsed, StructureId};
use crate::value::Value;

/// Combiner invoked with the matched value, the matched alternative and the switch.
pub type SwitchMapper = Arc<
    dyn Fn(Option<Value>, Origin<'_>, Origin<'_>) -> Result<Option<Value>, MapperError>
        + Send
        + Sync,
>;

/// Configuration of a switch.
#[derive(Clone)]
pub struct Switch {
    alternatives: Vec<StructureId>,
    allow_no_match: bool,
    mapper: Option<SwitchMapper>,
}

impl fmt::Debug for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switch")
            .field("alternatives", &self.alternatives)
            .field("allow_no_match", &self.allow_no_match)
            .field("mapper", &self.mapper.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Switch {
    /// A switch over `alternatives`. Duplicates are dropped; more can be added
    /// later with [`Grammar::add_alternative`].
    pub fn new(alternatives: impl IntoIterator<Item = StructureId>) -> Self {
        let mut unique = Vec::new();
        for alternative in alternatives {
            if !unique.contains(&alternative) {
                unique.push(alternative);
            }
        }
        Self {
            alternatives: unique,
            allow_no_match: false,
            mapper: None,
        }
    }

    /// Produce no value (and consume nothing) when no alternative matches.
    pub fn allow_no_match(mut self) -> Self {
        self.allow_no_match = true;
        self
    }

    pub fn map<F>(mut self, mapper: F) -> Self
    where
        F: Fn(Option<Value>, Origin<'_>, Origin<'_>) -> Result<Option<Value>, MapperError>
            + Send
            + Sync
            + 'static,
    {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    pub(crate) fn alternatives(&self) -> &[StructureId] {
        &self.alternatives
    }

    pub(crate) fn compile(self) -> SwitchDef {
        let mapper: SwitchMapper = match self.mapper {
            Some(mapper) => mapper,
            None => Arc::new(identity),
        };
        SwitchDef {
            alternatives: self.alternatives,
            allow_no_match: self.allow_no_match,
            mapper,
        }
    }
}

fn identity(
    value: Option<Value>,
    _matched: Origin<'_>,
    _origin: Origin<'_>,
) -> Result<Option<Value>, MapperError> {
    Ok(value)
}

pub(crate) struct SwitchDef {
    alternatives: Vec<StructureId>,
    allow_no_match: bool,
    mapper: SwitchMapper,
}

impl SwitchDef {
    pub(crate) fn alternatives(&self) -> &[StructureId] {
        &self.alternatives
    }

    pub(crate) fn add(&mut self, alternative: StructureId) -> bool {
        if self.alternatives.contains(&alternative) {
            return false;
        }
        self.alternatives.push(alternative);
        true
    }

    pub(crate) fn remove(&mut self, alternative: StructureId) -> bool {
        match self.alternatives.iter().position(|a| *a == alternative) {
            Some(index) => {
                self.alternatives.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn parse(
        &self,
        grammar: &Grammar,
        origin: Origin<'_>,
        source: &Source,
        start: usize,
        end: usize,
        mode: Mode,
    ) -> Result<Parsed, ParseError> {
        for &alternative in &self.alternatives {
            let attempt = match mode {
                Mode::Partial => grammar.parse_node(alternative, source, start, end),
                Mode::Full => grammar.fullparse_node(alternative, source, start, end),
            };
            match attempt {
                Ok(parsed) => {
                    let value = (self.mapper)(parsed.value, grammar.origin(alternative), origin)
                        .map_err(|error| mapper_failure(error, source, start))?;
                    return Ok(Parsed {
                        value,
                        next: parsed.next,
                    });
                }
                Err(error) if error.is_no_match() => continue,
                Err(error) => return Err(error),
            }
        }

        match mode {
            Mode::Partial if self.allow_no_match => Ok(Parsed::nothing(start)),
            Mode::Partial => Err(ParseError::unmatched(
                "no valid match for",
                origin.id,
                source,
                start,
            )),
            Mode::Full if self.allow_no_match && start == end => Ok(Parsed::nothing(start)),
            // leftover input nothing can explain
            Mode::Full if self.allow_no_match => Err(ParseError::fatal(
                format!("no valid full match for {}", grammar.render(origin.id)),
                source,
                start,
            )),
            Mode::Full => Err(ParseError::unmatched(
                "no valid full match for",
                origin.id,
                source,
                start,
            )),
        }
    }
}
