//! Ordered sequence of structures.

use std::fmt;
use std::sync::Arc;

use super::Mode;
use crate::errors::{mapper_failure, GrammarError, MapperError, ParseError, Source};
use crate::grammar::{Grammar, Origin, Parsed, StructureId};
use crate::value::Value;

/// Combiner invoked with the collected (and flattened) child values.
pub type SequenceMapper =
    Arc<dyn Fn(Vec<Value>, Origin<'_>) -> Result<Option<Value>, MapperError> + Send + Sync>;

/// Configuration of a sequence: every child must match, one after the other.
#[derive(Clone)]
pub struct Sequence {
    children: Vec<StructureId>,
    flatten: bool,
    mapper: Option<SequenceMapper>,
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("children", &self.children)
            .field("flatten", &self.flatten)
            .field("mapper", &self.mapper.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Sequence {
    /// By default a sequence produces its collected values as a list tagged
    /// with the sequence's id.
    pub fn new(children: impl IntoIterator<Item = StructureId>) -> Self {
        Self {
            children: children.into_iter().collect(),
            flatten: false,
            mapper: None,
        }
    }

    /// Splice this sequence's collected values into an enclosing sequence
    /// instead of nesting them as one item.
    ///
    /// Only values produced by the default combiner (a list tagged with this
    /// sequence) are spliced.
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    pub fn map<F>(mut self, mapper: F) -> Self
    where
        F: Fn(Vec<Value>, Origin<'_>) -> Result<Option<Value>, MapperError>
            + Send
            + Sync
            + 'static,
    {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    pub fn map_value<F>(self, mapper: F) -> Self
    where
        F: Fn(Vec<Value>, Origin<'_>) -> Value + Send + Sync + 'static,
    {
        self.map(move |values, origin| Ok(Some(mapper(values, origin))))
    }

    pub(crate) fn children(&self) -> &[StructureId] {
        &self.children
    }

    pub(crate) fn compile(self) -> Result<SequenceDef, GrammarError> {
        if self.children.is_empty() {
            return Err(GrammarError::EmptySequence);
        }
        let mapper: SequenceMapper = match self.mapper {
            Some(mapper) => mapper,
            None => Arc::new(default_mapper),
        };
        Ok(SequenceDef {
            children: self.children,
            flatten: self.flatten,
            mapper,
        })
    }
}

fn default_mapper(values: Vec<Value>, origin: Origin<'_>) -> Result<Option<Value>, MapperError> {
    Ok(Some(Value::tagged(origin.id, Value::List(values))))
}

pub(crate) struct SequenceDef {
    children: Vec<StructureId>,
    flatten: bool,
    mapper: SequenceMapper,
}

impl SequenceDef {
    pub(crate) fn children(&self) -> &[StructureId] {
        &self.children
    }

    pub(crate) fn is_flatten(&self) -> bool {
        self.flatten
    }

    /// Threads the cursor through the children. In [`Mode::Full`] the last
    /// child must itself consume everything up to `end`.
    pub(crate) fn parse(
        &self,
        grammar: &Grammar,
        origin: Origin<'_>,
        source: &Source,
        start: usize,
        end: usize,
        mode: Mode,
    ) -> Result<Parsed, ParseError> {
        let last = self.children.len() - 1;
        let mut cursor = start;
        let mut collected = Vec::with_capacity(self.children.len());

        for (index, &child) in self.children.iter().enumerate() {
            let parsed = if mode == Mode::Full && index == last {
                grammar.fullparse_node(child, source, cursor, end)?
            } else {
                grammar.parse_node(child, source, cursor, end)?
            };
            cursor = parsed.next;
            if let Some(value) = parsed.value {
                collected.push(value);
            }
        }

        let values = flatten_values(grammar, collected);
        let value =
            (self.mapper)(values, origin).map_err(|error| mapper_failure(error, source, start))?;
        Ok(Parsed {
            value,
            next: cursor,
        })
    }
}

fn flatten_values(grammar: &Grammar, collected: Vec<Value>) -> Vec<Value> {
    let mut values = Vec::with_capacity(collected.len());
    for value in collected {
        match value {
            Value::Tagged { tag, inner }
                if grammar.is_flatten_sequence(tag) && matches!(*inner, Value::List(_)) =>
            {
                if let Value::List(items) = *inner {
                    values.extend(items);
                }
            }
            other => values.push(other),
        }
    }
    values
}
