//! The grammar that reads grammar definitions, built from the core structures.

use crate::combinators::{Matcher, Sequence, Switch};
use crate::errors::{GrammarError, MapperError, ParseError, Source};
use crate::grammar::{Grammar, Origin, StructureId};
use crate::lexical;
use crate::value::Value;

use super::ast::{Alternative, Atom, Document, Expression, Part, Repeat, Rule};
use super::literals::{decode_escape, verbatim_escape, DECODED_ESCAPES, VERBATIM_ESCAPES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escapes {
    Decode,
    Verbatim,
}

/// The structure graph for grammar definition files.
///
/// Every structure that produces part of the document model is kept by id so
/// that the value tree it yields can be turned into a [`Document`].
#[derive(Debug)]
pub struct MetaGrammar {
    grammar: Grammar,
    document: StructureId,
    rule: StructureId,
    expression: StructureId,
    sequence: StructureId,
    part: StructureId,
    multi: StructureId,
    identifier: StructureId,
    string: StructureId,
    regexp: StructureId,
    group: StructureId,
    optional: StructureId,
}

impl MetaGrammar {
    pub fn new() -> Result<Self, GrammarError> {
        let mut g = Grammar::new();

        let blank = g.define_named("blank", lexical::escaped_optional_space())?;
        let newline = g.define_named("newline", lexical::newline())?;

        let identifier = g.define_named(
            "identifier",
            Matcher::new("([A-Za-z_][A-Za-z_0-9]*)").map_value(|m, origin| {
                Value::tagged(origin.id, Value::text(m.group(1).unwrap_or_default()))
            }),
        )?;

        // "...", '...', r"...", r'...'
        let double = literal(&mut g, "str", "\"", Escapes::Decode)?;
        let single = literal(&mut g, "str", "'", Escapes::Decode)?;
        let raw_double = literal(&mut g, "str", "\"", Escapes::Verbatim)?;
        let raw_single = literal(&mut g, "str", "'", Escapes::Verbatim)?;
        let raw_string = raw(&mut g, [raw_double, raw_single])?;
        let string = g.define_named(
            "string",
            Switch::new([double, single, raw_string]).map(tag_with_switch),
        )?;

        // /.../, ~...~, r/.../, r~...~
        let slashed = literal(&mut g, "regexp", "/", Escapes::Verbatim)?;
        let tilded = literal(&mut g, "regexp", "~", Escapes::Verbatim)?;
        let raw_regexp = raw(&mut g, [slashed, tilded])?;
        let regexp = g.define_named(
            "regexp",
            Switch::new([slashed, tilded, raw_regexp]).map(tag_with_switch),
        )?;

        let expression = g.declare_named("expression");

        let open_paren = g.define(Matcher::literal_placeholder("("))?;
        let close_paren = g.define(Matcher::literal_placeholder(")"))?;
        let group = g.define_named(
            "group",
            Sequence::new([open_paren, blank, expression, close_paren]),
        )?;
        let open_square = g.define(Matcher::literal_placeholder("["))?;
        let close_square = g.define(Matcher::literal_placeholder("]"))?;
        let optional = g.define_named(
            "optional",
            Sequence::new([open_square, blank, expression, close_square]),
        )?;

        let multi = g.define_named(
            "multi",
            Matcher::new(r"[\*\+]").map_value(|m, origin| {
                Value::tagged(origin.id, Value::text(m.as_str()))
            }),
        )?;
        let maybe_multi = g.define(Switch::new([multi]).allow_no_match())?;

        let atom = g.define_named(
            "atom",
            Switch::new([string, regexp, identifier, group, optional]),
        )?;
        let part = g.define_named("part", Sequence::new([atom, maybe_multi, blank]))?;

        // part+
        let parts = g.declare();
        let more_parts = g.define(Switch::new([parts]).allow_no_match())?;
        g.bind(parts, Sequence::new([part, more_parts]).flatten())?;
        let sequence = g.define_named("sequence", Sequence::new([parts]))?;

        // sequence ("|" blank sequence)*
        let alternatives = g.declare();
        let bar = g.define(Matcher::literal_placeholder("|"))?;
        let next_alternative = g.define(Sequence::new([bar, blank, alternatives]).flatten())?;
        let more_alternatives = g.define(Switch::new([next_alternative]).allow_no_match())?;
        g.bind(
            alternatives,
            Sequence::new([sequence, more_alternatives]).flatten(),
        )?;
        g.bind(expression, Sequence::new([alternatives]))?;

        let define = g.define(Matcher::literal_placeholder("::="))?;
        let end_of_input = g.define_named("end of input", Matcher::placeholder(r"\z"))?;
        let line_end = g.define(Switch::new([newline, end_of_input]))?;
        let rule = g.define_named(
            "rule",
            Sequence::new([blank, identifier, blank, define, blank, expression, line_end]),
        )?;

        // (rule | newline) blank, repeated
        let line = g.define(Switch::new([rule, newline]))?;
        let entry = g.define(Sequence::new([line, blank]).flatten())?;
        let entries = g.declare();
        let more_entries = g.define(Switch::new([entries]).allow_no_match())?;
        g.bind(entries, Sequence::new([entry, more_entries]).flatten())?;
        let any_entries = g.define(Switch::new([entries]).allow_no_match())?;
        let document = g.define_named("document", Sequence::new([blank, any_entries]))?;

        Ok(Self {
            grammar: g,
            document,
            rule,
            expression,
            sequence,
            part,
            multi,
            identifier,
            string,
            regexp,
            group,
            optional,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The root structure: a whole definition file.
    pub fn document_id(&self) -> StructureId {
        self.document
    }

    /// Parses a whole definition file.
    pub fn parse_document(&self, source: &Source) -> Result<Document, ParseError> {
        let parsed = self
            .grammar
            .fullparse(self.document, source, 0, source.len())?;
        let value = parsed
            .value
            .ok_or_else(|| ParseError::fatal("document produced no value", source, 0))?;
        self.to_document(value)
            .ok_or_else(|| ParseError::fatal("document has an unexpected shape", source, 0))
    }

    // ------------------------------------------------------------------------
    // Value tree -> document model
    // ------------------------------------------------------------------------

    fn to_document(&self, value: Value) -> Option<Document> {
        let rules = untag(value, self.document)?
            .into_list()?
            .into_iter()
            .map(|rule| self.to_rule(rule))
            .collect::<Option<Vec<_>>>()?;
        Some(Document { rules })
    }

    fn to_rule(&self, value: Value) -> Option<Rule> {
        let mut items = untag(value, self.rule)?.into_list()?.into_iter();
        let name = self.to_identifier(items.next()?)?;
        let expression = self.to_expression(items.next()?)?;
        Some(Rule { name, expression })
    }

    fn to_identifier(&self, value: Value) -> Option<String> {
        into_text(untag(value, self.identifier)?)
    }

    fn to_expression(&self, value: Value) -> Option<Expression> {
        let alternatives = untag(value, self.expression)?
            .into_list()?
            .into_iter()
            .map(|sequence| self.to_alternative(sequence))
            .collect::<Option<Vec<_>>>()?;
        Some(Expression { alternatives })
    }

    fn to_alternative(&self, value: Value) -> Option<Alternative> {
        let parts = untag(value, self.sequence)?
            .into_list()?
            .into_iter()
            .map(|part| self.to_part(part))
            .collect::<Option<Vec<_>>>()?;
        Some(Alternative { parts })
    }

    fn to_part(&self, value: Value) -> Option<Part> {
        let mut items = untag(value, self.part)?.into_list()?.into_iter();
        let atom = self.to_atom(items.next()?)?;
        let repeat = match items.next() {
            Some(mark) => Some(Repeat::from_mark(&into_text(untag(mark, self.multi)?)?)?),
            None => None,
        };
        Some(Part { atom, repeat })
    }

    fn to_atom(&self, value: Value) -> Option<Atom> {
        let (tag, inner) = value.into_tagged()?;
        if tag == self.string {
            into_text(inner).map(Atom::Str)
        } else if tag == self.regexp {
            into_text(inner).map(Atom::Regexp)
        } else if tag == self.identifier {
            into_text(inner).map(Atom::Identifier)
        } else if tag == self.group {
            self.to_bracketed(inner).map(Atom::Group)
        } else if tag == self.optional {
            self.to_bracketed(inner).map(Atom::Optional)
        } else {
            None
        }
    }

    fn to_bracketed(&self, inner: Value) -> Option<Expression> {
        let expression = inner.into_list()?.into_iter().next()?;
        self.to_expression(expression)
    }
}

// ============================================================================
// LITERAL BUILDERS
// ============================================================================

/// `delimiter body delimiter`, producing the decoded body as text.
///
/// The body is a switch that refers to itself: a run of plain text or one
/// escape, followed by the rest of the body, or the closing delimiter.
fn literal(
    g: &mut Grammar,
    name: &str,
    delimiter: &str,
    escapes: Escapes,
) -> Result<StructureId, GrammarError> {
    let plain = g.define(
        Matcher::new(format!(r"[^\\{}]+", regex::escape(delimiter)))
            .map_value(|m, _| Value::text(m.as_str())),
    )?;

    let escape_pattern = match escapes {
        Escapes::Decode => DECODED_ESCAPES,
        Escapes::Verbatim => VERBATIM_ESCAPES,
    };
    let owned_delimiter = delimiter.to_string();
    let escaped = g.define_named(
        "escape",
        Matcher::new(format!(r"\\(?:{escape_pattern})")).map(move |m, _| {
            let body = &m.as_str()[1..];
            let text = match escapes {
                Escapes::Decode => decode_escape(body)?,
                Escapes::Verbatim => verbatim_escape(body, &owned_delimiter),
            };
            Ok(Some(Value::Text(text)))
        }),
    )?;

    let body = g.declare();
    let plain_run = g.define(Sequence::new([plain, body]).flatten())?;
    let escaped_run = g.define(Sequence::new([escaped, body]).flatten())?;
    let close = g.define(Matcher::literal_placeholder(delimiter))?;
    g.bind(body, Switch::new([plain_run, escaped_run, close]))?;

    let open = g.define(Matcher::literal_placeholder(delimiter))?;
    g.define_named(name, Sequence::new([open, body]).map(join_text))
}

/// `r` followed by one of `forms`.
fn raw(g: &mut Grammar, forms: [StructureId; 2]) -> Result<StructureId, GrammarError> {
    let prefix = g.define(Matcher::literal_placeholder("r"))?;
    let form = g.define(Switch::new(forms))?;
    g.define(Sequence::new([prefix, form]).map(|values, _| Ok(values.into_iter().next())))
}

fn join_text(values: Vec<Value>, _origin: Origin<'_>) -> Result<Option<Value>, MapperError> {
    let mut text = String::new();
    for value in values {
        match value {
            Value::Text(piece) => text.push_str(&piece),
            other => {
                return Err(format!("unexpected {} inside a literal", other.type_name()).into())
            }
        }
    }
    Ok(Some(Value::Text(text)))
}

fn tag_with_switch(
    value: Option<Value>,
    _matched: Origin<'_>,
    origin: Origin<'_>,
) -> Result<Option<Value>, MapperError> {
    Ok(value.map(|inner| Value::tagged(origin.id, inner)))
}

fn untag(value: Value, expected: StructureId) -> Option<Value> {
    match value.into_tagged()? {
        (tag, inner) if tag == expected => Some(inner),
        _ => None,
    }
}

fn into_text(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        _ => None,
    }
}
