//! Grammar arena
//!
//! Every structure lives in a [`Grammar`] and is addressed by a [`StructureId`].
//! Wiring happens in two phases: declare the nodes you need, then bind each one
//! to a matcher, sequence or switch. Children are referred to by id, so a rule
//! may point at itself or at a rule declared later.
//!
//! Parsing borrows the grammar shared (`&Grammar`), rewiring borrows it
//! exclusively (`&mut Grammar`). A grammar can never change under an in-flight
//! parse, and a finished grammar can be shared between threads.

use serde::Serialize;
use std::fmt;

use crate::combinators::{
    matcher::CompiledMatcher, sequence::SequenceDef, switch::SwitchDef, Definition, Mode,
};
use crate::errors::{GrammarError, ParseError, Source};
use crate::value::Value;

/// Children shown per structure when rendering.
const RENDER_MAX_CHILDREN: usize = 6;
/// Nesting shown when rendering unnamed structures.
const RENDER_MAX_DEPTH: usize = 4;

// ============================================================================
// HANDLES
// ============================================================================

/// Stable handle to a structure inside its [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StructureId(usize);

impl StructureId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of the structure that is invoking a mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin<'g> {
    pub id: StructureId,
    pub name: Option<&'g str>,
}

/// Which of the three structure kinds a node is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    Unbound,
    Matcher,
    Sequence,
    Switch,
}

impl StructureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureKind::Unbound => "Unbound",
            StructureKind::Matcher => "Matcher",
            StructureKind::Sequence => "Sequence",
            StructureKind::Switch => "Switch",
        }
    }
}

/// Successful parse: the value (if any) and the cursor after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub value: Option<Value>,
    pub next: usize,
}

impl Parsed {
    pub(crate) fn nothing(next: usize) -> Self {
        Self { value: None, next }
    }
}

// ============================================================================
// NODES
// ============================================================================

pub(crate) enum Structure {
    Unbound,
    Matcher(CompiledMatcher),
    Sequence(SequenceDef),
    Switch(SwitchDef),
}

impl Structure {
    fn kind(&self) -> StructureKind {
        match self {
            Structure::Unbound => StructureKind::Unbound,
            Structure::Matcher(_) => StructureKind::Matcher,
            Structure::Sequence(_) => StructureKind::Sequence,
            Structure::Switch(_) => StructureKind::Switch,
        }
    }
}

struct Node {
    name: Option<String>,
    structure: Structure,
}

/// An arena of structures.
///
/// ```rust
/// use grammarkit::{Grammar, Matcher, Sequence};
///
/// let mut grammar = Grammar::new();
/// let a = grammar.define(Matcher::literal("a")).unwrap();
/// let b = grammar.define(Matcher::literal("b")).unwrap();
/// let ab = grammar.define(Sequence::new([a, b])).unwrap();
/// assert_eq!(grammar.fullparse_str(ab, "ab").unwrap().next, 2);
/// ```
#[derive(Default)]
pub struct Grammar {
    nodes: Vec<Node>,
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..self.nodes.len()).map(|index| self.render(StructureId(index))))
            .finish()
    }
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------------
    // Declaration and wiring
    // ------------------------------------------------------------------------

    /// Reserve a node that will be bound later.
    pub fn declare(&mut self) -> StructureId {
        self.push(None)
    }

    pub fn declare_named(&mut self, name: impl Into<String>) -> StructureId {
        self.push(Some(name.into()))
    }

    fn push(&mut self, name: Option<String>) -> StructureId {
        let id = StructureId(self.nodes.len());
        self.nodes.push(Node {
            name,
            structure: Structure::Unbound,
        });
        id
    }

    /// Bind a declared node. Each node can be bound exactly once.
    pub fn bind(
        &mut self,
        id: StructureId,
        definition: impl Into<Definition>,
    ) -> Result<(), GrammarError> {
        let definition = definition.into();
        let node = self.node(id)?;
        if !matches!(node.structure, Structure::Unbound) {
            return Err(GrammarError::AlreadyBound(id));
        }
        for child in definition.children() {
            self.node(*child)?;
        }

        let (structure, default_name) = definition.compile()?;
        let node = &mut self.nodes[id.0];
        if node.name.is_none() {
            node.name = default_name;
        }
        node.structure = structure;
        Ok(())
    }

    /// Declare and bind in one step.
    pub fn define(&mut self, definition: impl Into<Definition>) -> Result<StructureId, GrammarError> {
        let id = self.declare();
        self.bind_or_forget(id, definition.into())
    }

    pub fn define_named(
        &mut self,
        name: impl Into<String>,
        definition: impl Into<Definition>,
    ) -> Result<StructureId, GrammarError> {
        let id = self.declare_named(name);
        self.bind_or_forget(id, definition.into())
    }

    fn bind_or_forget(
        &mut self,
        id: StructureId,
        definition: Definition,
    ) -> Result<StructureId, GrammarError> {
        match self.bind(id, definition) {
            Ok(()) => Ok(id),
            Err(error) => {
                // the node was pushed last, so nothing can refer to it yet
                self.nodes.pop();
                Err(error)
            }
        }
    }

    pub fn name(&self, id: StructureId) -> Option<&str> {
        self.nodes.get(id.0).and_then(|node| node.name.as_deref())
    }

    pub fn set_name(
        &mut self,
        id: StructureId,
        name: Option<String>,
    ) -> Result<(), GrammarError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(GrammarError::UnknownStructure(id))?;
        node.name = name;
        Ok(())
    }

    pub fn kind(&self, id: StructureId) -> Option<StructureKind> {
        self.nodes.get(id.0).map(|node| node.structure.kind())
    }

    pub fn is_bound(&self, id: StructureId) -> bool {
        matches!(self.kind(id), Some(kind) if kind != StructureKind::Unbound)
    }

    /// Alternatives of a switch, in the order they are tried.
    pub fn alternatives(&self, id: StructureId) -> Option<&[StructureId]> {
        match &self.nodes.get(id.0)?.structure {
            Structure::Switch(switch) => Some(switch.alternatives()),
            _ => None,
        }
    }

    /// Append an alternative to a switch. Returns `false` if it was already present.
    pub fn add_alternative(
        &mut self,
        switch: StructureId,
        alternative: StructureId,
    ) -> Result<bool, GrammarError> {
        self.node(alternative)?;
        Ok(self.switch_mut(switch)?.add(alternative))
    }

    pub fn remove_alternative(
        &mut self,
        switch: StructureId,
        alternative: StructureId,
    ) -> Result<(), GrammarError> {
        if self.switch_mut(switch)?.remove(alternative) {
            Ok(())
        } else {
            Err(GrammarError::MissingAlternative {
                switch,
                alternative,
            })
        }
    }

    fn node(&self, id: StructureId) -> Result<&Node, GrammarError> {
        self.nodes.get(id.0).ok_or(GrammarError::UnknownStructure(id))
    }

    fn switch_mut(&mut self, id: StructureId) -> Result<&mut SwitchDef, GrammarError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(GrammarError::UnknownStructure(id))?;
        match &mut node.structure {
            Structure::Switch(switch) => Ok(switch),
            _ => Err(GrammarError::NotASwitch(id)),
        }
    }

    // ------------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------------

    /// Parse `source[start..end]` with structure `id`, consuming a prefix.
    pub fn parse(
        &self,
        id: StructureId,
        source: &Source,
        start: usize,
        end: usize,
    ) -> Result<Parsed, ParseError> {
        check_span(source, start, end)?;
        self.parse_node(id, source, start, end)
            .map_err(|error| error.describe(|subject| self.render(subject)))
    }

    /// Parse `source[start..end]` with structure `id`, consuming all of it.
    pub fn fullparse(
        &self,
        id: StructureId,
        source: &Source,
        start: usize,
        end: usize,
    ) -> Result<Parsed, ParseError> {
        check_span(source, start, end)?;
        self.fullparse_node(id, source, start, end)
            .map_err(|error| error.describe(|subject| self.render(subject)))
    }

    pub fn parse_str(&self, id: StructureId, text: &str) -> Result<Parsed, ParseError> {
        let source = Source::anonymous(text);
        self.parse(id, &source, 0, source.len())
    }

    pub fn fullparse_str(&self, id: StructureId, text: &str) -> Result<Parsed, ParseError> {
        let source = Source::anonymous(text);
        self.fullparse(id, &source, 0, source.len())
    }

    pub(crate) fn parse_node(
        &self,
        id: StructureId,
        source: &Source,
        start: usize,
        end: usize,
    ) -> Result<Parsed, ParseError> {
        let origin = self.origin(id);
        match self.structure(id, source, start)? {
            Structure::Matcher(matcher) => matcher.parse(origin, source, start, end),
            Structure::Sequence(sequence) => {
                sequence.parse(self, origin, source, start, end, Mode::Partial)
            }
            Structure::Switch(switch) => switch.parse(self, origin, source, start, end, Mode::Partial),
            Structure::Unbound => Err(self.unbound(id, source, start)),
        }
    }

    pub(crate) fn fullparse_node(
        &self,
        id: StructureId,
        source: &Source,
        start: usize,
        end: usize,
    ) -> Result<Parsed, ParseError> {
        let origin = self.origin(id);
        match self.structure(id, source, start)? {
            Structure::Sequence(sequence) => {
                sequence.parse(self, origin, source, start, end, Mode::Full)
            }
            Structure::Switch(switch) => switch.parse(self, origin, source, start, end, Mode::Full),
            Structure::Matcher(matcher) => {
                let parsed = matcher.parse(origin, source, start, end)?;
                if parsed.next != end {
                    // point at the first byte left over
                    return Err(ParseError::fatal("extra unparsed data", source, parsed.next));
                }
                Ok(parsed)
            }
            Structure::Unbound => Err(self.unbound(id, source, start)),
        }
    }

    fn structure(
        &self,
        id: StructureId,
        source: &Source,
        position: usize,
    ) -> Result<&Structure, ParseError> {
        self.nodes
            .get(id.0)
            .map(|node| &node.structure)
            .ok_or_else(|| ParseError::fatal(format!("unknown structure {id}"), source, position))
    }

    fn unbound(&self, id: StructureId, source: &Source, position: usize) -> ParseError {
        ParseError::fatal(
            format!("{} was declared but never bound", self.render(id)),
            source,
            position,
        )
    }

    pub(crate) fn origin(&self, id: StructureId) -> Origin<'_> {
        Origin {
            id,
            name: self.name(id),
        }
    }

    pub(crate) fn is_flatten_sequence(&self, id: StructureId) -> bool {
        matches!(
            self.nodes.get(id.0).map(|node| &node.structure),
            Some(Structure::Sequence(sequence)) if sequence.is_flatten()
        )
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// A bounded, human-readable rendering of a structure, used in messages.
    ///
    /// Structures already being rendered further up render as `...`, so
    /// self-referential grammars terminate.
    pub fn render(&self, id: StructureId) -> String {
        let mut out = String::new();
        let mut path = Vec::new();
        self.render_into(id, 0, &mut path, &mut out);
        out
    }

    fn render_into(
        &self,
        id: StructureId,
        depth: usize,
        path: &mut Vec<StructureId>,
        out: &mut String,
    ) {
        let Some(node) = self.nodes.get(id.0) else {
            out.push_str(&format!("<unknown {id}>"));
            return;
        };
        let kind = node.structure.kind().as_str();
        if let Some(name) = &node.name {
            out.push_str(&format!("<{kind} {name:?}>"));
            return;
        }

        let children = match &node.structure {
            Structure::Unbound => {
                out.push_str(&format!("<{kind} {id}>"));
                return;
            }
            Structure::Matcher(matcher) => {
                out.push_str(&format!("<{kind} /{}/>", matcher.pattern()));
                return;
            }
            Structure::Sequence(sequence) => sequence.children(),
            Structure::Switch(switch) => switch.alternatives(),
        };
        if path.contains(&id) || depth >= RENDER_MAX_DEPTH {
            out.push_str("...");
            return;
        }

        path.push(id);
        out.push_str(&format!("<{kind} ["));
        for (index, child) in children.iter().take(RENDER_MAX_CHILDREN).enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.render_into(*child, depth + 1, path, out);
        }
        if children.len() > RENDER_MAX_CHILDREN {
            out.push_str(", ...");
        }
        out.push_str("]>");
        path.pop();
    }
}

fn check_span(source: &Source, start: usize, end: usize) -> Result<(), ParseError> {
    let len = source.len();
    if start > end || end > len {
        return Err(ParseError::fatal(
            format!("invalid span {start}..{end} for input of length {len}"),
            source,
            start.min(len),
        ));
    }
    let text = source.text();
    if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        return Err(ParseError::fatal(
            format!("span {start}..{end} does not fall on character boundaries"),
            source,
            start,
        ));
    }
    Ok(())
}
