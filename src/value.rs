use serde::Serialize;
use std::fmt;

use crate::grammar::StructureId;

/// The semantic value produced by a structure.
///
/// "No value" is not a variant: structures return `Option<Value>` and `None`
/// marks placeholders (whitespace, punctuation) that a sequence drops.
///
/// # Examples
///
/// ```rust
/// use grammarkit::value::Value;
/// let v = Value::List(vec![Value::text("a"), Value::text("b")]);
/// assert_eq!(v.type_name(), "List");
/// assert_eq!(v.as_list().map(|items| items.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    /// Plain text, usually a whole match or a decoded literal.
    Text(String),
    /// Capture groups 1..n of a match; `None` for groups that did not participate.
    Captures(Vec<Option<String>>),
    /// Values collected by a sequence.
    List(Vec<Value>),
    /// A value labelled with the structure that produced it.
    Tagged { tag: StructureId, inner: Box<Value> },
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn tagged(tag: StructureId, inner: Value) -> Self {
        Value::Tagged {
            tag,
            inner: Box::new(inner),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "Text",
            Value::Captures(_) => "Captures",
            Value::List(_) => "List",
            Value::Tagged { .. } => "Tagged",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the tag and the inner value if this value is tagged.
    pub fn as_tagged(&self) -> Option<(StructureId, &Value)> {
        match self {
            Value::Tagged { tag, inner } => Some((*tag, inner)),
            _ => None,
        }
    }

    pub fn into_tagged(self) -> Option<(StructureId, Value)> {
        match self {
            Value::Tagged { tag, inner } => Some((tag, *inner)),
            _ => None,
        }
    }

    /// Capture group `index` (1-based, like regex groups) of a `Captures` value.
    pub fn capture(&self, index: usize) -> Option<&str> {
        match self {
            Value::Captures(groups) if index > 0 => {
                groups.get(index - 1).and_then(|group| group.as_deref())
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{text:?}"),
            Value::Captures(groups) => {
                write!(f, "(")?;
                for (i, group) in groups.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match group {
                        Some(text) => write!(f, "{text:?}")?,
                        None => write!(f, "nil")?,
                    }
                }
                write!(f, ")")
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Tagged { tag, inner } => write!(f, "{tag}:{inner}"),
        }
    }
}
