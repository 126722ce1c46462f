//! The three structure kinds.
//!
//! [`Matcher`], [`Sequence`] and [`Switch`] are configuration builders. Handing
//! one to [`Grammar::bind`](crate::Grammar::bind) validates and compiles it into
//! the grammar; from then on its matching behavior never changes.

pub mod matcher;
pub mod sequence;
pub mod switch;

pub use matcher::{MatchDetails, Matcher};
pub use sequence::Sequence;
pub use switch::Switch;

use crate::errors::GrammarError;
use crate::grammar::{Structure, StructureId};

/// Whether a structure may stop early or must consume up to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Partial,
    Full,
}

/// Anything that can be bound to a declared structure.
#[derive(Debug, Clone)]
pub enum Definition {
    Matcher(Matcher),
    Sequence(Sequence),
    Switch(Switch),
}

impl Definition {
    pub(crate) fn children(&self) -> &[StructureId] {
        match self {
            Definition::Matcher(_) => &[],
            Definition::Sequence(sequence) => sequence.children(),
            Definition::Switch(switch) => switch.alternatives(),
        }
    }

    /// Compiles the definition and returns the structure with its default name.
    pub(crate) fn compile(self) -> Result<(Structure, Option<String>), GrammarError> {
        match self {
            Definition::Matcher(matcher) => {
                let name = matcher.pattern().to_string();
                Ok((Structure::Matcher(matcher.compile()?), Some(name)))
            }
            Definition::Sequence(sequence) => Ok((Structure::Sequence(sequence.compile()?), None)),
            Definition::Switch(switch) => Ok((Structure::Switch(switch.compile()), None)),
        }
    }
}

impl From<Matcher> for Definition {
    fn from(matcher: Matcher) -> Self {
        Definition::Matcher(matcher)
    }
}

impl From<Sequence> for Definition {
    fn from(sequence: Sequence) -> Self {
        Definition::Sequence(sequence)
    }
}

impl From<Switch> for Definition {
    fn from(switch: Switch) -> Self {
        Definition::Switch(switch)
    }
}
