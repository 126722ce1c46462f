//! Grammarkit: recursive-descent parser combinators with backtracking.
//!
//! ```rust
//! use grammarkit::{Grammar, Matcher, Sequence, Switch, Value};
//!
//! let mut grammar = Grammar::new();
//! let word = grammar
//!     .define(Matcher::new("[a-z]+").map_value(|m, _| Value::text(m.as_str())))
//!     .unwrap();
//! let comma = grammar.define(Matcher::literal_placeholder(",")).unwrap();
//! let list = grammar.declare_named("list");
//! let tail = grammar.define(Sequence::new([comma, list]).flatten()).unwrap();
//! let rest = grammar.define(Switch::new([tail]).allow_no_match()).unwrap();
//! grammar.bind(list, Sequence::new([word, rest]).flatten()).unwrap();
//!
//! let parsed = grammar.fullparse_str(list, "a,b,c").unwrap();
//! assert_eq!(parsed.value.unwrap().to_string(), r#"#2:["a" "b" "c"]"#);
//! ```

pub use crate::combinators::{Definition, MatchDetails, Matcher, Sequence, Switch};
pub use crate::errors::{ErrorKind, GrammarError, MapperError, ParseError, Source};
pub use crate::grammar::{Grammar, Origin, Parsed, StructureId, StructureKind};
pub use crate::value::Value;

pub mod cli;
pub mod combinators;
pub mod ebnf;
pub mod errors;
pub mod grammar;
pub mod lexical;
pub mod value;
