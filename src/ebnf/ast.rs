//! Document model for parsed grammar definitions.
//!
//! `Display` writes a node back in grammar syntax, normalized: single spaces,
//! one rule per line, string literals double-quoted and regexps slash-delimited.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::literals::{quote_regexp, quote_string};

/// A grammar definition file: its rules in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub rules: Vec<Rule>,
}

impl Document {
    /// The first rule with this name.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Identifiers used in some rule but defined by none, in order of first use.
    pub fn undefined_references(&self) -> Vec<&str> {
        let mut used = Vec::new();
        for rule in &self.rules {
            rule.expression.collect_identifiers(&mut used);
        }
        let mut missing: Vec<&str> = Vec::new();
        for name in used {
            if self.rule(name).is_none() && !missing.contains(&name) {
                missing.push(name);
            }
        }
        missing
    }
}

/// `name ::= expression`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub expression: Expression,
}

/// Alternatives separated by `|`, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    pub alternatives: Vec<Alternative>,
}

impl Expression {
    fn collect_identifiers<'a>(&'a self, out: &mut Vec<&'a str>) {
        for part in self.alternatives.iter().flat_map(|a| &a.parts) {
            match &part.atom {
                Atom::Identifier(name) => out.push(name),
                Atom::Group(inner) | Atom::Optional(inner) => inner.collect_identifiers(out),
                Atom::Str(_) | Atom::Regexp(_) => {}
            }
        }
    }
}

/// Parts that must appear one after the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub atom: Atom,
    pub repeat: Option<Repeat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Atom {
    /// A string literal, escapes already decoded.
    Str(String),
    /// A regular expression literal.
    Regexp(String),
    /// A reference to another rule.
    Identifier(String),
    /// `( expression )`
    Group(Expression),
    /// `[ expression ]`
    Optional(Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Repeat {
    pub fn from_mark(mark: &str) -> Option<Self> {
        match mark {
            "*" => Some(Repeat::ZeroOrMore),
            "+" => Some(Repeat::OneOrMore),
            _ => None,
        }
    }

    pub fn mark(&self) -> &'static str {
        match self {
            Repeat::ZeroOrMore => "*",
            Repeat::OneOrMore => "+",
        }
    }
}

// ============================================================================
// DISPLAY
// ============================================================================

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ::= {}", self.name, self.expression)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, alternative) in self.alternatives.iter().enumerate() {
            if index > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{alternative}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, part) in self.parts.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.atom)?;
        if let Some(repeat) = self.repeat {
            write!(f, "{}", repeat.mark())?;
        }
        Ok(())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Str(text) => write!(f, "{}", quote_string(text)),
            Atom::Regexp(pattern) => write!(f, "{}", quote_regexp(pattern)),
            Atom::Identifier(name) => write!(f, "{name}"),
            Atom::Group(expression) => write!(f, "({expression})"),
            Atom::Optional(expression) => write!(f, "[{expression}]"),
        }
    }
}
