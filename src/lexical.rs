//! Stock placeholder matchers for blanks and line breaks.
//!
//! All of them produce no value, so they vanish from the values a sequence
//! collects.

use crate::combinators::Matcher;

/// One or more spaces or tabs.
pub fn space() -> Matcher {
    Matcher::placeholder(r"[ \t]+")
}

/// Zero or more spaces or tabs.
pub fn optional_space() -> Matcher {
    Matcher::placeholder(r"[ \t]*")
}

/// One or more spaces, tabs or line breaks.
pub fn space_newline() -> Matcher {
    Matcher::placeholder(r"[ \t\n\r]+")
}

pub fn optional_space_newline() -> Matcher {
    Matcher::placeholder(r"[ \t\n\r]*")
}

/// A single `\n`, `\r\n` or `\r`.
pub fn newline() -> Matcher {
    Matcher::placeholder(r"\r\n?|\n")
}

/// Zero or more blanks, where a backslash right before a line break continues
/// the line.
pub fn escaped_optional_space() -> Matcher {
    Matcher::placeholder(r"[ \t]*(?:\\(?:\r\n?|\n)[ \t]*)*")
}
