//! Escape handling for string and regexp literals.

use thiserror::Error;

/// Escapes understood inside `"..."` and `'...'` (the text after the backslash).
pub(crate) const DECODED_ESCAPES: &str =
    r#"[uU][a-fA-F0-9]{4}|x[a-fA-F0-9]{2}|[0-7]{1,3}|N\{[^\}\r\n'"]+\}|\r?\n|\r|[^\r\nuUxN0-7]"#;

/// Escapes inside raw strings and regexps: any single character or line break.
pub(crate) const VERBATIM_ESCAPES: &str = r"\r?\n|\r|.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("escape \\{0} is not a valid character")]
    InvalidCodePoint(String),
    #[error("named character escape \\{0} is not supported")]
    NamedCharacter(String),
}

/// Decodes the text following a backslash in a regular string literal.
pub fn decode_escape(escape: &str) -> Result<String, LiteralError> {
    let mut chars = escape.chars();
    let Some(first) = chars.next() else {
        return Ok(String::new());
    };
    let decoded = match first {
        'u' | 'U' | 'x' => code_point(&escape[1..], 16, escape)?,
        '0'..='7' => code_point(escape, 8, escape)?,
        '\r' | '\n' => return Ok(String::new()),
        'N' => return Err(LiteralError::NamedCharacter(escape.to_string())),
        'a' if escape.len() == 1 => '\u{07}',
        'b' if escape.len() == 1 => '\u{08}',
        'f' if escape.len() == 1 => '\u{0c}',
        'n' if escape.len() == 1 => '\n',
        'r' if escape.len() == 1 => '\r',
        't' if escape.len() == 1 => '\t',
        'v' if escape.len() == 1 => '\u{0b}',
        _ => return Ok(escape.to_string()),
    };
    Ok(decoded.to_string())
}

fn code_point(digits: &str, radix: u32, escape: &str) -> Result<char, LiteralError> {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| LiteralError::InvalidCodePoint(escape.to_string()))
}

/// Keeps an escape as written, except that an escaped delimiter stands for
/// the delimiter itself.
pub fn verbatim_escape(escape: &str, delimiter: &str) -> String {
    if escape == delimiter {
        escape.to_string()
    } else {
        format!("\\{escape}")
    }
}

/// Quotes `text` so that decoding the result gives `text` back.
pub fn quote_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str(r"\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str(r"\n"),
            '\r' => quoted.push_str(r"\r"),
            '\t' => quoted.push_str(r"\t"),
            c if c.is_control() && (c as u32) < 0x100 => {
                quoted.push_str(&format!("\\x{:02x}", c as u32))
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Writes a regexp between slashes, escaping slashes inside it.
pub fn quote_regexp(pattern: &str) -> String {
    format!("/{}/", pattern.replace('/', r"\/"))
}
