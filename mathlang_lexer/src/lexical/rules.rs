//! Ordered lexical rules
//!
//! Each rule pairs a start-anchored matcher with a token constructor. The table
//! order is the priority: the first rule whose matcher accepts the remaining
//! input decides the token.

use super::tokenizer::ConstructionError;
use crate::config::compile_time::lexical::*;
use crate::tokens::{Token, TokenKind};

/// Returns the byte length of a match anchored at the start of the input
pub type Matcher = fn(&str) -> Option<usize>;

/// Builds a token from exactly the text a matcher accepted
pub type Constructor = fn(&str) -> Result<Token, ConstructionError>;

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub kind: TokenKind,
    pub matcher: Matcher,
    pub build: Constructor,
}

impl Rule {
    pub fn try_match(&self, input: &str) -> Option<usize> {
        (self.matcher)(input)
    }
}

/// The rule table in priority order: name, string, number, symbol
pub static RULES: [Rule; 4] = [
    Rule {
        kind: TokenKind::Name,
        matcher: match_name,
        build: build_name,
    },
    Rule {
        kind: TokenKind::String,
        matcher: match_string,
        build: build_string,
    },
    Rule {
        kind: TokenKind::Number,
        matcher: match_number,
        build: build_number,
    },
    Rule {
        kind: TokenKind::Symbol,
        matcher: match_symbol,
        build: build_symbol,
    },
];

// ============================================================================
// MATCHERS
// ============================================================================

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Length of the leading `[A-Za-z][A-Za-z0-9_]*` word, ignoring the quote check
pub fn name_length(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    if !bytes.first()?.is_ascii_alphabetic() {
        return None;
    }

    Some(
        bytes
            .iter()
            .position(|&b| !is_word_byte(b))
            .unwrap_or(bytes.len()),
    )
}

/// A name only matches when everything after it leaves no quote open, so a word
/// inside a string literal is never taken for a name.
pub fn match_name(input: &str) -> Option<usize> {
    let length = name_length(input)?;
    quotes_balanced(&input[length..]).then_some(length)
}

/// Scans for `"` pairs; inside an open literal a `"` preceded by a backslash
/// does not close it.
pub fn quotes_balanced(text: &str) -> bool {
    let mut open = false;
    let mut previous = 0u8;

    for &b in text.as_bytes() {
        if b == b'"' && !(open && previous == b'\\') {
            open = !open;
        }
        previous = b;
    }

    !open
}

/// `"` followed by content up to the first unescaped `"` on the same line
pub fn match_string(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.first() != Some(&b'"') {
        return None;
    }

    for i in 1..bytes.len() {
        match bytes[i] {
            b'\n' => return None,
            b'"' if bytes[i - 1] != b'\\' => return Some(i + 1),
            _ => {}
        }
    }

    None
}

pub fn match_number(input: &str) -> Option<usize> {
    let length = input.bytes().take_while(u8::is_ascii_digit).count();
    (length > 0).then_some(length)
}

/// Separator characters: space, tab, line feed, vertical tab, form feed and
/// carriage return. Other Unicode spaces are symbols.
pub fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Any one character that is not a separator, an ASCII word character or `"`
pub fn match_symbol(input: &str) -> Option<usize> {
    let ch = input.chars().next()?;
    if is_separator(ch) || ch.is_ascii_alphanumeric() || ch == '_' || ch == '"' {
        return None;
    }
    Some(ch.len_utf8())
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

pub fn build_name(text: &str) -> Result<Token, ConstructionError> {
    if text.len() > MAX_NAME_LENGTH {
        return Err(ConstructionError::NameTooLong { length: text.len() });
    }
    Ok(Token::Name(text.to_string()))
}

pub fn build_string(text: &str) -> Result<Token, ConstructionError> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text);

    let content = unescape(inner);
    if content.len() > MAX_STRING_SIZE {
        return Err(ConstructionError::StringTooLarge {
            size: content.len(),
        });
    }
    Ok(Token::StringLiteral(content))
}

/// Replaces every `\"` with `"`; all other backslashes are kept as written
pub fn unescape(content: &str) -> String {
    content.replace("\\\"", "\"")
}

/// Any digit run whose value is a finite double is accepted, leading zeros included
pub fn build_number(text: &str) -> Result<Token, ConstructionError> {
    if text.len() > MAX_NUMBER_LENGTH {
        return Err(ConstructionError::NumberTooLong { length: text.len() });
    }

    let value = text.parse::<f64>()?;
    if !value.is_finite() {
        return Err(ConstructionError::NumberOutOfRange { length: text.len() });
    }
    Ok(Token::Number(value))
}

pub fn build_symbol(text: &str) -> Result<Token, ConstructionError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(Token::Symbol(ch)),
        _ => Err(ConstructionError::InvalidSymbol {
            text: text.to_string(),
        }),
    }
}
