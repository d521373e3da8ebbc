//! MathLang token types
//!
//! The token set is closed: every lexeme is a name, a number, a string literal
//! or a single-character symbol.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A lexical token produced by the tokenizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    /// Identifier: ASCII letter followed by ASCII word characters
    Name(String),
    /// Digit run, held as a double
    Number(f64),
    /// String literal content with the outer quotes removed and `\"` unescaped
    StringLiteral(String),
    /// Any single non-word, non-whitespace character other than `"`
    Symbol(char),
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Name(_) => TokenKind::Name,
            Self::Number(_) => TokenKind::Number,
            Self::StringLiteral(_) => TokenKind::String,
            Self::Symbol(_) => TokenKind::Symbol,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            Self::StringLiteral(content) => Some(content),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<char> {
        match self {
            Self::Symbol(ch) => Some(*ch),
            _ => None,
        }
    }

    /// Check for a specific symbol character
    pub fn is_symbol(&self, expected: char) -> bool {
        self.as_symbol() == Some(expected)
    }

    /// Check for a name with the given text
    pub fn is_name(&self, expected: &str) -> bool {
        self.as_name() == Some(expected)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Number(_) | Self::StringLiteral(_))
    }
}

/// Renders the token back into MathLang source form
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            // f64 Display already drops the fraction of integral values
            Self::Number(value) => write!(f, "{}", value),
            Self::StringLiteral(content) => write!(f, "\"{}\"", content.replace('"', "\\\"")),
            Self::Symbol(ch) => write!(f, "{}", ch),
        }
    }
}

/// Fieldless mirror of [`Token`] used for rule names, counts and error tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenKind {
    Name,
    String,
    Number,
    Symbol,
}

impl TokenKind {
    /// Every kind, in rule priority order
    pub const ALL: [TokenKind; 4] = [
        TokenKind::Name,
        TokenKind::String,
        TokenKind::Number,
        TokenKind::Symbol,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Name => "Name",
            TokenKind::String => "String",
            TokenKind::Number => "Number",
            TokenKind::Symbol => "Symbol",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
