//! Collected token stream with a parser cursor
//!
//! Holds the tokens of a completed tokenizer pass together with their spans so a
//! parser can look ahead, backtrack and render diagnostics against the source.

use crate::tokens::token::{Token, TokenKind};
use crate::utils::{SourceMap, Span, Spanned};
use thiserror::Error;

/// A token with span information
pub type SpannedToken = Spanned<Token>;

/// Saved cursor position for backtracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<SpannedToken>,
    /// Index of the current token
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens,
            position: 0,
            source_map: None,
        }
    }

    /// Create stream with source map for error reporting
    pub fn with_source_map(tokens: Vec<SpannedToken>, source_map: SourceMap) -> Self {
        Self {
            tokens,
            position: 0,
            source_map: Some(source_map),
        }
    }

    // === CORE NAVIGATION ===

    /// Get the current token with its span
    pub fn current(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position)
    }

    /// Get the current token value (without span)
    pub fn current_token(&self) -> Option<&Token> {
        self.current().map(|spanned| &spanned.value)
    }

    pub fn current_span(&self) -> Option<Span> {
        self.current().map(|spanned| spanned.span)
    }

    /// Peek at the token after the current one
    pub fn peek(&self) -> Option<&SpannedToken> {
        self.peek_ahead(1)
    }

    /// Peek `n` tokens past the current one (`peek_ahead(0)` is `current`)
    pub fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        self.tokens.get(self.position + n)
    }

    /// Move to the next token and return it
    pub fn advance(&mut self) -> Option<&SpannedToken> {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        self.current()
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining_count(&self) -> usize {
        self.tokens.len().saturating_sub(self.position)
    }

    // === BACKTRACKING ===

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.position)
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.0.min(self.tokens.len());
    }

    // === PARSER INTEGRATION ===

    /// Check whether the current token is of the given kind
    pub fn check_kind(&self, kind: TokenKind) -> bool {
        self.current_token().is_some_and(|token| token.kind() == kind)
    }

    /// Consume the current token if it matches the predicate
    pub fn consume_if<F>(&mut self, predicate: F) -> Option<SpannedToken>
    where
        F: FnOnce(&Token) -> bool,
    {
        let matched = self.current().filter(|spanned| predicate(&spanned.value)).cloned();
        if matched.is_some() {
            self.advance();
        }
        matched
    }

    /// Consume the current token if it is the given symbol
    pub fn consume_symbol(&mut self, symbol: char) -> bool {
        self.consume_if(|token| token.is_symbol(symbol)).is_some()
    }

    /// Consume a token of the given kind or report what was found instead
    pub fn expect_kind(&mut self, expected: TokenKind) -> Result<SpannedToken, TokenStreamError> {
        let Some(current) = self.current() else {
            return Err(TokenStreamError::UnexpectedEndOfStream { expected });
        };

        if current.value.kind() != expected {
            return Err(TokenStreamError::UnexpectedToken {
                expected,
                found: current.value.to_string(),
                span: current.span,
            });
        }

        let result = current.clone();
        self.advance();
        Ok(result)
    }

    // === ITERATION ===

    /// All tokens with spans, independent of the cursor
    pub fn tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }

    pub fn remaining_tokens(&self) -> &[SpannedToken] {
        &self.tokens[self.position.min(self.tokens.len())..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().map(|spanned| &spanned.value)
    }

    pub fn into_tokens(self) -> Vec<SpannedToken> {
        self.tokens
    }

    // === ERROR REPORTING ===

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    /// Format an error with source context when a source map is attached
    pub fn format_error(&self, span: Span, message: &str) -> String {
        match &self.source_map {
            Some(source_map) => source_map.format_error(&span, message),
            None => format!("Error at {}: {}", span, message),
        }
    }

    /// Get source text for a span (if source map available)
    pub fn source_text(&self, span: &Span) -> Option<&str> {
        self.source_map.as_ref().map(|sm| sm.span_text(span))
    }

    /// One-line cursor summary for debugging
    pub fn diagnostic(&self) -> String {
        let current_info = match self.current() {
            Some(current) => format!("'{}' at {}", current.value, current.span),
            None => "<end>".to_string(),
        };

        format!(
            "TokenStream(pos: {}/{}, current: {})",
            self.position,
            self.tokens.len(),
            current_info
        )
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a SpannedToken;
    type IntoIter = std::slice::Iter<'a, SpannedToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenStreamError {
    #[error("Expected {expected}, found '{found}' at {span}")]
    UnexpectedToken {
        expected: TokenKind,
        found: String,
        span: Span,
    },

    #[error("Expected {expected}, but reached end of input")]
    UnexpectedEndOfStream { expected: TokenKind },
}
