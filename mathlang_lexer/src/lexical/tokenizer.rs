//! Pull-based MathLang tokenizer
//!
//! The tokenizer borrows its source and keeps a single cursor into it. Each call
//! tries the rules of [`RULES`] in priority order at the cursor, builds the token
//! for the first match and moves the cursor past the matched text and any
//! whitespace that follows.

use super::rules::{is_separator, name_length, RULES};
use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{Token, TokenKind, TokenStream};
use crate::utils::{Position, Span, Spanned};
use crate::{log_debug, log_error};
use serde::Serialize;
use std::collections::BTreeMap;
use std::iter::FusedIterator;
use std::num::ParseFloatError;

/// Longest lexeme excerpt kept inside an error
const LEXEME_PREVIEW_CHARS: usize = 32;

/// Failure of a token constructor on text its rule matched
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] ParseFloatError),

    #[error("Number too long: {length} digits (max {MAX_NUMBER_LENGTH})")]
    NumberTooLong { length: usize },

    #[error("Number out of range: {length} digits exceed the largest double")]
    NumberOutOfRange { length: usize },

    #[error("Name too long: {length} characters (max {MAX_NAME_LENGTH})")]
    NameTooLong { length: usize },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize },

    #[error("Not a single symbol character: '{text}'")]
    InvalidSymbol { text: String },
}

impl ConstructionError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ConstructionError::InvalidNumber(_)
            | ConstructionError::NumberTooLong { .. }
            | ConstructionError::NumberOutOfRange { .. } => codes::lexical::INVALID_NUMBER,
            ConstructionError::NameTooLong { .. } => codes::lexical::NAME_TOO_LONG,
            ConstructionError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            ConstructionError::InvalidSymbol { .. } => codes::lexical::UNEXPECTED_CHARACTER,
        }
    }
}

/// Fatal tokenization failures. The cursor stays where the failure occurred.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenizerError {
    #[error("Invalid {kind} token '{lexeme}' at {}: {source}", .span.start)]
    Construction {
        kind: TokenKind,
        lexeme: String,
        span: Span,
        #[source]
        source: ConstructionError,
    },

    #[error("Unexpected character '{character}' at {}", .span.start)]
    UnexpectedCharacter { character: char, span: Span },

    #[error("Unterminated string literal at {}", .span.start)]
    UnterminatedString { span: Span },

    #[error("Unbalanced quotes after '{word}' at {}", .span.start)]
    UnbalancedQuotes { word: String, span: Span },

    #[error("Too many tokens: limit of {MAX_TOKEN_COUNT} reached at {}", .span.start)]
    TooManyTokens { span: Span },
}

impl TokenizerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            TokenizerError::Construction { source, .. } => source.error_code(),
            TokenizerError::UnexpectedCharacter { .. } => codes::lexical::UNEXPECTED_CHARACTER,
            TokenizerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            TokenizerError::UnbalancedQuotes { .. } => codes::lexical::UNBALANCED_QUOTES,
            TokenizerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    /// Source span of the offending text
    pub fn span(&self) -> Span {
        match self {
            TokenizerError::Construction { span, .. }
            | TokenizerError::UnexpectedCharacter { span, .. }
            | TokenizerError::UnterminatedString { span }
            | TokenizerError::UnbalancedQuotes { span, .. }
            | TokenizerError::TooManyTokens { span } => *span,
        }
    }

    pub fn position(&self) -> Position {
        self.span().start()
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= LEXEME_PREVIEW_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(LEXEME_PREVIEW_CHARS).collect();
    format!("{}...", head)
}

/// Per-kind token counters gathered while tokenizing
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub name_tokens: usize,
    pub number_tokens: usize,
    pub string_tokens: usize,
    pub symbol_tokens: usize,
    /// Longest name, in bytes
    pub longest_name: usize,
    /// Largest unescaped string literal, in bytes
    pub longest_string: usize,
    pub symbol_usage: BTreeMap<char, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;

        match token {
            Token::Name(name) => {
                self.name_tokens += 1;
                self.longest_name = self.longest_name.max(name.len());
            }
            Token::Number(_) => self.number_tokens += 1,
            Token::StringLiteral(content) => {
                self.string_tokens += 1;
                self.longest_string = self.longest_string.max(content.len());
            }
            Token::Symbol(ch) => {
                self.symbol_tokens += 1;
                *self.symbol_usage.entry(*ch).or_insert(0) += 1;
            }
        }
    }

    pub fn count(&self, kind: TokenKind) -> usize {
        match kind {
            TokenKind::Name => self.name_tokens,
            TokenKind::String => self.string_tokens,
            TokenKind::Number => self.number_tokens,
            TokenKind::Symbol => self.symbol_tokens,
        }
    }
}

/// Contract between the tokenizer and a downstream parser.
///
/// `Ok(None)` signals end of input and keeps being returned once reached; any
/// `Err` aborts the parse.
pub trait TokenReader {
    fn next_token(&mut self) -> Result<Option<Token>, TokenizerError>;
}

pub struct Tokenizer<'src> {
    source: &'src str,
    position: Position,
    tokens_emitted: usize,
    /// Set once the iterator has yielded an error
    failed: bool,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_preferences(source, LexicalPreferences::default())
    }

    /// Leading whitespace of the source is skipped immediately.
    pub fn with_preferences(source: &'src str, preferences: LexicalPreferences) -> Self {
        let position = Position::start().advance_str(leading_whitespace(source));

        Self {
            source,
            position,
            tokens_emitted: 0,
            failed: false,
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Produce the next token, or `Ok(None)` once the input is consumed
    pub fn next_token(&mut self) -> Result<Option<Token>, TokenizerError> {
        Ok(self.next_spanned()?.map(Spanned::into_inner))
    }

    /// Like `next_token`, with the source span of the matched text
    pub fn next_spanned(&mut self) -> Result<Option<Spanned<Token>>, TokenizerError> {
        let rest = self.remaining();
        let Some(first) = rest.chars().next() else {
            return Ok(None);
        };

        if self.tokens_emitted >= MAX_TOKEN_COUNT {
            let span = Span::new(self.position, self.position);
            return Err(self.report(TokenizerError::TooManyTokens { span }));
        }

        for rule in RULES.iter() {
            let Some(length) = rule.try_match(rest) else {
                continue;
            };

            let text = &rest[..length];
            let span = Span::covering(self.position, text);

            let token = match (rule.build)(text) {
                Ok(token) => token,
                Err(source) => {
                    return Err(self.report(TokenizerError::Construction {
                        kind: rule.kind,
                        lexeme: preview(text),
                        span,
                        source,
                    }));
                }
            };

            self.position = span.end().advance_str(leading_whitespace(&rest[length..]));
            self.tokens_emitted += 1;

            if self.preferences.collect_metrics {
                self.metrics.record_token(&token);
            }
            if self.preferences.log_each_token {
                log_debug!("Token produced",
                    "kind" => rule.kind,
                    "text" => text,
                    "position" => span.start()
                );
            }

            return Ok(Some(Spanned::new(token, span)));
        }

        let error = self.classify_unmatched(rest, first);
        Err(self.report(error))
    }

    /// Explain why no rule accepted the input at the cursor
    fn classify_unmatched(&self, rest: &str, first: char) -> TokenizerError {
        if first == '"' {
            let line_end = rest.find('\n').unwrap_or(rest.len());
            let span = Span::covering(self.position, rest[..line_end].trim_end_matches('\r'));
            return TokenizerError::UnterminatedString { span };
        }

        if let Some(length) = name_length(rest) {
            let word = &rest[..length];
            return TokenizerError::UnbalancedQuotes {
                word: preview(word),
                span: Span::covering(self.position, word),
            };
        }

        TokenizerError::UnexpectedCharacter {
            character: first,
            span: Span::covering(self.position, &rest[..first.len_utf8()]),
        }
    }

    fn report(&self, error: TokenizerError) -> TokenizerError {
        let message = error.to_string();

        if self.preferences.include_position_in_errors {
            let span = error.span();
            log_error!(error.error_code(), &message, span = span,
                "line" => span.start().line,
                "column" => span.start().column,
                "tokens_emitted" => self.tokens_emitted
            );
        } else {
            log_error!(error.error_code(), &message,
                "tokens_emitted" => self.tokens_emitted
            );
        }

        error
    }

    // === ACCESSORS ===

    /// The unconsumed input, starting at the next token
    pub fn remaining(&self) -> &'src str {
        &self.source[self.position.offset..]
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining().is_empty()
    }

    pub fn tokens_emitted(&self) -> usize {
        self.tokens_emitted
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }
}

fn leading_whitespace(text: &str) -> &str {
    &text[..text.len() - text.trim_start_matches(is_separator).len()]
}

impl TokenReader for Tokenizer<'_> {
    fn next_token(&mut self) -> Result<Option<Token>, TokenizerError> {
        Tokenizer::next_token(self)
    }
}

/// Replays an already collected stream
impl TokenReader for TokenStream {
    fn next_token(&mut self) -> Result<Option<Token>, TokenizerError> {
        let token = self.current_token().cloned();
        self.advance();
        Ok(token)
    }
}

/// Yields tokens until end of input; stops for good after the first error.
impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, TokenizerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match Tokenizer::next_token(self) {
            Ok(token) => token.map(Ok),
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}

impl FusedIterator for Tokenizer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::error::Error;

    fn quiet() -> LexicalPreferences {
        LexicalPreferences {
            collect_metrics: true,
            log_each_token: false,
            include_position_in_errors: true,
        }
    }

    fn tokens(source: &str) -> Vec<Token> {
        Tokenizer::with_preferences(source, quiet())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn name(text: &str) -> Token {
        Token::Name(text.to_string())
    }

    fn string(text: &str) -> Token {
        Token::StringLiteral(text.to_string())
    }

    #[test]
    fn test_mixed_expression() {
        assert_eq!(
            tokens("area = pi * r ^ 2"),
            vec![
                name("area"),
                Token::Symbol('='),
                name("pi"),
                Token::Symbol('*'),
                name("r"),
                Token::Symbol('^'),
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_adjacent_tokens_without_whitespace() {
        assert_eq!(
            tokens("f(x1,\"a\")+12"),
            vec![
                name("f"),
                Token::Symbol('('),
                name("x1"),
                Token::Symbol(','),
                string("a"),
                Token::Symbol(')'),
                Token::Symbol('+'),
                Token::Number(12.0),
            ]
        );
    }

    #[test]
    fn test_quoted_word_is_string_not_name() {
        assert_eq!(tokens("\"foo\""), vec![string("foo")]);
        assert_eq!(
            tokens("say \"hello world\" now"),
            vec![name("say"), string("hello world"), name("now")]
        );
    }

    #[test]
    fn test_escaped_quote_is_unescaped() {
        assert_eq!(tokens(r#""a\"b""#), vec![string("a\"b")]);
        assert_eq!(tokens(r#""back\slash""#), vec![string("back\\slash")]);
    }

    #[test]
    fn test_numbers_are_digit_runs() {
        assert_eq!(tokens("42"), vec![Token::Number(42.0)]);
        assert_eq!(
            tokens("3.14"),
            vec![Token::Number(3.0), Token::Symbol('.'), Token::Number(14.0)]
        );
        assert_eq!(tokens("-7"), vec![Token::Symbol('-'), Token::Number(7.0)]);
        assert_eq!(tokens("2x"), vec![Token::Number(2.0), name("x")]);
    }

    #[test]
    fn test_symbol_fallback() {
        assert_eq!(tokens("+"), vec![Token::Symbol('+')]);
        assert_eq!(tokens("≤"), vec![Token::Symbol('≤')]);
    }

    #[test]
    fn test_empty_and_whitespace_input_is_exhausted() {
        for source in ["", "   ", "\n\t \r\n"] {
            let mut tokenizer = Tokenizer::with_preferences(source, quiet());
            assert!(tokenizer.is_exhausted());
            assert_eq!(tokenizer.next_token(), Ok(None));
        }
    }

    #[test]
    fn test_empty_string_literal() {
        assert_eq!(tokens("\"\""), vec![string("")]);
        assert_eq!(tokens("x = \"\""), vec![name("x"), Token::Symbol('='), string("")]);
    }

    #[test]
    fn test_exhaustion_is_idempotent() {
        let mut tokenizer = Tokenizer::with_preferences("a", quiet());
        assert_eq!(tokenizer.next_token(), Ok(Some(name("a"))));
        for _ in 0..3 {
            assert_eq!(tokenizer.next_token(), Ok(None));
        }
        assert_eq!(tokenizer.tokens_emitted(), 1);
    }

    #[test]
    fn test_round_trip_through_display() {
        let source = "total = sum ( \"a \\\" b\" , 10 ) + x_2";
        let rendered: Vec<String> = tokens(source).iter().map(Token::to_string).collect();
        assert_eq!(rendered.join(" "), source);
    }

    #[test]
    fn test_cursor_advances_past_match_and_whitespace() {
        let mut tokenizer = Tokenizer::with_preferences("  ab  \n +", quiet());
        assert_eq!(tokenizer.position(), Position::new(2, 1, 3));
        assert_eq!(tokenizer.remaining(), "ab  \n +");

        let first = tokenizer.next_spanned().unwrap().unwrap();
        assert_eq!(first.span, Span::new(Position::new(2, 1, 3), Position::new(4, 1, 5)));
        assert_eq!(tokenizer.position(), Position::new(8, 2, 2));
        assert_eq!(tokenizer.remaining(), "+");

        let second = tokenizer.next_spanned().unwrap().unwrap();
        assert_eq!(second.span.start(), Position::new(8, 2, 2));
        assert!(tokenizer.is_exhausted());
    }

    #[test]
    fn test_unterminated_string_is_fatal() {
        let mut tokenizer = Tokenizer::with_preferences("1 + \"abc", quiet());
        assert_eq!(tokenizer.next_token(), Ok(Some(Token::Number(1.0))));
        assert_eq!(tokenizer.next_token(), Ok(Some(Token::Symbol('+'))));

        let error = tokenizer.next_token().unwrap_err();
        assert_matches!(error, TokenizerError::UnterminatedString { .. });
        assert_eq!(error.position(), Position::new(4, 1, 5));
        assert_eq!(error.span().len(), 4);
        assert_eq!(error.error_code(), codes::lexical::UNTERMINATED_STRING);
    }

    #[test]
    fn test_string_does_not_cross_lines() {
        let mut tokenizer = Tokenizer::with_preferences("\"one\ntwo\"", quiet());
        assert_matches!(
            tokenizer.next_token(),
            Err(TokenizerError::UnterminatedString { span }) if span.len() == 4
        );
    }

    #[test]
    fn test_word_before_unclosed_quote_is_unbalanced() {
        let mut tokenizer = Tokenizer::with_preferences("alpha \"", quiet());
        assert_matches!(
            tokenizer.next_token(),
            Err(TokenizerError::UnbalancedQuotes { ref word, .. }) if word == "alpha"
        );
    }

    #[test]
    fn test_unexpected_character() {
        let mut tokenizer = Tokenizer::with_preferences("_hidden", quiet());
        let error = tokenizer.next_token().unwrap_err();

        assert_matches!(error, TokenizerError::UnexpectedCharacter { character: '_', .. });
        assert!(error.requires_halt());
        assert_eq!(error.category(), "Lexical");
        assert_eq!(error.to_string(), "Unexpected character '_' at 1:1");
    }

    #[test]
    fn test_error_leaves_cursor_in_place() {
        let mut tokenizer = Tokenizer::with_preferences("1 _", quiet());
        tokenizer.next_token().unwrap();
        let before = tokenizer.position();

        let first = tokenizer.next_token().unwrap_err();
        assert_eq!(tokenizer.position(), before);
        assert_eq!(tokenizer.next_token().unwrap_err(), first);
    }

    #[test]
    fn test_construction_error_exposes_source() {
        let source = "n".repeat(MAX_NAME_LENGTH + 1);
        let mut tokenizer = Tokenizer::with_preferences(&source, quiet());
        let error = tokenizer.next_token().unwrap_err();

        assert_matches!(
            error,
            TokenizerError::Construction {
                kind: TokenKind::Name,
                source: ConstructionError::NameTooLong { .. },
                ..
            }
        );
        assert_eq!(error.error_code(), codes::lexical::NAME_TOO_LONG);
        assert!(error.source().is_some());
        assert_eq!(tokenizer.position(), Position::start());
    }

    #[test]
    fn test_token_limit_is_fatal_once_reached() {
        let source = "+".repeat(MAX_TOKEN_COUNT + 1);
        let mut tokenizer = Tokenizer::with_preferences(&source, quiet());

        for _ in 0..MAX_TOKEN_COUNT {
            assert_eq!(tokenizer.next_token(), Ok(Some(Token::Symbol('+'))));
        }
        assert_eq!(tokenizer.tokens_emitted(), MAX_TOKEN_COUNT);

        let before = tokenizer.position();
        assert_eq!(before.offset, MAX_TOKEN_COUNT);

        let error = tokenizer.next_token().unwrap_err();
        assert_matches!(error, TokenizerError::TooManyTokens { .. });
        assert_eq!(error.error_code(), codes::lexical::TOO_MANY_TOKENS);
        assert_eq!(error.position(), before);
        assert_eq!(tokenizer.position(), before);
        assert_eq!(tokenizer.remaining(), "+");
    }

    #[test]
    fn test_token_limit_allows_exactly_the_maximum() {
        let source = format!("{} \n", "+".repeat(MAX_TOKEN_COUNT));
        let mut tokenizer = Tokenizer::with_preferences(&source, quiet());

        for _ in 0..MAX_TOKEN_COUNT {
            assert_matches!(tokenizer.next_token(), Ok(Some(_)));
        }
        assert_eq!(tokenizer.next_token(), Ok(None));
        assert_eq!(tokenizer.next_token(), Ok(None));
    }

    #[test]
    fn test_large_digit_runs() {
        let largest_power = format!("1{}", "0".repeat(308));
        assert_eq!(tokens(&largest_power), vec![Token::Number(1e308)]);

        let padded_one = format!("{}1 + 2", "0".repeat(400));
        assert_eq!(
            tokens(&padded_one),
            vec![Token::Number(1.0), Token::Symbol('+'), Token::Number(2.0)]
        );

        let overflow = "9".repeat(400);
        let mut tokenizer = Tokenizer::with_preferences(&overflow, quiet());
        let error = tokenizer.next_token().unwrap_err();
        assert_matches!(
            error,
            TokenizerError::Construction {
                kind: TokenKind::Number,
                source: ConstructionError::NumberOutOfRange { .. },
                ..
            }
        );
        assert_eq!(error.error_code(), codes::lexical::INVALID_NUMBER);
        assert_eq!(tokenizer.position(), Position::start());
    }

    #[test]
    fn test_only_ascii_separators_split_tokens() {
        assert_eq!(
            tokens("a\u{A0}b"),
            vec![name("a"), Token::Symbol('\u{A0}'), name("b")]
        );
        assert_eq!(
            tokens("\x0B\x0Cx\x0B=\x0C1"),
            vec![name("x"), Token::Symbol('='), Token::Number(1.0)]
        );
        assert_eq!(
            tokens("\u{2003}1"),
            vec![Token::Symbol('\u{2003}'), Token::Number(1.0)]
        );
    }

    #[test]
    fn test_iterator_fuses_after_error() {
        let mut tokenizer = Tokenizer::with_preferences("1 _ 2", quiet());

        assert_matches!(tokenizer.next(), Some(Ok(Token::Number(_))));
        assert_matches!(tokenizer.next(), Some(Err(_)));
        assert!(tokenizer.next().is_none());
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_token_reader_contract() {
        fn drain(reader: &mut impl TokenReader) -> Vec<Token> {
            let mut out = Vec::new();
            while let Some(token) = reader.next_token().unwrap() {
                out.push(token);
            }
            out
        }

        let mut tokenizer = Tokenizer::with_preferences("a + 1", quiet());
        let collected = drain(&mut tokenizer);
        assert_eq!(collected.len(), 3);

        let spanned: Vec<Spanned<Token>> = collected
            .into_iter()
            .map(|token| Spanned::new(token, Span::dummy()))
            .collect();
        let mut stream = TokenStream::new(spanned);
        assert_eq!(drain(&mut stream), vec![name("a"), Token::Symbol('+'), Token::Number(1.0)]);
        assert_eq!(TokenReader::next_token(&mut stream), Ok(None));
    }

    #[test]
    fn test_metrics_collection() {
        let mut tokenizer = Tokenizer::with_preferences("abc = \"xy\" + 1 + long_name", quiet());
        while tokenizer.next_token().unwrap().is_some() {}

        let metrics = tokenizer.metrics();
        assert_eq!(metrics.total_tokens, 7);
        assert_eq!(metrics.count(TokenKind::Name), 2);
        assert_eq!(metrics.count(TokenKind::Symbol), 3);
        assert_eq!(metrics.symbol_usage.get(&'+'), Some(&2));
        assert_eq!(metrics.longest_name, 9);
        assert_eq!(metrics.longest_string, 2);
    }

    #[test]
    fn test_metrics_disabled() {
        let preferences = LexicalPreferences {
            collect_metrics: false,
            ..quiet()
        };
        let mut tokenizer = Tokenizer::with_preferences("a b c", preferences);
        while tokenizer.next_token().unwrap().is_some() {}

        assert_eq!(tokenizer.tokens_emitted(), 3);
        assert_eq!(tokenizer.metrics(), &LexicalMetrics::default());
    }

    #[test]
    fn test_long_lexemes_are_previewed_in_errors() {
        let source = "9".repeat(MAX_NUMBER_LENGTH + 1);
        let error = Tokenizer::with_preferences(&source, quiet())
            .next_token()
            .unwrap_err();

        assert_matches!(
            error,
            TokenizerError::Construction { ref lexeme, .. } if lexeme.ends_with("...")
        );
    }
}
