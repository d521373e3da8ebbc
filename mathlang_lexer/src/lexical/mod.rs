//! Lexical analysis for MathLang
//!
//! [`Tokenizer`] is the pull-based core; the functions here run a whole pass and
//! collect the result into a [`TokenStream`] for parsers that want lookahead.

pub mod rules;
pub mod tokenizer;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::logging::codes;
use crate::tokens::{TokenKind, TokenStream};
use crate::utils::SourceMap;
use crate::{log_debug, log_success};
use serde::Serialize;
use std::time::Instant;

pub use rules::{Rule, RULES};
pub use tokenizer::{ConstructionError, LexicalMetrics, TokenReader, Tokenizer, TokenizerError};

// ============================================================================
// MODULE API
// ============================================================================

/// Tokenize a complete source with preferences taken from the environment
pub fn tokenize(source: &str) -> Result<TokenStream, TokenizerError> {
    tokenize_with_preferences(source, LexicalPreferences::default())
}

/// Tokenize a complete source; stops at the first error
pub fn tokenize_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> Result<TokenStream, TokenizerError> {
    let start_time = Instant::now();
    let mut tokenizer = Tokenizer::with_preferences(source, preferences);
    let mut tokens = Vec::new();

    while let Some(spanned) = tokenizer.next_spanned()? {
        tokens.push(spanned);
    }

    let metrics = tokenizer.metrics();
    log_success!(
        codes::success::TOKENIZATION_COMPLETE,
        "Tokenization completed",
        "tokens" => tokens.len(),
        "names" => metrics.name_tokens,
        "numbers" => metrics.number_tokens,
        "strings" => metrics.string_tokens,
        "symbols" => metrics.symbol_tokens,
        "duration_ms" => format!("{:.2}", start_time.elapsed().as_secs_f64() * 1000.0)
    );

    Ok(TokenStream::with_source_map(
        tokens,
        SourceMap::new(source.to_string()),
    ))
}

/// Tokenize the contents of a processed source file
pub fn tokenize_file_result(
    file_result: &FileProcessingResult,
) -> Result<TokenStream, TokenizerError> {
    tokenize_file_result_with_preferences(file_result, LexicalPreferences::default())
}

pub fn tokenize_file_result_with_preferences(
    file_result: &FileProcessingResult,
    preferences: LexicalPreferences,
) -> Result<TokenStream, TokenizerError> {
    log_debug!("Starting lexical analysis",
        "file" => file_result.display_path(),
        "char_count" => file_result.char_count(),
        "line_count" => file_result.metadata.line_count,
        "max_tokens_allowed" => MAX_TOKEN_COUNT
    );

    tokenize_with_preferences(&file_result.source, preferences)
}

/// Create a tokenizer with preferences taken from the environment
pub fn create_tokenizer(source: &str) -> Tokenizer<'_> {
    Tokenizer::new(source)
}

pub fn create_tokenizer_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> Tokenizer<'_> {
    Tokenizer::with_preferences(source, preferences)
}

// ============================================================================
// TOKEN COUNTS
// ============================================================================

/// Per-kind token totals of a collected stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenCounts {
    pub names: usize,
    pub numbers: usize,
    pub strings: usize,
    pub symbols: usize,
}

impl TokenCounts {
    pub fn total(&self) -> usize {
        self.names + self.numbers + self.strings + self.symbols
    }

    pub fn get(&self, kind: TokenKind) -> usize {
        match kind {
            TokenKind::Name => self.names,
            TokenKind::Number => self.numbers,
            TokenKind::String => self.strings,
            TokenKind::Symbol => self.symbols,
        }
    }
}

pub fn get_token_counts(stream: &TokenStream) -> TokenCounts {
    let mut counts = TokenCounts::default();

    for token in stream.iter() {
        match token.kind() {
            TokenKind::Name => counts.names += 1,
            TokenKind::Number => counts.numbers += 1,
            TokenKind::String => counts.strings += 1,
            TokenKind::Symbol => counts.symbols += 1,
        }
    }

    counts
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

/// Check that every lexical error code is registered and the limits are usable
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let required_codes = [
        codes::lexical::UNEXPECTED_CHARACTER,
        codes::lexical::UNTERMINATED_STRING,
        codes::lexical::INVALID_NUMBER,
        codes::lexical::NAME_TOO_LONG,
        codes::lexical::STRING_TOO_LARGE,
        codes::lexical::UNBALANCED_QUOTES,
        codes::lexical::TOO_MANY_TOKENS,
    ];

    for code in &required_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    if MAX_TOKEN_COUNT == 0 || MAX_NAME_LENGTH == 0 || MAX_NUMBER_LENGTH == 0 {
        return Err("Lexical limits must be non-zero".to_string());
    }

    log_debug!("Lexical limits initialized",
        "max_token_count" => MAX_TOKEN_COUNT,
        "max_name_length" => MAX_NAME_LENGTH,
        "max_string_size" => MAX_STRING_SIZE,
        "max_number_length" => MAX_NUMBER_LENGTH
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Token;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    fn quiet() -> LexicalPreferences {
        LexicalPreferences {
            collect_metrics: true,
            log_each_token: false,
            include_position_in_errors: false,
        }
    }

    #[test]
    fn test_tokenize_collects_spanned_stream() {
        let stream = tokenize_with_preferences("f(x) = \"y\"\n  + 10", quiet()).unwrap();

        assert_eq!(stream.len(), 8);
        let last = stream.tokens().last().unwrap();
        assert_eq!(last.value, Token::Number(10.0));
        assert_eq!(last.span.start().line, 2);
        assert_eq!(last.span.start().column, 5);
        assert_eq!(stream.source_text(&last.span), Some("10"));
    }

    #[test]
    fn test_tokenize_stops_at_first_error() {
        let result = tokenize_with_preferences("ok \"broken", quiet());
        assert_matches!(result, Err(TokenizerError::UnbalancedQuotes { .. }));

        let result = tokenize_with_preferences("1 + \"broken", quiet());
        assert_matches!(result, Err(TokenizerError::UnterminatedString { .. }));
    }

    #[test]
    fn test_empty_source_gives_empty_stream() {
        let stream = tokenize_with_preferences(" \n ", quiet()).unwrap();
        assert!(stream.is_empty());
        assert!(stream.is_at_end());
    }

    #[test]
    fn test_token_counts() {
        let stream = tokenize_with_preferences("a = \"s\" + 1 + b", quiet()).unwrap();
        let counts = get_token_counts(&stream);

        assert_eq!(counts.names, 2);
        assert_eq!(counts.get(TokenKind::Symbol), 3);
        assert_eq!(counts.strings, 1);
        assert_eq!(counts.numbers, 1);
        assert_eq!(counts.total(), stream.len());
    }

    #[test]
    fn test_tokenize_file_result() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("circle.mlang");
        fs::write(&file_path, "r = 2\narea = pi * r * r\n").unwrap();

        let file_result = crate::file_processor::create_processor()
            .process_file(&file_path)
            .unwrap();
        let stream = tokenize_file_result_with_preferences(&file_result, quiet()).unwrap();

        assert_eq!(stream.len(), 10);
        assert!(stream.tokens()[3].value.is_name("area"));
        assert_eq!(stream.tokens()[3].span.start().line, 2);
    }

    #[test]
    fn test_init_lexical_analysis_logging() {
        assert!(init_lexical_analysis_logging().is_ok());
    }

    #[test]
    fn test_create_tokenizer() {
        let mut tokenizer = create_tokenizer_with_preferences("x", quiet());
        assert_eq!(tokenizer.next_token(), Ok(Some(Token::Name("x".to_string()))));
        assert!(create_tokenizer("").is_exhausted());
    }
}
