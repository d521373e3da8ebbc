//! MathLang lexer
//!
//! Converts MathLang source text into names, numbers, string literals and
//! single-character symbols for a downstream parser.

pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use lexical::{tokenize, TokenReader, Tokenizer, TokenizerError};
pub use tokens::{Token, TokenKind, TokenStream};
