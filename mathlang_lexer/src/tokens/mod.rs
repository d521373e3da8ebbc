//! Token types for MathLang lexical analysis
//!
//! - [`Token`] - the four token variants a MathLang source is broken into
//! - [`TokenKind`] - fieldless tag used for rule names, counting and errors
//! - [`TokenStream`] - a completed tokenizer pass with spans, lookahead and checkpoints

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenKind};
pub use token_stream::{Checkpoint, SpannedToken, TokenStream, TokenStreamError};

pub use crate::utils::{Position, SourceMap, Span, Spanned};
