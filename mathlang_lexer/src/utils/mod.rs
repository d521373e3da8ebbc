//! Shared source-location types used by the tokenizer, token stream and diagnostics.

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
