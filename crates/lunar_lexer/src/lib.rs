//! lunar_lexer: Tokenizer for Lua source text.
//!
//! Converts source text into a stream of positioned tokens, one `lex()`
//! call at a time, with full support for:
//! - dialect-gated keywords and operators
//! - short and long (bracketed) string literals
//! - the complete escape-sequence set, including `\z`, `\xXX` and `\u{...}`
//! - hex floats with fractions and binary exponents
//! - comment collection

mod encoding;
mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenValue};
