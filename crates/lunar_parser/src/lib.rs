//! lunar_parser: Recursive descent parser for Lua source text.
//!
//! Consumes tokens from [`lunar_lexer`] and produces an owned AST chunk,
//! with optional source locations, scope annotation and `goto`/`break`
//! control-flow validation.
//!
//! ```
//! use lunar_core::Options;
//!
//! let chunk = lunar_parser::parse("local x = 1", Options::default()).unwrap();
//! assert_eq!(chunk.body.len(), 1);
//! ```
//!
//! Deeply nested input recurses on the call stack; the practical nesting
//! limit is the thread's stack size.

mod callbacks;
mod flow;
mod marker;
mod parser;
mod precedence;
mod scope;

pub use callbacks::Callbacks;
pub use parser::{parse, Parser};
