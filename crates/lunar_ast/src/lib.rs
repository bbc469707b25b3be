//! lunar_ast: Abstract syntax tree definitions for the lunar Lua parser.
//!
//! This crate defines all AST node types, the `TokenKind` enum shared with
//! the lexer, and the node-constructor functions the parser calls. The tree
//! is plain owned data: children are exclusively owned by their parents and
//! every node serializes to the conventional `{ "type": ... }` JSON shape.

pub mod builder;
pub mod node;
pub mod token_kind;

// Re-export key types
pub use node::*;
pub use token_kind::TokenKind;
