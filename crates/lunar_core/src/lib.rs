//! lunar_core: Core types for the lunar Lua parser.
//!
//! Provides source positions and ranges, the Lua dialect feature table,
//! and the parser option set shared by the lexer and parser crates.

pub mod options;
pub mod text;
pub mod version;

// Re-export commonly used types
pub use options::{Encoding, Options, UnsupportedEncoding};
pub use text::{Location, Position, TextRange};
pub use version::{Features, LuaVersion, UnsupportedVersion};
