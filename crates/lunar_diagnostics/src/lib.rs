//! lunar_diagnostics: Error types and the parser's message catalog.
//!
//! All parse failures are positioned `SyntaxError`s carrying the line,
//! column and byte index where the problem was detected. The message
//! catalog mirrors the wording the Lua reference implementation uses, so
//! consumers that pattern-match on error text keep working.

use lunar_core::{UnsupportedEncoding, UnsupportedVersion};
use thiserror::Error;

/// A positioned syntax error. The first error aborts the parse; there is
/// no recovery and no partial tree.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct SyntaxError {
    /// The formatted catalog message.
    pub message: String,
    /// 1-based line of the offending position.
    pub line: usize,
    /// Column within the line.
    pub column: usize,
    /// Byte offset in the input.
    pub index: usize,
}

impl SyntaxError {
    pub fn new(message: String, line: usize, column: usize, index: usize) -> Self {
        Self { message, line, column, index }
    }
}

/// Any failure the public API can return: a positioned syntax error, or a
/// configuration problem detected before lexing starts.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Version(#[from] UnsupportedVersion),
    #[error(transparent)]
    Encoding(#[from] UnsupportedEncoding),
}

/// Format a catalog template by substituting `%1`, `%2`, ... with the
/// given arguments, in order.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("%{}", i + 1), arg);
    }
    result
}

// ============================================================================
// Message catalog
// ============================================================================
//
// As this parser is a bit different from Lua's own, the messages differ in
// some situations. Templates and substitution order are load-bearing.

pub mod messages {
    pub const UNEXPECTED: &str = "unexpected %1 '%2' near '%3'";
    pub const UNEXPECTED_EOF: &str = "unexpected symbol near '<eof>'";
    pub const EXPECTED: &str = "'%1' expected near '%2'";
    pub const EXPECTED_TOKEN: &str = "%1 expected near '%2'";
    pub const UNFINISHED_STRING: &str = "unfinished string near '%1'";
    pub const MALFORMED_NUMBER: &str = "malformed number near '%1'";
    pub const DECIMAL_ESCAPE_TOO_LARGE: &str = "decimal escape too large near '%1'";
    pub const INVALID_ESCAPE: &str = "invalid escape sequence near '%1'";
    pub const HEXADECIMAL_DIGIT_EXPECTED: &str = "hexadecimal digit expected near '%1'";
    pub const BRACE_EXPECTED: &str = "missing '%1' near '%2'";
    pub const TOO_LARGE_CODEPOINT: &str = "UTF-8 value too large near '%1'";
    pub const UNFINISHED_LONG_STRING: &str =
        "unfinished long string (starting at line %1) near '%2'";
    pub const UNFINISHED_LONG_COMMENT: &str =
        "unfinished long comment (starting at line %1) near '%2'";
    pub const AMBIGUOUS_SYNTAX: &str =
        "ambiguous syntax (function call x new statement) near '%1'";
    pub const NO_LOOP_TO_BREAK: &str = "no loop to break near '%1'";
    pub const LABEL_ALREADY_DEFINED: &str = "label '%1' already defined on line %2";
    pub const LABEL_NOT_VISIBLE: &str = "no visible label '%1' for <goto>";
    pub const GOTO_JUMP_IN_LOCAL_SCOPE: &str = "<goto %1> jumps into the scope of local '%2'";
    pub const CANNOT_USE_VARARG: &str = "cannot use '...' outside a vararg function near '%1'";
    pub const INVALID_CODE_UNIT: &str =
        "code unit U+%1 is not allowed in the current encoding mode";
}
