//! Lua dialect selection.
//!
//! Each supported Lua version enables a set of lexical and grammatical
//! features. The feature table is the single source of truth consulted by
//! both the lexer (escapes, operators, keywords) and the parser (labels,
//! empty statements, relaxed `break` placement).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The Lua dialect targeted by a parse.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum LuaVersion {
    #[default]
    Lua51,
    Lua52,
    Lua53,
    LuaJit,
}

/// Raised when a version string names a dialect this parser does not know.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("Lua version '{0}' not supported")]
pub struct UnsupportedVersion(pub String);

impl fmt::Display for LuaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaVersion::Lua51 => write!(f, "5.1"),
            LuaVersion::Lua52 => write!(f, "5.2"),
            LuaVersion::Lua53 => write!(f, "5.3"),
            LuaVersion::LuaJit => write!(f, "LuaJIT"),
        }
    }
}

impl FromStr for LuaVersion {
    type Err = UnsupportedVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5.1" => Ok(LuaVersion::Lua51),
            "5.2" => Ok(LuaVersion::Lua52),
            "5.3" => Ok(LuaVersion::Lua53),
            "LuaJIT" => Ok(LuaVersion::LuaJit),
            other => Err(UnsupportedVersion(other.to_string())),
        }
    }
}

/// The lexical/grammatical toggles enabled by a dialect.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Features {
    /// `::name::` labels and the `goto` statement.
    pub labels: bool,
    /// Bare `;` as an (ignored) empty statement.
    pub empty_statement: bool,
    /// `\xXX` escapes in string literals.
    pub hex_escapes: bool,
    /// `\z` skips following whitespace in string literals.
    pub skip_whitespace_escape: bool,
    /// Unknown escape sequences are an error instead of passing through.
    pub strict_escapes: bool,
    /// `\u{XXX}` escapes in string literals.
    pub unicode_escapes: bool,
    /// `break` does not have to be the last statement of a block.
    pub relaxed_break: bool,
    /// `&`, `|`, `~`, `<<`, `>>` as operators.
    pub bitwise_operators: bool,
    /// `//` floor division.
    pub integer_division: bool,
    /// `goto` is a contextual name rather than a reserved keyword.
    pub contextual_goto: bool,
    /// Allow code points >= 128 in identifiers.
    pub extended_identifiers: bool,
}

impl Features {
    /// The feature set for a Lua version.
    pub fn for_version(version: LuaVersion) -> Features {
        match version {
            LuaVersion::Lua51 => Features::default(),
            LuaVersion::Lua52 => Features {
                labels: true,
                empty_statement: true,
                hex_escapes: true,
                skip_whitespace_escape: true,
                strict_escapes: true,
                relaxed_break: true,
                ..Features::default()
            },
            LuaVersion::Lua53 => Features {
                labels: true,
                empty_statement: true,
                hex_escapes: true,
                skip_whitespace_escape: true,
                strict_escapes: true,
                unicode_escapes: true,
                bitwise_operators: true,
                integer_division: true,
                relaxed_break: true,
                ..Features::default()
            },
            // LuaJIT language features may depend on compilation options;
            // LUAJIT_ENABLE_LUA52COMPAT in particular removes contextual goto.
            LuaVersion::LuaJit => Features {
                labels: true,
                contextual_goto: true,
                hex_escapes: true,
                skip_whitespace_escape: true,
                strict_escapes: true,
                unicode_escapes: true,
                ..Features::default()
            },
        }
    }
}
