//! Parser configuration.

use crate::version::LuaVersion;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How code units above U+007F in string literals are interpreted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Encoding {
    /// Disregard interpretation of string literals; only raw slices are kept.
    #[default]
    None,
    /// The input was decoded as true ISO/IEC 8859-1: code units 0x00-0xFF
    /// identity-mapped to the Basic Latin and Latin-1 Supplement blocks.
    /// This is NOT cp1252.
    PseudoLatin1,
    /// The input was decoded with the WHATWG `x-user-defined` encoding:
    /// bytes >= 0x80 mapped into U+F780-U+F7FF.
    XUserDefined,
}

/// Raised when an encoding-mode string names a mode this parser does not know.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("Encoding mode '{0}' not supported")]
pub struct UnsupportedEncoding(pub String);

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::None => write!(f, "none"),
            Encoding::PseudoLatin1 => write!(f, "pseudo-latin1"),
            Encoding::XUserDefined => write!(f, "x-user-defined"),
        }
    }
}

impl FromStr for Encoding {
    type Err = UnsupportedEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Encoding::None),
            "pseudo-latin1" => Ok(Encoding::PseudoLatin1),
            "x-user-defined" => Ok(Encoding::XUserDefined),
            other => Err(UnsupportedEncoding(other.to_string())),
        }
    }
}

/// Options controlling a parse session.
#[derive(Debug, Clone)]
pub struct Options {
    /// Collect comment nodes onto `Chunk::comments`.
    pub comments: bool,
    /// Annotate identifiers with `is_local` and populate `Chunk::globals`.
    pub scope: bool,
    /// Attach `loc: { start, end }` line/column data to nodes.
    pub locations: bool,
    /// Attach `range: [start, end)` byte offsets to nodes.
    pub ranges: bool,
    /// The Lua dialect to parse.
    pub lua_version: LuaVersion,
    /// How string-literal content is materialized.
    pub encoding_mode: Encoding,
    /// Override the dialect default for code points >= 128 in identifiers.
    pub extended_identifiers: Option<bool>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            comments: true,
            scope: false,
            locations: false,
            ranges: false,
            lua_version: LuaVersion::Lua51,
            encoding_mode: Encoding::None,
            extended_identifiers: None,
        }
    }
}

impl Options {
    /// Whether any per-node location data is requested.
    pub fn track_locations(&self) -> bool {
        self.locations || self.ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.comments);
        assert!(!options.scope);
        assert_eq!(options.lua_version, LuaVersion::Lua51);
        assert_eq!(options.encoding_mode, Encoding::None);
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("x-user-defined".parse::<Encoding>().unwrap(), Encoding::XUserDefined);
        let err = "utf-16".parse::<Encoding>().unwrap_err();
        assert_eq!(err.to_string(), "Encoding mode 'utf-16' not supported");
    }
}
