//! String-literal encoding strategies.
//!
//! Lua strings are byte strings; the host tree stores text. The encoding
//! mode decides how escape-produced bytes and raw fragments become stored
//! text:
//!
//! - `none` keeps no interpreted content at all (only raw slices survive);
//! - `pseudo-latin1` identity-maps code units 0x00-0xFF (true ISO/IEC
//!   8859-1, not cp1252);
//! - `x-user-defined` round-trips bytes >= 0x80 through the
//!   U+F780-U+F7FF private-use range, per the WHATWG encoding of the
//!   same name.

use lunar_core::Encoding;

/// Whether interpreted string content is thrown away under this mode.
#[inline]
pub(crate) fn discards_strings(mode: Encoding) -> bool {
    matches!(mode, Encoding::None)
}

/// Validate a raw source fragment against the mode. Returns the fragment
/// unchanged, or the first code unit the mode cannot represent.
pub(crate) fn fixup(mode: Encoding, s: &str) -> Result<String, u32> {
    match mode {
        Encoding::None => Ok(s.to_string()),
        Encoding::PseudoLatin1 => {
            for ch in s.chars() {
                if ch as u32 > 0xFF {
                    return Err(ch as u32);
                }
            }
            Ok(s.to_string())
        }
        Encoding::XUserDefined => {
            for ch in s.chars() {
                let cu = ch as u32;
                if cu >= 0x80 && !(0xF780..=0xF7FF).contains(&cu) {
                    return Err(cu);
                }
            }
            Ok(s.to_string())
        }
    }
}

/// Materialize a single byte produced by a `\ddd` or `\xXX` escape.
pub(crate) fn encode_byte(mode: Encoding, value: u8) -> String {
    match mode {
        Encoding::None => String::new(),
        Encoding::PseudoLatin1 => char::from(value).to_string(),
        Encoding::XUserDefined => {
            if value >= 0x80 {
                // Bytes above the ASCII range live at U+F700 | byte.
                char::from_u32(0xF700 | value as u32).unwrap_or('\u{FFFD}').to_string()
            } else {
                char::from(value).to_string()
            }
        }
    }
}

/// Materialize a `\u{...}` escape as its UTF-8 byte sequence, with each
/// byte stored per the active mode.
pub(crate) fn encode_utf8(mode: Encoding, codepoint: u32) -> String {
    match mode {
        Encoding::None => String::new(),
        Encoding::PseudoLatin1 => utf8_units(codepoint, 0),
        Encoding::XUserDefined => utf8_units(codepoint, 0xF700),
    }
}

/// Emit the UTF-8 encoding of `codepoint` one byte per stored code unit,
/// with `high_mask` ORed onto every non-ASCII unit.
fn utf8_units(codepoint: u32, high_mask: u32) -> String {
    let unit = |value: u32| char::from_u32(high_mask | value).unwrap_or('\u{FFFD}');
    let mut out = String::new();
    if codepoint < 0x80 {
        out.push(char::from_u32(codepoint).unwrap_or('\u{FFFD}'));
    } else if codepoint < 0x800 {
        out.push(unit(0xC0 | (codepoint >> 6)));
        out.push(unit(0x80 | (codepoint & 0x3F)));
    } else if codepoint < 0x10000 {
        out.push(unit(0xE0 | (codepoint >> 12)));
        out.push(unit(0x80 | ((codepoint >> 6) & 0x3F)));
        out.push(unit(0x80 | (codepoint & 0x3F)));
    } else {
        out.push(unit(0xF0 | (codepoint >> 18)));
        out.push(unit(0x80 | ((codepoint >> 12) & 0x3F)));
        out.push(unit(0x80 | ((codepoint >> 6) & 0x3F)));
        out.push(unit(0x80 | (codepoint & 0x3F)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_discards() {
        assert!(discards_strings(Encoding::None));
        assert_eq!(encode_byte(Encoding::None, 0xFF), "");
        assert_eq!(encode_utf8(Encoding::None, 0x1F600), "");
    }

    #[test]
    fn test_pseudo_latin1_identity() {
        assert_eq!(encode_byte(Encoding::PseudoLatin1, 0x41), "A");
        assert_eq!(encode_byte(Encoding::PseudoLatin1, 0xFF), "\u{FF}");
        assert_eq!(fixup(Encoding::PseudoLatin1, "caf\u{E9}"), Ok("caf\u{E9}".to_string()));
        assert_eq!(fixup(Encoding::PseudoLatin1, "\u{100}"), Err(0x100));
    }

    #[test]
    fn test_x_user_defined_high_bytes() {
        assert_eq!(encode_byte(Encoding::XUserDefined, 0x41), "A");
        assert_eq!(encode_byte(Encoding::XUserDefined, 0x80), "\u{F780}");
        assert_eq!(encode_byte(Encoding::XUserDefined, 0xFF), "\u{F7FF}");
        assert_eq!(fixup(Encoding::XUserDefined, "abc\u{F7A0}"), Ok("abc\u{F7A0}".to_string()));
        assert_eq!(fixup(Encoding::XUserDefined, "\u{E9}"), Err(0xE9));
    }

    #[test]
    fn test_utf8_units_two_byte() {
        // U+00E9 is 0xC3 0xA9 in UTF-8.
        assert_eq!(encode_utf8(Encoding::PseudoLatin1, 0xE9), "\u{C3}\u{A9}");
        assert_eq!(encode_utf8(Encoding::XUserDefined, 0xE9), "\u{F7C3}\u{F7A9}");
    }

    #[test]
    fn test_utf8_units_ascii_unmasked() {
        assert_eq!(encode_utf8(Encoding::XUserDefined, 0x41), "A");
    }
}
