//! The Lua lexer.
//!
//! Reads the input byte by byte and derives one token per `lex()` call,
//! skipping whitespace and comments first. Character classes are tested on
//! bytes rather than chars; everything the grammar dispatches on is ASCII,
//! and bytes >= 128 only ever appear inside strings, comments, and
//! (when the dialect allows) identifiers.
//!
//! If comment collection is enabled, comment nodes are accumulated on the
//! lexer and later appended to the chunk.

use crate::encoding;
use crate::token::{Token, TokenValue};
use lunar_ast::builder;
use lunar_ast::{Comment, TokenKind};
use lunar_core::{Encoding, Features, Location, Options, Position, TextRange};
use lunar_diagnostics::{format_message, messages, SyntaxError};

pub struct Lexer {
    input: String,
    length: usize,
    /// Byte offset of the next unread character.
    index: usize,
    /// Byte offset where the current token began.
    token_start: usize,
    /// 1-based current line.
    line: usize,
    /// Byte offset of the start of the current line.
    line_start: usize,
    features: Features,
    encoding: Encoding,
    collect_comments: bool,
    locations: bool,
    ranges: bool,
    /// Comment nodes collected so far, in source order.
    pub comments: Vec<Comment>,
    /// Range of the most recently produced token, for "near" context in
    /// unexpected-symbol errors.
    prev_range: Option<TextRange>,
}

impl Lexer {
    pub fn new(mut input: String, options: &Options, features: Features) -> Self {
        // A leading shebang line is blanked rather than removed so byte
        // offsets stay aligned with the caller's view of the input.
        if input.starts_with("#!") {
            let line_len = input.bytes().position(|b| b == b'\n' || b == b'\r');
            let line_len = line_len.unwrap_or(input.len());
            input.replace_range(..line_len, &" ".repeat(line_len));
        }
        let length = input.len();
        Self {
            input,
            length,
            index: 0,
            token_start: 0,
            line: 1,
            line_start: 0,
            features,
            encoding: options.encoding_mode,
            collect_comments: options.comments,
            locations: options.locations,
            ranges: options.ranges,
            comments: Vec::new(),
            prev_range: None,
        }
    }

    /// A slice of the raw input, clamped to its bounds and widened to
    /// char boundaries so error fragments never split a UTF-8 sequence.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let mut start = start.min(self.length);
        let mut end = end.min(self.length).max(start);
        while start > 0 && !self.input.is_char_boundary(start) {
            start -= 1;
        }
        while end < self.length && !self.input.is_char_boundary(end) {
            end += 1;
        }
        &self.input[start..end]
    }

    /// The display text of a token: its raw source slice, or its value
    /// when the slice is empty (end of file).
    pub fn token_text(&self, token: &Token) -> String {
        if token.range.is_empty() {
            token.value.text()
        } else {
            self.slice(token.range.start, token.range.end).to_string()
        }
    }

    /// A syntax error at the lexer's current position.
    pub fn error_here(&self, message: String) -> SyntaxError {
        SyntaxError::new(message, self.line, self.index - self.line_start + 1, self.index)
    }

    #[inline]
    fn byte(&self, i: usize) -> Option<u8> {
        self.input.as_bytes().get(i).copied()
    }

    #[inline]
    fn char_at(&self, i: usize) -> Option<char> {
        self.input.get(i..).and_then(|s| s.chars().next())
    }

    // ========================================================================
    // Whitespace and lines
    // ========================================================================

    /// Consume one end-of-line sequence, counting `\r\n` and `\n\r` as a
    /// single newline. Returns false when not at a line terminator.
    fn consume_eol(&mut self) -> bool {
        let char_code = self.byte(self.index);
        if !char_code.map_or(false, is_line_terminator) {
            return false;
        }
        let peek = self.byte(self.index + 1);
        if char_code == Some(b'\n') && peek == Some(b'\r') {
            self.index += 1;
        }
        if char_code == Some(b'\r') && peek == Some(b'\n') {
            self.index += 1;
        }
        self.line += 1;
        self.index += 1;
        self.line_start = self.index;
        true
    }

    fn skip_white_space(&mut self) {
        while self.index < self.length {
            let char_code = self.input.as_bytes()[self.index];
            if is_white_space(char_code) {
                self.index += 1;
            } else if !self.consume_eol() {
                break;
            }
        }
    }

    // ========================================================================
    // Main dispatch
    // ========================================================================

    /// Derive the next token, skipping whitespace and comments first.
    pub fn lex(&mut self) -> Result<Token, SyntaxError> {
        self.skip_white_space();

        while self.byte(self.index) == Some(b'-') && self.byte(self.index + 1) == Some(b'-') {
            self.scan_comment()?;
            self.skip_white_space();
        }

        if self.index >= self.length {
            let token = Token {
                kind: TokenKind::Eof,
                value: TokenValue::Str("<eof>".to_string()),
                range: TextRange::empty(self.index),
                line: self.line,
                line_start: self.line_start,
                last_line: None,
                last_line_start: None,
            };
            self.prev_range = Some(token.range);
            return Ok(token);
        }

        let char_code = self.input.as_bytes()[self.index];
        let next = self.byte(self.index + 1);
        self.token_start = self.index;

        let token = if self.is_identifier_start(char_code) {
            self.scan_identifier_or_keyword()
        } else {
            match char_code {
                b'\'' | b'"' => self.scan_string_literal()?,

                b'0'..=b'9' => self.scan_numeric_literal()?,

                b'.' => {
                    // A dot followed by a digit starts a float.
                    if next.map_or(false, is_dec_digit) {
                        self.scan_numeric_literal()?
                    } else if next == Some(b'.') {
                        if self.byte(self.index + 2) == Some(b'.') {
                            self.scan_vararg_literal()
                        } else {
                            self.scan_punctuator("..")
                        }
                    } else {
                        self.scan_punctuator(".")
                    }
                }

                b'=' => {
                    if next == Some(b'=') {
                        self.scan_punctuator("==")
                    } else {
                        self.scan_punctuator("=")
                    }
                }

                b'>' => {
                    if self.features.bitwise_operators && next == Some(b'>') {
                        self.scan_punctuator(">>")
                    } else if next == Some(b'=') {
                        self.scan_punctuator(">=")
                    } else {
                        self.scan_punctuator(">")
                    }
                }

                b'<' => {
                    if self.features.bitwise_operators && next == Some(b'<') {
                        self.scan_punctuator("<<")
                    } else if next == Some(b'=') {
                        self.scan_punctuator("<=")
                    } else {
                        self.scan_punctuator("<")
                    }
                }

                b'~' => {
                    if next == Some(b'=') {
                        self.scan_punctuator("~=")
                    } else if self.features.bitwise_operators {
                        self.scan_punctuator("~")
                    } else {
                        return Err(self.unexpected_symbol());
                    }
                }

                b':' => {
                    if self.features.labels && next == Some(b':') {
                        self.scan_punctuator("::")
                    } else {
                        self.scan_punctuator(":")
                    }
                }

                b'[' => {
                    // [[ and [= open a long string.
                    if next == Some(b'[') || next == Some(b'=') {
                        self.scan_long_string_literal()?
                    } else {
                        self.scan_punctuator("[")
                    }
                }

                b'/' => {
                    if self.features.integer_division && next == Some(b'/') {
                        self.scan_punctuator("//")
                    } else {
                        self.scan_punctuator("/")
                    }
                }

                b'&' | b'|' => {
                    if self.features.bitwise_operators {
                        let text = if char_code == b'&' { "&" } else { "|" };
                        self.scan_punctuator(text)
                    } else {
                        return Err(self.unexpected_symbol());
                    }
                }

                b'*' => self.scan_punctuator("*"),
                b'^' => self.scan_punctuator("^"),
                b'%' => self.scan_punctuator("%"),
                b',' => self.scan_punctuator(","),
                b'{' => self.scan_punctuator("{"),
                b'}' => self.scan_punctuator("}"),
                b']' => self.scan_punctuator("]"),
                b'(' => self.scan_punctuator("("),
                b')' => self.scan_punctuator(")"),
                b';' => self.scan_punctuator(";"),
                b'#' => self.scan_punctuator("#"),
                b'-' => self.scan_punctuator("-"),
                b'+' => self.scan_punctuator("+"),

                _ => return Err(self.unexpected_symbol()),
            }
        };

        self.prev_range = Some(token.range);
        Ok(token)
    }

    fn unexpected_symbol(&self) -> SyntaxError {
        let found = self.char_at(self.index).map(String::from).unwrap_or_default();
        let near = self.near_text();
        self.error_here(format_message(messages::UNEXPECTED, &["symbol", &found, &near]))
    }

    /// Text of the most recently produced token, for "near" context.
    fn near_text(&self) -> String {
        match self.prev_range {
            Some(range) if !range.is_empty() => self.slice(range.start, range.end).to_string(),
            Some(_) => "<eof>".to_string(),
            None => self.char_at(self.index).map(String::from).unwrap_or_default(),
        }
    }

    fn make_token(&self, kind: TokenKind, value: TokenValue) -> Token {
        Token {
            kind,
            value,
            range: TextRange::new(self.token_start, self.index),
            line: self.line,
            line_start: self.line_start,
            last_line: None,
            last_line_start: None,
        }
    }

    // ========================================================================
    // Identifiers and keywords
    // ========================================================================

    fn is_identifier_start(&self, char_code: u8) -> bool {
        char_code.is_ascii_alphabetic()
            || char_code == b'_'
            || (self.features.extended_identifiers && char_code >= 128)
    }

    fn is_identifier_part(&self, char_code: u8) -> bool {
        char_code.is_ascii_alphanumeric()
            || char_code == b'_'
            || (self.features.extended_identifiers && char_code >= 128)
    }

    /// Identifiers, keywords, booleans and nil all look the same until the
    /// full run is read.
    fn scan_identifier_or_keyword(&mut self) -> Token {
        self.index += 1;
        while self.byte(self.index).map_or(false, |b| self.is_identifier_part(b)) {
            self.index += 1;
        }
        let text = &self.input[self.token_start..self.index];

        let (kind, value) = if self.is_keyword(text) {
            (TokenKind::Keyword, TokenValue::Str(text.to_string()))
        } else if text == "true" || text == "false" {
            (TokenKind::BooleanLiteral, TokenValue::Bool(text == "true"))
        } else if text == "nil" {
            (TokenKind::NilLiteral, TokenValue::None)
        } else {
            (TokenKind::Identifier, TokenValue::Str(text.to_string()))
        };
        self.make_token(kind, value)
    }

    /// `true`, `false` and `nil` are literals, not keywords. `goto` is a
    /// keyword only for dialects with non-contextual labels.
    fn is_keyword(&self, id: &str) -> bool {
        match id {
            "do" | "if" | "in" | "or" | "and" | "end" | "for" | "not" | "else" | "then"
            | "break" | "local" | "until" | "while" | "elseif" | "repeat" | "return"
            | "function" => true,
            "goto" => self.features.labels && !self.features.contextual_goto,
            _ => false,
        }
    }

    // ========================================================================
    // Punctuators and vararg
    // ========================================================================

    fn scan_punctuator(&mut self, value: &str) -> Token {
        self.index += value.len();
        self.make_token(TokenKind::Punctuator, TokenValue::Str(value.to_string()))
    }

    fn scan_vararg_literal(&mut self) -> Token {
        self.index += 3;
        self.make_token(TokenKind::VarargLiteral, TokenValue::Str("...".to_string()))
    }

    // ========================================================================
    // String literals
    // ========================================================================

    /// Scan a short string, processing escapes as they appear. The token
    /// value is assembled from raw fragments and decoded escapes; under a
    /// discarding encoding mode only the raw range survives.
    fn scan_string_literal(&mut self) -> Result<Token, SyntaxError> {
        let delimiter = self.input.as_bytes()[self.index];
        self.index += 1;
        let begin_line = self.line;
        let begin_line_start = self.line_start;
        let mut string_start = self.index;
        let mut string = String::new();
        let discard = encoding::discards_strings(self.encoding);

        loop {
            let char_code = self.byte(self.index);
            self.index += 1;
            match char_code {
                Some(c) if c == delimiter => break,
                // EOF or a bare newline terminates the literal.
                None | Some(b'\n') | Some(b'\r') => {
                    let fragment = self.slice(string_start, self.index - 1).to_string();
                    if char_code.is_none() {
                        self.index = self.length;
                    }
                    return Err(self.error_here(format_message(
                        messages::UNFINISHED_STRING,
                        &[&fragment],
                    )));
                }
                Some(b'\\') => {
                    if !discard {
                        let fragment = self.fixup_slice(string_start, self.index - 1)?;
                        string.push_str(&fragment);
                    }
                    let escaped = self.read_escape_sequence()?;
                    if !discard {
                        string.push_str(&escaped);
                    }
                    string_start = self.index;
                }
                Some(_) => {}
            }
        }

        let value = if discard {
            TokenValue::None
        } else {
            let fragment = self.fixup_slice(string_start, self.index - 1)?;
            string.push_str(&fragment);
            TokenValue::Str(string)
        };

        Ok(Token {
            kind: TokenKind::StringLiteral,
            value,
            range: TextRange::new(self.token_start, self.index),
            line: begin_line,
            line_start: begin_line_start,
            last_line: Some(self.line),
            last_line_start: Some(self.line_start),
        })
    }

    /// Validate a raw fragment with the active encoding mode.
    fn fixup_fragment(&self, fragment: &str) -> Result<String, SyntaxError> {
        encoding::fixup(self.encoding, fragment).map_err(|code_unit| {
            self.error_here(format_message(
                messages::INVALID_CODE_UNIT,
                &[&format!("{:04x}", code_unit)],
            ))
        })
    }

    fn fixup_slice(&self, start: usize, end: usize) -> Result<String, SyntaxError> {
        self.fixup_fragment(self.slice(start, end))
    }

    /// Expect a long string and return it as a regular string token.
    fn scan_long_string_literal(&mut self) -> Result<Token, SyntaxError> {
        let begin_line = self.line;
        let begin_line_start = self.line_start;
        let content = match self.read_long_string(false)? {
            Some(content) => content,
            // Looked like a long bracket but wasn't one.
            None => {
                let near = self.near_text();
                return Err(
                    self.error_here(format_message(messages::EXPECTED, &["[", &near]))
                );
            }
        };

        let value = if encoding::discards_strings(self.encoding) {
            TokenValue::None
        } else {
            TokenValue::Str(self.fixup_fragment(&content)?)
        };

        Ok(Token {
            kind: TokenKind::StringLiteral,
            value,
            range: TextRange::new(self.token_start, self.index),
            line: begin_line,
            line_start: begin_line_start,
            last_line: Some(self.line),
            last_line_start: Some(self.line_start),
        })
    }

    /// Read a bracketed string by counting the `=` depth, appending until a
    /// closing bracket of equal depth. Returns `None` when the opening
    /// bracket never completes (`[=x`), which the caller treats as a plain
    /// punctuator context or an error.
    fn read_long_string(&mut self, is_comment: bool) -> Result<Option<String>, SyntaxError> {
        let first_line = self.line;
        let mut level = 0;

        self.index += 1; // [

        while self.byte(self.index + level) == Some(b'=') {
            level += 1;
        }
        if self.byte(self.index + level) != Some(b'[') {
            return Ok(None);
        }

        self.index += level + 1;

        // A newline immediately after the opening bracket is not part of
        // the content.
        if self.byte(self.index).map_or(false, is_line_terminator) {
            self.consume_eol();
        }

        let string_start = self.index;
        while self.index < self.length {
            while self.byte(self.index).map_or(false, is_line_terminator) {
                self.consume_eol();
            }
            if self.index >= self.length {
                break;
            }

            let character = self.input.as_bytes()[self.index];
            self.index += 1;

            if character == b']' {
                let mut terminator = true;
                for i in 0..level {
                    if self.byte(self.index + i) != Some(b'=') {
                        terminator = false;
                    }
                }
                if self.byte(self.index + level) != Some(b']') {
                    terminator = false;
                }
                if terminator {
                    let content = self.slice(string_start, self.index - 1).to_string();
                    self.index += level + 1;
                    return Ok(Some(content));
                }
            }
        }

        let template = if is_comment {
            messages::UNFINISHED_LONG_COMMENT
        } else {
            messages::UNFINISHED_LONG_STRING
        };
        Err(self.error_here(format_message(template, &[&first_line.to_string(), "<eof>"])))
    }

    // ========================================================================
    // Escape sequences
    // ========================================================================

    /// Translate the escape sequence after a backslash into stored text.
    /// The backslash itself has been consumed.
    fn read_escape_sequence(&mut self) -> Result<String, SyntaxError> {
        let sequence_start = self.index;
        match self.byte(self.index) {
            Some(b'a') => {
                self.index += 1;
                return Ok("\x07".to_string());
            }
            Some(b'n') => {
                self.index += 1;
                return Ok("\n".to_string());
            }
            Some(b'r') => {
                self.index += 1;
                return Ok("\r".to_string());
            }
            Some(b't') => {
                self.index += 1;
                return Ok("\t".to_string());
            }
            Some(b'v') => {
                self.index += 1;
                return Ok("\x0B".to_string());
            }
            Some(b'b') => {
                self.index += 1;
                return Ok("\x08".to_string());
            }
            Some(b'f') => {
                self.index += 1;
                return Ok("\x0C".to_string());
            }

            // A backslash at the end of the line stands for a single
            // newline, whatever the actual line ending was.
            Some(b'\r') | Some(b'\n') => {
                self.consume_eol();
                return Ok("\n".to_string());
            }

            // \ddd: up to three decimal digits naming a byte.
            Some(b'0'..=b'9') => {
                while self.byte(self.index).map_or(false, is_dec_digit)
                    && self.index - sequence_start < 3
                {
                    self.index += 1;
                }
                let fragment = self.slice(sequence_start, self.index);
                let ddd: u32 = fragment.parse().unwrap_or(0);
                if ddd > 255 {
                    return Err(self.error_here(format_message(
                        messages::DECIMAL_ESCAPE_TOO_LARGE,
                        &[&format!("\\{}", ddd)],
                    )));
                }
                return Ok(encoding::encode_byte(self.encoding, ddd as u8));
            }

            Some(b'z') => {
                if self.features.skip_whitespace_escape {
                    self.index += 1;
                    self.skip_white_space();
                    return Ok(String::new());
                }
            }

            // \xXX: exactly two hex digits.
            Some(b'x') => {
                if self.features.hex_escapes {
                    let hi = self.byte(self.index + 1);
                    let lo = self.byte(self.index + 2);
                    if hi.map_or(false, is_hex_digit) && lo.map_or(false, is_hex_digit) {
                        self.index += 3;
                        let hex = self.slice(sequence_start + 1, self.index);
                        let value = u8::from_str_radix(hex, 16).unwrap_or(0);
                        return Ok(encoding::encode_byte(self.encoding, value));
                    }
                    let fragment = format!("\\{}", self.slice(sequence_start, self.index + 2));
                    return Err(self.error_here(format_message(
                        messages::HEXADECIMAL_DIGIT_EXPECTED,
                        &[&fragment],
                    )));
                }
            }

            Some(b'u') => {
                if self.features.unicode_escapes {
                    return self.read_unicode_escape_sequence();
                }
            }

            Some(b'\\') | Some(b'"') | Some(b'\'') => {
                let ch = self.input.as_bytes()[self.index] as char;
                self.index += 1;
                return Ok(ch.to_string());
            }

            _ => {}
        }

        // Unknown escape, or one the dialect does not enable.
        if self.features.strict_escapes {
            let next = self.char_at(self.index);
            let end = self.index + next.map_or(0, char::len_utf8);
            let fragment = format!("\\{}", self.slice(sequence_start, end));
            return Err(
                self.error_here(format_message(messages::INVALID_ESCAPE, &[&fragment]))
            );
        }
        match self.char_at(self.index) {
            Some(ch) => {
                self.index += ch.len_utf8();
                Ok(ch.to_string())
            }
            None => Ok(String::new()),
        }
    }

    /// `\u{XXX}`: braces required, codepoint at most 0x10FFFF.
    fn read_unicode_escape_sequence(&mut self) -> Result<String, SyntaxError> {
        let sequence_start = self.index;
        self.index += 1; // u

        let brace = self.byte(self.index);
        self.index += 1;
        if brace != Some(b'{') {
            let fragment = format!("\\{}", self.slice(sequence_start, self.index));
            return Err(
                self.error_here(format_message(messages::BRACE_EXPECTED, &["{", &fragment]))
            );
        }
        if !self.byte(self.index).map_or(false, is_hex_digit) {
            let fragment = format!("\\{}", self.slice(sequence_start, self.index));
            return Err(self.error_here(format_message(
                messages::HEXADECIMAL_DIGIT_EXPECTED,
                &[&fragment],
            )));
        }

        while self.byte(self.index) == Some(b'0') {
            self.index += 1;
        }
        let escape_start = self.index;

        while self.byte(self.index).map_or(false, is_hex_digit) {
            self.index += 1;
            if self.index - escape_start > 6 {
                let fragment = format!("\\{}", self.slice(sequence_start, self.index));
                return Err(self.error_here(format_message(
                    messages::TOO_LARGE_CODEPOINT,
                    &[&fragment],
                )));
            }
        }

        let closing = self.byte(self.index);
        self.index += 1;
        if closing != Some(b'}') {
            let fragment = format!("\\{}", self.slice(sequence_start, self.index));
            if closing == Some(b'"') || closing == Some(b'\'') {
                return Err(
                    self.error_here(format_message(messages::BRACE_EXPECTED, &["}", &fragment]))
                );
            }
            return Err(self.error_here(format_message(
                messages::HEXADECIMAL_DIGIT_EXPECTED,
                &[&fragment],
            )));
        }

        let digits = self.slice(escape_start, self.index - 1);
        let codepoint = if digits.is_empty() {
            0
        } else {
            u32::from_str_radix(digits, 16).unwrap_or(u32::MAX)
        };
        if codepoint > 0x10FFFF {
            let fragment = format!("\\{}", self.slice(sequence_start, self.index));
            return Err(
                self.error_here(format_message(messages::TOO_LARGE_CODEPOINT, &[&fragment]))
            );
        }

        Ok(encoding::encode_utf8(self.encoding, codepoint))
    }

    // ========================================================================
    // Numeric literals
    // ========================================================================

    /// Numbers are produced as floats; the raw text is recovered from the
    /// token range later when building literal nodes.
    fn scan_numeric_literal(&mut self) -> Result<Token, SyntaxError> {
        let first = self.input.as_bytes()[self.index];
        let next = self.byte(self.index + 1);

        let value = if first == b'0' && matches!(next, Some(b'x') | Some(b'X')) {
            self.read_hex_literal()?
        } else {
            self.read_dec_literal()?
        };

        Ok(self.make_token(TokenKind::NumericLiteral, TokenValue::Number(value)))
    }

    fn malformed_number(&self) -> SyntaxError {
        self.error_here(format_message(
            messages::MALFORMED_NUMBER,
            &[self.slice(self.token_start, self.index)],
        ))
    }

    /// Lua hex literals take an optional fraction and an optional binary
    /// exponent, computed as `(digits + fraction / 16^n) * 2^(±exp)`.
    /// At least one hex digit must appear in the integer or fraction part.
    fn read_hex_literal(&mut self) -> Result<f64, SyntaxError> {
        self.index += 2; // 0x

        let digit_start = self.index;
        while self.byte(self.index).map_or(false, is_hex_digit) {
            self.index += 1;
        }
        let digit = hex_digits_to_f64(self.slice(digit_start, self.index));
        let int_digits = self.index - digit_start;

        let mut fraction = 0.0;
        let mut fraction_digits = 0;
        if self.byte(self.index) == Some(b'.') {
            self.index += 1;
            let fraction_start = self.index;
            while self.byte(self.index).map_or(false, is_hex_digit) {
                self.index += 1;
            }
            fraction_digits = self.index - fraction_start;
            if fraction_digits > 0 {
                fraction = hex_digits_to_f64(self.slice(fraction_start, self.index))
                    / 16f64.powi(fraction_digits as i32);
            }
        }

        if int_digits == 0 && fraction_digits == 0 {
            return Err(self.malformed_number());
        }

        let mut binary_exponent = 1.0;
        if matches!(self.byte(self.index), Some(b'p') | Some(b'P')) {
            self.index += 1;

            let mut binary_sign = 1.0;
            if matches!(self.byte(self.index), Some(b'+') | Some(b'-')) {
                if self.byte(self.index) == Some(b'-') {
                    binary_sign = -1.0;
                }
                self.index += 1;
            }

            // The exponent requires at least one decimal digit.
            if !self.byte(self.index).map_or(false, is_dec_digit) {
                return Err(self.malformed_number());
            }
            let exponent_start = self.index;
            while self.byte(self.index).map_or(false, is_dec_digit) {
                self.index += 1;
            }
            let exponent: f64 = self.slice(exponent_start, self.index).parse().unwrap_or(0.0);
            binary_exponent = 2f64.powf(exponent * binary_sign);
        }

        Ok((digit + fraction) * binary_exponent)
    }

    /// Decimal numbers share Lua's and Rust's syntax, so the token is
    /// validated here and converted natively.
    fn read_dec_literal(&mut self) -> Result<f64, SyntaxError> {
        while self.byte(self.index).map_or(false, is_dec_digit) {
            self.index += 1;
        }
        if self.byte(self.index) == Some(b'.') {
            self.index += 1;
            while self.byte(self.index).map_or(false, is_dec_digit) {
                self.index += 1;
            }
        }
        if matches!(self.byte(self.index), Some(b'e') | Some(b'E')) {
            self.index += 1;
            if matches!(self.byte(self.index), Some(b'+') | Some(b'-')) {
                self.index += 1;
            }
            if !self.byte(self.index).map_or(false, is_dec_digit) {
                return Err(self.malformed_number());
            }
            while self.byte(self.index).map_or(false, is_dec_digit) {
                self.index += 1;
            }
        }

        Ok(self
            .slice(self.token_start, self.index)
            .parse()
            .unwrap_or(f64::NAN))
    }

    // ========================================================================
    // Comments
    // ========================================================================

    /// Scan a `--` comment, long or short. Collected as a node when
    /// comment collection is on, validated (and discarded) otherwise.
    fn scan_comment(&mut self) -> Result<(), SyntaxError> {
        self.token_start = self.index;
        self.index += 2; // --

        let comment_start = self.index;
        let comment_line = self.line;
        let comment_line_start = self.line_start;
        let mut content = String::new();
        let mut is_long = false;

        if self.byte(self.index) == Some(b'[') {
            match self.read_long_string(true)? {
                Some(long) => {
                    content = long;
                    is_long = true;
                }
                // This wasn't a long comment after all.
                None => {}
            }
        }

        if !is_long {
            while self.index < self.length {
                if is_line_terminator(self.input.as_bytes()[self.index]) {
                    break;
                }
                self.index += 1;
            }
            if self.collect_comments {
                content = self.slice(comment_start, self.index).to_string();
            }
        }

        if self.collect_comments {
            let raw = self.slice(self.token_start, self.index).to_string();
            let mut node = builder::comment(content, raw);
            // Markers belong to the parser; comments are intercepted here,
            // so location data is set by hand.
            if self.locations {
                node.meta.loc = Some(Location {
                    start: Position::new(comment_line, self.token_start - comment_line_start),
                    end: Position::new(self.line, self.index - self.line_start),
                });
            }
            if self.ranges {
                node.meta.range = Some(TextRange::new(self.token_start, self.index));
            }
            self.comments.push(node);
        }

        Ok(())
    }
}

// ============================================================================
// Character classes
// ============================================================================

#[inline]
fn is_white_space(char_code: u8) -> bool {
    matches!(char_code, b'\t' | b' ' | 0x0B | 0x0C)
}

#[inline]
fn is_line_terminator(char_code: u8) -> bool {
    char_code == b'\n' || char_code == b'\r'
}

#[inline]
fn is_dec_digit(char_code: u8) -> bool {
    char_code.is_ascii_digit()
}

#[inline]
fn is_hex_digit(char_code: u8) -> bool {
    char_code.is_ascii_hexdigit()
}

/// Fold hex digits into a float, so literals longer than 64 bits lose
/// precision instead of overflowing.
fn hex_digits_to_f64(digits: &str) -> f64 {
    digits
        .bytes()
        .fold(0.0, |acc, b| acc * 16.0 + (b as char).to_digit(16).unwrap_or(0) as f64)
}
