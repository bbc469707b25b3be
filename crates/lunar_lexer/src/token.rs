//! Token data produced by the lexer.

use lunar_ast::TokenKind;
use lunar_core::TextRange;
use lunar_diagnostics::SyntaxError;

/// A token's interpreted value.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// No value: nil literals, and string literals under the `none`
    /// encoding mode.
    None,
    Str(String),
    Number(f64),
    Bool(bool),
}

impl TokenValue {
    /// The value as display text, used when a token's raw slice is empty
    /// (end of file).
    pub fn text(&self) -> String {
        match self {
            TokenValue::None => String::new(),
            TokenValue::Str(s) => s.clone(),
            TokenValue::Number(n) => n.to_string(),
            TokenValue::Bool(b) => b.to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// A positioned token. Immutable once produced; the parser holds at most
/// the current token, one lookahead and the previous token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    /// Byte range `[start, end)` in the input.
    pub range: TextRange,
    /// 1-based line the token starts on.
    pub line: usize,
    /// Byte offset of the start of that line.
    pub line_start: usize,
    /// For multi-line string tokens: the line the token ends on.
    pub last_line: Option<usize>,
    pub last_line_start: Option<usize>,
}

impl Token {
    /// The line this token ends on.
    #[inline]
    pub fn end_line(&self) -> usize {
        self.last_line.unwrap_or(self.line)
    }

    /// The line-start offset of the line this token ends on.
    #[inline]
    pub fn end_line_start(&self) -> usize {
        self.last_line_start.unwrap_or(self.line_start)
    }

    /// Whether the token is a punctuator or keyword with this exact text.
    #[inline]
    pub fn is(&self, text: &str) -> bool {
        matches!(self.kind, TokenKind::Punctuator | TokenKind::Keyword)
            && self.value.as_str() == Some(text)
    }

    /// A syntax error positioned at this token.
    pub fn error(&self, message: String) -> SyntaxError {
        SyntaxError::new(
            message,
            self.line,
            self.range.start - self.line_start,
            self.range.start,
        )
    }
}
