//! Location tracking.
//!
//! A `Marker` records where a grammar production started. Markers live on
//! a stack owned by the parser; when a production completes, its marker is
//! popped, completed with the end position of the previous token, and the
//! result is stamped onto the finished node.

use lunar_ast::AstNode;
use lunar_core::{Location, Position, TextRange};
use lunar_lexer::Token;

/// The start position of an in-flight grammar production.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Marker {
    line: usize,
    column: usize,
    index: usize,
}

impl Marker {
    pub fn from_token(token: &Token) -> Marker {
        Marker {
            line: token.line,
            column: token.range.start - token.line_start,
            index: token.range.start,
        }
    }

    /// Complete this marker against the previous token and stamp the node
    /// with whichever of `loc`/`range` is enabled.
    pub fn bless<N: AstNode>(self, node: &mut N, previous: &Token, locations: bool, ranges: bool) {
        if locations {
            node.meta_mut().loc = Some(Location {
                start: Position::new(self.line, self.column),
                end: Position::new(
                    previous.end_line(),
                    previous.range.end - previous.end_line_start(),
                ),
            });
        }
        if ranges {
            node.meta_mut().range = Some(TextRange::new(self.index, previous.range.end));
        }
    }
}
