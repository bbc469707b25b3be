//! Operator precedence for binary operators.
//!
//! Unary `-` can't be told apart from binary `-` by the table, so unary
//! precedence lives in `parse_sub_expression` instead.

/// The precedence unary operators bind at.
pub(crate) const UNARY_PRECEDENCE: u8 = 10;

/// The binding power of a binary operator, or 0 when the text is not a
/// binary operator at all.
pub(crate) fn binary_precedence(operator: &str) -> u8 {
    match operator {
        "^" => 12,
        "*" | "/" | "%" | "//" => 10,
        "+" | "-" => 9,
        ".." => 8,
        "<<" | ">>" => 7,
        "&" => 6,
        "~" => 5,
        "|" => 4,
        "<" | ">" | "<=" | ">=" | "==" | "~=" => 3,
        "and" => 2,
        "or" => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        assert!(binary_precedence("^") > UNARY_PRECEDENCE);
        assert!(binary_precedence("*") > binary_precedence("+"));
        assert!(binary_precedence("+") > binary_precedence(".."));
        assert!(binary_precedence("..") > binary_precedence("<"));
        assert!(binary_precedence("<") > binary_precedence("and"));
        assert!(binary_precedence("and") > binary_precedence("or"));
        assert_eq!(binary_precedence("not"), 0);
        assert_eq!(binary_precedence("#"), 0);
    }

    #[test]
    fn test_bitwise_tiers() {
        assert!(binary_precedence("<<") > binary_precedence("&"));
        assert!(binary_precedence("&") > binary_precedence("~"));
        assert!(binary_precedence("~") > binary_precedence("|"));
        assert!(binary_precedence("|") > binary_precedence("=="));
    }
}
