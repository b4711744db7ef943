//! Conversion of literal lexemes to values.

/// Parses a decimal or `0x` hexadecimal integer lexeme.
pub fn parse_integer(lexeme: &str) -> Option<i64> {
    match lexeme
        .strip_prefix("0x")
        .or_else(|| lexeme.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => lexeme.parse().ok(),
    }
}

/// Strips the quotes from a string lexeme and collapses `''` to `'`.
pub fn unquote_string(lexeme: &str) -> String {
    strip(lexeme, '\'').replace("''", "'")
}

/// Strips the quotes from a delimited identifier and collapses `""` to `"`.
pub fn unquote_identifier(lexeme: &str) -> String {
    strip(lexeme, '"').replace("\"\"", "\"")
}

fn strip(lexeme: &str, quote: char) -> &str {
    let inner = lexeme.strip_prefix(quote).unwrap_or(lexeme);
    inner.strip_suffix(quote).unwrap_or(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("0x1F"), Some(31));
        assert_eq!(parse_integer("0XfF"), Some(255));
        assert_eq!(parse_integer("99999999999999999999"), None);
    }

    #[test]
    fn test_unquote_string() {
        assert_eq!(unquote_string("'it''s'"), "it's");
        assert_eq!(unquote_string("''"), "");
        assert_eq!(unquote_string("''''"), "'");
    }

    #[test]
    fn test_unquote_identifier() {
        assert_eq!(unquote_identifier("\"My Table\""), "My Table");
        assert_eq!(unquote_identifier("\"a\"\"b\""), "a\"b");
    }
}
