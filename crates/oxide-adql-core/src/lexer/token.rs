//! Token types for the ADQL lexer.

use core::fmt;

use super::{Position, Span};

/// Version of the [`TokenKind`] set.
///
/// Bumped whenever a variant is added, removed or renamed so that external
/// matchers can detect drift.
pub const TOKEN_KIND_VERSION: u32 = 1;

/// Reserved words. All keywords are reserved: they never lex as identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Keyword {
    // Query structure
    Select,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    Offset,
    Top,
    Distinct,
    All,
    As,
    Asc,
    Desc,
    With,

    // Joins
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    Natural,
    On,
    Using,

    // Set operations
    Union,
    Intersect,
    Except,

    // Predicates and logical operators
    And,
    Or,
    Not,
    In,
    Between,
    Like,
    Ilike,
    Escape,
    Is,
    Null,
    True,
    False,
    Exists,

    // Conditional and conversion
    Case,
    When,
    Then,
    Else,
    End,
    Cast,

    // Aggregates
    Count,
    Sum,
    Avg,
    Min,
    Max,

    // Data types
    Smallint,
    Integer,
    Bigint,
    Real,
    Double,
    Precision,
    Char,
    Varchar,
    Timestamp,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "GROUP" => Some(Self::Group),
            "BY" => Some(Self::By),
            "HAVING" => Some(Self::Having),
            "ORDER" => Some(Self::Order),
            "OFFSET" => Some(Self::Offset),
            "TOP" => Some(Self::Top),
            "DISTINCT" => Some(Self::Distinct),
            "ALL" => Some(Self::All),
            "AS" => Some(Self::As),
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            "WITH" => Some(Self::With),
            "JOIN" => Some(Self::Join),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "FULL" => Some(Self::Full),
            "OUTER" => Some(Self::Outer),
            "CROSS" => Some(Self::Cross),
            "NATURAL" => Some(Self::Natural),
            "ON" => Some(Self::On),
            "USING" => Some(Self::Using),
            "UNION" => Some(Self::Union),
            "INTERSECT" => Some(Self::Intersect),
            "EXCEPT" => Some(Self::Except),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            "LIKE" => Some(Self::Like),
            "ILIKE" => Some(Self::Ilike),
            "ESCAPE" => Some(Self::Escape),
            "IS" => Some(Self::Is),
            "NULL" => Some(Self::Null),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "EXISTS" => Some(Self::Exists),
            "CASE" => Some(Self::Case),
            "WHEN" => Some(Self::When),
            "THEN" => Some(Self::Then),
            "ELSE" => Some(Self::Else),
            "END" => Some(Self::End),
            "CAST" => Some(Self::Cast),
            "COUNT" => Some(Self::Count),
            "SUM" => Some(Self::Sum),
            "AVG" => Some(Self::Avg),
            "MIN" => Some(Self::Min),
            "MAX" => Some(Self::Max),
            "SMALLINT" => Some(Self::Smallint),
            "INTEGER" => Some(Self::Integer),
            "BIGINT" => Some(Self::Bigint),
            "REAL" => Some(Self::Real),
            "DOUBLE" => Some(Self::Double),
            "PRECISION" => Some(Self::Precision),
            "CHAR" => Some(Self::Char),
            "VARCHAR" => Some(Self::Varchar),
            "TIMESTAMP" => Some(Self::Timestamp),
            _ => None,
        }
    }

    /// Returns the keyword as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Group => "GROUP",
            Self::By => "BY",
            Self::Having => "HAVING",
            Self::Order => "ORDER",
            Self::Offset => "OFFSET",
            Self::Top => "TOP",
            Self::Distinct => "DISTINCT",
            Self::All => "ALL",
            Self::As => "AS",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::With => "WITH",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Outer => "OUTER",
            Self::Cross => "CROSS",
            Self::Natural => "NATURAL",
            Self::On => "ON",
            Self::Using => "USING",
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::Ilike => "ILIKE",
            Self::Escape => "ESCAPE",
            Self::Is => "IS",
            Self::Null => "NULL",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Exists => "EXISTS",
            Self::Case => "CASE",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::Cast => "CAST",
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Smallint => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::Bigint => "BIGINT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Precision => "PRECISION",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Timestamp => "TIMESTAMP",
        }
    }
}

/// Coarse classification of a [`TokenKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenCategory {
    Keyword,
    Identifier,
    Integer,
    Real,
    String,
    Operator,
    Punctuation,
    Eof,
}

/// The kind of token.
///
/// Kinds carry no payload; the literal text lives in [`Token::lexeme`]. This
/// keeps kinds `Copy` and totally ordered so they can be collected into
/// expected-token sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenKind {
    // Keywords and identifiers
    /// Reserved word.
    Keyword(Keyword),
    /// Regular identifier (e.g., `ra`).
    Identifier,
    /// Double-quoted identifier (e.g., `"Right Ascension"`).
    DelimitedIdentifier,

    // Literals
    /// Integer literal, decimal or `0x` hexadecimal.
    Integer,
    /// Real literal (e.g., `3.14`, `1e-3`).
    Real,
    /// Single-quoted string literal.
    String,

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// <> or !=
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ^
    BitXor,
    /// ~
    BitNot,

    // Punctuation
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// .
    Dot,
    /// ;
    Semicolon,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Returns the coarse category of this kind.
    #[must_use]
    pub const fn category(&self) -> TokenCategory {
        match self {
            Self::Keyword(_) => TokenCategory::Keyword,
            Self::Identifier | Self::DelimitedIdentifier => TokenCategory::Identifier,
            Self::Integer => TokenCategory::Integer,
            Self::Real => TokenCategory::Real,
            Self::String => TokenCategory::String,
            Self::Plus
            | Self::Minus
            | Self::Star
            | Self::Slash
            | Self::Percent
            | Self::Eq
            | Self::NotEq
            | Self::Lt
            | Self::LtEq
            | Self::Gt
            | Self::GtEq
            | Self::Concat
            | Self::BitAnd
            | Self::BitOr
            | Self::BitXor
            | Self::BitNot => TokenCategory::Operator,
            Self::LeftParen | Self::RightParen | Self::Comma | Self::Dot | Self::Semicolon => {
                TokenCategory::Punctuation
            }
            Self::Eof => TokenCategory::Eof,
        }
    }

    /// Returns true if this kind names an identifier of either form.
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier | Self::DelimitedIdentifier)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Keyword(kw) => kw.as_str(),
            Self::Identifier => "identifier",
            Self::DelimitedIdentifier => "delimited identifier",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::String => "string",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Percent => "'%'",
            Self::Eq => "'='",
            Self::NotEq => "'<>'",
            Self::Lt => "'<'",
            Self::LtEq => "'<='",
            Self::Gt => "'>'",
            Self::GtEq => "'>='",
            Self::Concat => "'||'",
            Self::BitAnd => "'&'",
            Self::BitOr => "'|'",
            Self::BitXor => "'^'",
            Self::BitNot => "'~'",
            Self::LeftParen => "'('",
            Self::RightParen => "')'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::Semicolon => "';'",
            Self::Eof => "EOF",
        };
        f.write_str(text)
    }
}

/// A token with its source text and location.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The exact source text, quotes included. Empty for EOF.
    pub lexeme: String,
    /// Byte range in the source.
    pub span: Span,
    /// Line of the first character (0-based).
    pub line: u32,
    /// Column of the first character (0-based, in characters).
    pub column: u32,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span, line: u32, column: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
            line,
            column,
        }
    }

    /// Creates an EOF token at the given position.
    #[must_use]
    pub fn eof(at: Position) -> Self {
        Self::new(
            TokenKind::Eof,
            String::new(),
            Span::new(at.offset, at.offset),
            at.line,
            at.column,
        )
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns the start position of this token.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.span.start, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("IlIkE"), Some(Keyword::Ilike));
        assert_eq!(Keyword::from_str("contains"), None);
    }

    #[test]
    fn test_keyword_round_trips_through_as_str() {
        for kw in [
            Keyword::Select,
            Keyword::Top,
            Keyword::Natural,
            Keyword::Intersect,
            Keyword::Precision,
        ] {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_token_kind_category() {
        assert_eq!(
            TokenKind::Keyword(Keyword::Where).category(),
            TokenCategory::Keyword
        );
        assert_eq!(TokenKind::DelimitedIdentifier.category(), TokenCategory::Identifier);
        assert_eq!(TokenKind::Concat.category(), TokenCategory::Operator);
        assert_eq!(TokenKind::Comma.category(), TokenCategory::Punctuation);
        assert_eq!(TokenKind::Eof.category(), TokenCategory::Eof);
    }

    #[test]
    fn test_token_kind_display() {
        assert_eq!(TokenKind::Keyword(Keyword::From).to_string(), "FROM");
        assert_eq!(TokenKind::Comma.to_string(), "','");
        assert_eq!(TokenKind::Identifier.to_string(), "identifier");
        assert_eq!(TokenKind::Eof.to_string(), "EOF");
    }

    #[test]
    fn test_token_as_keyword() {
        let select = Token::new(TokenKind::Keyword(Keyword::Select), "select", Span::new(0, 6), 0, 0);
        let plus = Token::new(TokenKind::Plus, "+", Span::new(0, 1), 0, 0);
        assert_eq!(select.as_keyword(), Some(Keyword::Select));
        assert_eq!(plus.as_keyword(), None);
        assert!(Token::eof(Position::default()).is_eof());
    }
}
