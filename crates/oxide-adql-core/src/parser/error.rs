//! Parser error types.

use std::collections::BTreeSet;
use std::fmt;

use crate::lexer::{LexError, Position, Span, Token, TokenKind};

/// Why a rule failed. Carried up the rule stack by `Err` and never shown to
/// users directly; recovery turns it into a [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFail {
    /// Token index of the deepest failure seen so far.
    pub position: usize,
    /// Token kinds that would have let parsing continue at `position`.
    pub expected: BTreeSet<TokenKind>,
    /// Rules active when the deepest failure was recorded, outermost first.
    pub rule_stack: Vec<&'static str>,
    /// Set when parsing must stop instead of trying alternatives.
    pub fatal: bool,
}

impl ParseFail {
    /// Creates a non-fatal failure.
    #[must_use]
    pub const fn new(position: usize, expected: BTreeSet<TokenKind>) -> Self {
        Self {
            position,
            expected,
            rule_stack: Vec::new(),
            fatal: false,
        }
    }

    /// Creates a failure that stops the parse.
    #[must_use]
    pub const fn fatal(position: usize) -> Self {
        Self {
            position,
            expected: BTreeSet::new(),
            rule_stack: Vec::new(),
            fatal: true,
        }
    }
}

/// The category of a [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseErrorKind {
    /// An unexpected token.
    Syntax {
        expected: BTreeSet<TokenKind>,
        found: TokenKind,
    },
    /// The input could not be tokenized.
    Lexical(LexError),
    /// The token stream is longer than the configured limit.
    TooManyTokens { count: usize, limit: usize },
    /// The rule budget ran out.
    BudgetExhausted { limit: usize },
    /// Rules nested deeper than the configured limit.
    DepthLimit { limit: usize },
}

/// A diagnostic produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 0-based line of the offending token.
    pub line: u32,
    /// 0-based column of the offending token.
    pub column: u32,
    /// Byte range of the offending token.
    pub span: Span,
    /// Source text of the offending token. Empty at end of input.
    pub found: String,
    /// Rules active at the failure, outermost first.
    pub rule_stack: Vec<&'static str>,
}

impl ParseError {
    /// Creates a syntax error at `token`.
    #[must_use]
    pub fn syntax(
        token: &Token,
        expected: BTreeSet<TokenKind>,
        rule_stack: Vec<&'static str>,
    ) -> Self {
        Self {
            kind: ParseErrorKind::Syntax {
                expected,
                found: token.kind,
            },
            line: token.line,
            column: token.column,
            span: token.span,
            found: token.lexeme.clone(),
            rule_stack,
        }
    }

    /// Wraps a lexer error.
    #[must_use]
    pub fn lexical(error: LexError) -> Self {
        let at = error.position();
        Self {
            line: at.line,
            column: at.column,
            span: Span::new(at.offset, at.offset),
            found: String::new(),
            rule_stack: Vec::new(),
            kind: ParseErrorKind::Lexical(error),
        }
    }

    /// Creates an error that is not tied to an unexpected token.
    #[must_use]
    pub fn at(token: &Token, kind: ParseErrorKind) -> Self {
        Self {
            kind,
            line: token.line,
            column: token.column,
            span: token.span,
            found: token.lexeme.clone(),
            rule_stack: Vec::new(),
        }
    }

    /// Returns the start of the offending token.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.span.start, self.line, self.column)
    }

    /// Returns the expected token kinds of a syntax error.
    #[must_use]
    pub fn expected(&self) -> Option<&BTreeSet<TokenKind>> {
        match &self.kind {
            ParseErrorKind::Syntax { expected, .. } => Some(expected),
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::Syntax { expected, found } => {
                write!(f, "{}:{}: expected one of {{", self.line, self.column)?;
                for (i, kind) in expected.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{kind}")?;
                }
                if *found == TokenKind::Eof {
                    f.write_str("}, found '<EOF>'")
                } else {
                    write!(f, "}}, found '{}'", self.found)
                }
            }
            ParseErrorKind::Lexical(error) => write!(f, "{error}"),
            ParseErrorKind::TooManyTokens { count, limit } => write!(
                f,
                "{}:{}: input has {count} tokens, the limit is {limit}",
                self.line, self.column
            ),
            ParseErrorKind::BudgetExhausted { limit } => write!(
                f,
                "{}:{}: rule budget of {limit} invocations exhausted",
                self.line, self.column
            ),
            ParseErrorKind::DepthLimit { limit } => write!(
                f,
                "{}:{}: input nests deeper than {limit} levels",
                self.line, self.column
            ),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::Lexical(error) => Some(error),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        Self::lexical(error)
    }
}
