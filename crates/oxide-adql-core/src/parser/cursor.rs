//! Buffered token cursor with arbitrary lookahead and mark/rewind.

use crate::lexer::{Position, Token};

/// A saved cursor position.
///
/// Marks are plain indices, so taking one and rewinding to it are O(1) and
/// nested marks compose: rewinding to an outer mark is valid no matter how
/// many inner marks were taken or dropped in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

impl Mark {
    /// Index of the token the cursor pointed at when the mark was taken.
    #[must_use]
    pub const fn position(self) -> usize {
        self.0
    }
}

/// Cursor over a token vector that always ends with EOF.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    /// Creates a cursor. An EOF token is appended if `tokens` lacks one.
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let at = tokens.last().map_or_else(Position::default, |t| {
                let column = t.column + u32::try_from(t.lexeme.chars().count()).unwrap_or(0);
                Position::new(t.span.end, t.line, column)
            });
            tokens.push(Token::eof(at));
        }
        Self { tokens, pos: 0 }
    }

    fn eof(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    /// Returns the token `offset` places ahead without moving.
    ///
    /// Past the end this keeps returning the EOF token.
    #[must_use]
    pub fn peek(&self, offset: usize) -> &Token {
        self.pos
            .checked_add(offset)
            .and_then(|i| self.tokens.get(i))
            .unwrap_or_else(|| self.eof())
    }

    /// Returns the current token and moves past it. EOF is never passed.
    pub fn advance(&mut self) -> &Token {
        let at = self.pos;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[at]
    }

    /// Snapshots the current position.
    #[must_use]
    pub const fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    /// Restores a position captured by [`TokenCursor::mark`].
    pub fn rewind(&mut self, mark: Mark) {
        debug_assert!(
            mark.0 <= self.pos,
            "rewind to {} would move the cursor forward from {}",
            mark.0,
            self.pos
        );
        self.pos = mark.0;
    }

    /// Index of the current token.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the token at an absolute index, clamped to EOF.
    #[must_use]
    pub fn token_at(&self, index: usize) -> &Token {
        self.tokens.get(index).unwrap_or_else(|| self.eof())
    }

    /// Returns true once the current token is EOF.
    #[must_use]
    pub fn at_eof(&self) -> bool {
        self.peek(0).is_eof()
    }

    /// Number of tokens, EOF included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: a cursor holds at least the EOF token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{tokenize, TokenKind};

    fn cursor(input: &str) -> TokenCursor {
        TokenCursor::new(tokenize(input).unwrap())
    }

    #[test]
    fn test_peek_does_not_move() {
        let c = cursor("SELECT a FROM t");
        assert_eq!(c.peek(1).lexeme, "a");
        assert_eq!(c.peek(1).lexeme, "a");
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_peek_past_end_returns_eof() {
        let c = cursor("a");
        assert!(c.peek(1).is_eof());
        assert!(c.peek(1000).is_eof());
        assert!(c.peek(usize::MAX).is_eof());
    }

    #[test]
    fn test_advance_stops_at_eof() {
        let mut c = cursor("a b");
        assert_eq!(c.advance().lexeme, "a");
        assert_eq!(c.advance().lexeme, "b");
        assert!(c.advance().is_eof());
        assert!(c.advance().is_eof());
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn test_nested_marks() {
        let mut c = cursor("a b c d");
        let outer = c.mark();
        c.advance();
        let inner = c.mark();
        c.advance();
        c.advance();
        c.rewind(inner);
        assert_eq!(c.peek(0).lexeme, "b");
        c.advance();
        c.rewind(outer);
        assert_eq!(c.position(), 0);
        assert_eq!(c.peek(0).lexeme, "a");
    }

    #[test]
    fn test_new_appends_missing_eof() {
        let mut tokens = tokenize("ab").unwrap();
        tokens.pop();
        let c = TokenCursor::new(tokens);
        assert_eq!(c.len(), 2);
        assert_eq!(c.token_at(1).kind, TokenKind::Eof);
        assert_eq!(c.token_at(1).column, 2);

        let empty = TokenCursor::new(Vec::new());
        assert!(empty.at_eof());
        assert!(!empty.is_empty());
    }
}
