//! ADQL tokenizer implementation.

use super::{Keyword, LexError, Position, Span, Token, TokenKind};

/// Tokenizes `source` into a vector that always ends with an EOF token.
///
/// # Errors
///
/// Returns the first [`LexError`] encountered; nothing past it is produced.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

/// A lexer that tokenizes ADQL input.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    line: u32,
    column: u32,
    /// Position of the first character of the current token.
    start: Position,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 0,
            column: 0,
            start: Position::new(0, 0, 0),
        }
    }

    fn here(&self) -> Position {
        Position::new(self.pos, self.line, self.column)
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skips whitespace and comments.
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            // -- line comment
            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            // /* block comment */
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                let at = self.here();
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        Some(_) => {}
                        None => return Err(LexError::UnterminatedComment { at }),
                    }
                }
                continue;
            }

            return Ok(());
        }
    }

    /// Creates a token spanning from the token start to the current position.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            &self.input[self.start.offset..self.pos],
            Span::new(self.start.offset, self.pos),
            self.start.line,
            self.start.column,
        )
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.input[self.start.offset..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier),
        }
    }

    /// Scans a double-quoted identifier. A doubled `""` stands for one quote.
    fn scan_delimited_identifier(&mut self) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut empty = true;

        loop {
            match self.peek() {
                Some('"') if self.peek_next() == Some('"') => {
                    self.advance();
                    self.advance();
                    empty = false;
                }
                Some('"') => break,
                Some(_) => {
                    self.advance();
                    empty = false;
                }
                None => return Err(LexError::UnterminatedIdentifier { at: self.start }),
            }
        }

        self.advance(); // closing quote
        if empty {
            return Err(LexError::EmptyIdentifier { at: self.start });
        }
        Ok(self.make_token(TokenKind::DelimitedIdentifier))
    }

    /// Scans a string literal. A doubled `''` stands for one quote.
    fn scan_string(&mut self) -> Result<Token, LexError> {
        self.advance(); // opening quote

        loop {
            match self.peek() {
                Some('\'') if self.peek_next() == Some('\'') => {
                    self.advance();
                    self.advance();
                }
                Some('\'') => break,
                Some(_) => {
                    self.advance();
                }
                None => return Err(LexError::UnterminatedString { at: self.start }),
            }
        }

        self.advance(); // closing quote
        Ok(self.make_token(TokenKind::String))
    }

    fn malformed_number(&mut self) -> LexError {
        // Swallow the rest of the word so the message shows all of it.
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.')
        {
            self.advance();
        }
        LexError::MalformedNumber {
            text: self.input[self.start.offset..self.pos].to_string(),
            at: self.start,
        }
    }

    /// Scans a number: decimal integer, `0x` hex integer, or real.
    fn scan_number(&mut self) -> Result<Token, LexError> {
        if self.peek() == Some('0') && matches!(self.peek_next(), Some('x' | 'X')) {
            self.advance();
            self.advance();
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            }
            let digits = &self.input[digits_start..self.pos];
            if digits.is_empty() || self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                return Err(self.malformed_number());
            }
            if i64::from_str_radix(digits, 16).is_err() {
                return Err(self.malformed_number());
            }
            return Ok(self.make_token(TokenKind::Integer));
        }

        let mut is_real = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_real = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            is_real = true;
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.malformed_number());
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            return Err(self.malformed_number());
        }

        let text = &self.input[self.start.offset..self.pos];
        if is_real {
            match text.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(self.make_token(TokenKind::Real)),
                _ => Err(self.malformed_number()),
            }
        } else if text.parse::<i64>().is_ok() {
            Ok(self.make_token(TokenKind::Integer))
        } else {
            Err(self.malformed_number())
        }
    }

    /// Consumes `second` if it follows, choosing between two kinds.
    fn either(&mut self, second: char, double: TokenKind, single: TokenKind) -> Token {
        if self.peek() == Some(second) {
            self.advance();
            self.make_token(double)
        } else {
            self.make_token(single)
        }
    }

    /// Scans the next token.
    ///
    /// # Errors
    ///
    /// Returns a [`LexError`] for malformed literals and illegal characters.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;
        self.start = self.here();

        let Some(c) = self.peek() else {
            return Ok(Token::eof(self.start));
        };

        match c {
            '\'' => return self.scan_string(),
            '"' => return self.scan_delimited_identifier(),
            c if c.is_ascii_digit() => return self.scan_number(),
            '.' if self.peek_next().is_some_and(|n| n.is_ascii_digit()) => {
                return self.scan_number();
            }
            c if c.is_alphabetic() || c == '_' => return Ok(self.scan_identifier()),
            _ => {}
        }

        self.advance();
        let token = match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            '.' => self.make_token(TokenKind::Dot),
            ';' => self.make_token(TokenKind::Semicolon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '=' => self.make_token(TokenKind::Eq),
            '&' => self.make_token(TokenKind::BitAnd),
            '^' => self.make_token(TokenKind::BitXor),
            '~' => self.make_token(TokenKind::BitNot),
            '|' => self.either('|', TokenKind::Concat, TokenKind::BitOr),
            '>' => self.either('=', TokenKind::GtEq, TokenKind::Gt),
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                _ => self.make_token(TokenKind::Lt),
            },
            '!' if self.peek() == Some('=') => {
                self.advance();
                self.make_token(TokenKind::NotEq)
            }
            ch => return Err(LexError::IllegalCharacter { ch, at: self.start }),
        };
        Ok(token)
    }

    /// Tokenizes the entire input and returns all tokens, EOF included.
    ///
    /// # Errors
    ///
    /// Returns the first [`LexError`] encountered.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tracing::trace!(count = tokens.len(), "tokenized input");
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn lexemes(input: &str) -> Vec<String> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.lexeme)
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
        assert_eq!((tokens[0].line, tokens[0].column), (0, 0));
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            token_kinds("SELECT -- comment\n/* block\n comment */ FROM"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            token_kinds("select FROM wHeRe"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_longest_match() {
        // "selected" is an identifier, not SELECT followed by "ed".
        assert_eq!(
            token_kinds("selected intersects"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_delimited_identifier_is_never_a_keyword() {
        let tokens = tokenize("\"select\" \"a \"\"b\"\"\"").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::DelimitedIdentifier);
        assert_eq!(tokens[0].lexeme, "\"select\"");
        assert_eq!(tokens[1].kind, TokenKind::DelimitedIdentifier);
        assert_eq!(tokens[1].lexeme, "\"a \"\"b\"\"\"");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            token_kinds("42 0x1F 3.14 .5 1e10 2.5E-3"),
            vec![
                TokenKind::Integer,
                TokenKind::Integer,
                TokenKind::Real,
                TokenKind::Real,
                TokenKind::Real,
                TokenKind::Real,
                TokenKind::Eof,
            ]
        );
        assert_eq!(lexemes("0x1F 2.5E-3")[..2], ["0x1F", "2.5E-3"]);
    }

    #[test]
    fn test_strings_keep_raw_lexeme() {
        let tokens = tokenize("'it''s' ''").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "'it''s'");
        assert_eq!(tokens[1].lexeme, "''");
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            token_kinds("+ - * / % = != <> < <= > >= || | & ^ ~"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Concat,
                TokenKind::BitOr,
                TokenKind::BitAnd,
                TokenKind::BitXor,
                TokenKind::BitNot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            token_kinds("( ) , . ;"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_qualified_name_is_not_a_real() {
        assert_eq!(
            token_kinds("t.ra"),
            vec![
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_position_tracking() {
        let tokens = tokenize("SELECT ra,\n  dec").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!((tokens[1].line, tokens[1].column), (0, 7));
        assert_eq!((tokens[3].line, tokens[3].column), (1, 2));
        assert_eq!(tokens[3].span, Span::new(13, 16));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("SELECT 'abc").unwrap_err();
        assert_eq!(
            err,
            LexError::UnterminatedString {
                at: Position::new(7, 0, 7)
            }
        );
        assert_eq!(err.to_string(), "0:7: unterminated string literal");
    }

    #[test]
    fn test_unterminated_identifier_and_comment() {
        assert!(matches!(
            tokenize("\"abc"),
            Err(LexError::UnterminatedIdentifier { .. })
        ));
        assert!(matches!(
            tokenize("SELECT /* no end"),
            Err(LexError::UnterminatedComment { .. })
        ));
        assert!(matches!(tokenize("\"\""), Err(LexError::EmptyIdentifier { .. })));
    }

    #[test]
    fn test_malformed_numbers() {
        for input in ["1e", "1e+", "0x", "0xZZ", "12abc", "99999999999999999999", "1e999"] {
            assert!(
                matches!(tokenize(input), Err(LexError::MalformedNumber { .. })),
                "expected malformed number for {input}"
            );
        }
        let err = tokenize("SELECT 12abc").unwrap_err();
        assert_eq!(err.to_string(), "0:7: malformed numeric literal '12abc'");
    }

    #[test]
    fn test_illegal_character() {
        let err = tokenize("SELECT a\n  # b").unwrap_err();
        assert_eq!(
            err,
            LexError::IllegalCharacter {
                ch: '#',
                at: Position::new(11, 1, 2)
            }
        );
        assert!(matches!(tokenize("!"), Err(LexError::IllegalCharacter { ch: '!', .. })));
    }
}
