//! The rule engine: token primitives, combinators, failure tracking and
//! error recovery.
//!
//! Every nonterminal is a `parse_*` method returning [`PResult`]. Rules run
//! through [`Parser::rule`], which rewinds the cursor when the rule fails, so
//! a failed rule never consumes input.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use super::cursor::TokenCursor;
use super::error::{ParseError, ParseErrorKind, ParseFail};
use crate::ast::Query;
use crate::config::{ParserConfig, BUDGET_CHECK_INTERVAL};
use crate::lexer::{tokenize, Keyword, LexError, Token, TokenKind};

/// Result of a single rule.
pub type PResult<T> = Result<T, ParseFail>;

/// Outcome of parsing a whole input.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseResult {
    /// The tree, possibly partial when errors were recovered from. `None`
    /// when nothing usable was recognized.
    pub ast: Option<Query>,
    /// Errors in source order.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if the input parsed without errors.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty() && self.ast.is_some()
    }

    /// Returns the tree if there were no errors.
    ///
    /// # Errors
    ///
    /// Returns every collected error otherwise.
    pub fn into_result(self) -> Result<Query, Vec<ParseError>> {
        match self.ast {
            Some(query) if self.errors.is_empty() => Ok(query),
            _ => Err(self.errors),
        }
    }
}

/// The deepest point any rule failed at, with what would have been accepted
/// there.
#[derive(Debug)]
struct Furthest {
    position: usize,
    expected: BTreeSet<TokenKind>,
    rule_stack: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    ErrorLimit,
    Budget,
    Depth,
}

/// ADQL parser over a token stream.
#[derive(Debug)]
pub struct Parser {
    pub(super) cursor: TokenCursor,
    pub(super) config: ParserConfig,
    furthest: Option<Furthest>,
    rule_stack: Vec<&'static str>,
    errors: Vec<ParseError>,
    invocations: usize,
    depth: usize,
    speculation: usize,
    pub(super) query_depth: usize,
    halted: Option<Halt>,
}

impl Parser {
    /// Creates a parser over already tokenized input.
    #[must_use]
    pub fn new(tokens: Vec<Token>, config: ParserConfig) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            config,
            furthest: None,
            rule_stack: Vec::new(),
            errors: Vec::new(),
            invocations: 0,
            depth: 0,
            speculation: 0,
            query_depth: 0,
            halted: None,
        }
    }

    /// Tokenizes `source` and creates a parser over it.
    ///
    /// # Errors
    ///
    /// Returns the first lexical error.
    pub fn from_source(source: &str, config: ParserConfig) -> Result<Self, LexError> {
        Ok(Self::new(tokenize(source)?, config))
    }

    /// Returns the token cursor.
    #[must_use]
    pub const fn cursor(&self) -> &TokenCursor {
        &self.cursor
    }

    /// Returns the errors reported so far.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parses a complete statement: a query, an optional `;`, then EOF.
    #[must_use]
    pub fn parse(mut self) -> ParseResult {
        if let Some(limit) = self.config.max_tokens {
            // The trailing EOF does not count.
            let count = self.cursor.len().saturating_sub(1);
            if count > limit {
                warn!(count, limit, "token limit exceeded, not parsing");
                let error = ParseError::at(
                    self.cursor.token_at(limit),
                    ParseErrorKind::TooManyTokens { count, limit },
                );
                return ParseResult {
                    ast: None,
                    errors: vec![error],
                };
            }
        }

        let ast = self.parse_statement();
        ParseResult {
            ast,
            errors: self.errors,
        }
    }

    fn parse_statement(&mut self) -> Option<Query> {
        let query = match self.parse_query() {
            Ok(query) => query,
            Err(fail) => {
                if !fail.fatal {
                    self.report(fail);
                }
                return None;
            }
        };
        if self.halted.is_some() {
            return None;
        }

        self.eat(TokenKind::Semicolon);
        if !self.check(TokenKind::Eof) {
            let fail = self.fail();
            self.report(fail);
        }
        Some(query)
    }

    // --- Token primitives ---

    /// Returns the current token.
    pub(super) fn peek(&self) -> &Token {
        self.cursor.peek(0)
    }

    /// Returns the kind of the token `offset` positions ahead.
    pub(super) fn peek_kind(&self, offset: usize) -> TokenKind {
        self.cursor.peek(offset).kind
    }

    /// Consumes the current token.
    pub(super) fn advance(&mut self) -> Token {
        self.cursor.advance().clone()
    }

    /// Tests the current token. A miss records `kind` as expected here.
    pub(super) fn check(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind(0) == kind {
            true
        } else {
            self.note(kind);
            false
        }
    }

    pub(super) fn check_keyword(&mut self, keyword: Keyword) -> bool {
        self.check(TokenKind::Keyword(keyword))
    }

    /// Consumes the current token if it is `kind`.
    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.cursor.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        self.eat(TokenKind::Keyword(keyword))
    }

    /// Consumes a token of `kind` or fails.
    pub(super) fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.fail())
        }
    }

    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> PResult<()> {
        self.expect(TokenKind::Keyword(keyword)).map(|_| ())
    }

    // --- Failure tracking ---

    /// Records that `kind` would have been accepted at the current token.
    pub(super) fn note(&mut self, kind: TokenKind) {
        let position = self.cursor.position();
        match &mut self.furthest {
            Some(furthest) if furthest.position > position => {}
            Some(furthest) if furthest.position == position => {
                furthest.expected.insert(kind);
            }
            _ => {
                self.furthest = Some(Furthest {
                    position,
                    expected: BTreeSet::from([kind]),
                    rule_stack: self.rule_stack.clone(),
                });
            }
        }
    }

    /// Builds a failure from the deepest expectation recorded so far.
    pub(super) fn fail(&self) -> ParseFail {
        self.furthest.as_ref().map_or_else(
            || ParseFail::new(self.cursor.position(), BTreeSet::new()),
            |furthest| ParseFail {
                position: furthest.position,
                expected: furthest.expected.clone(),
                rule_stack: furthest.rule_stack.clone(),
                fatal: false,
            },
        )
    }

    /// Records every kind in `kinds` as expected here, then fails.
    pub(super) fn fail_expecting(&mut self, kinds: &[TokenKind]) -> ParseFail {
        for &kind in kinds {
            self.note(kind);
        }
        self.fail()
    }

    // --- Combinators ---

    /// Runs a named rule. On failure the cursor is rewound to where the
    /// rule started.
    pub(super) fn rule<T>(
        &mut self,
        name: &'static str,
        body: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        self.tick()?;
        self.nested(|p| {
            let mark = p.cursor.mark();
            p.rule_stack.push(name);
            let result = body(p);
            p.rule_stack.pop();
            if result.is_err() {
                p.cursor.rewind(mark);
            }
            debug_assert!(result.is_ok() || p.cursor.position() == mark.position());
            result
        })
    }

    /// Runs `body` one nesting level deeper. Exceeding `max_depth` is fatal.
    pub(super) fn nested<T>(&mut self, body: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= self.config.max_depth {
            if self.halted.is_none() {
                let limit = self.config.max_depth;
                warn!(limit, "nesting limit exceeded");
                let error = ParseError::at(self.peek(), ParseErrorKind::DepthLimit { limit });
                self.errors.push(error);
                self.halted = Some(Halt::Depth);
            }
            return Err(ParseFail::fatal(self.cursor.position()));
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    /// Runs a rule with recovery disabled.
    fn speculate<T>(
        &mut self,
        name: &'static str,
        body: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        self.speculation += 1;
        let result = self.rule(name, body);
        self.speculation -= 1;
        result
    }

    /// Tries each alternative in order and returns the first success.
    ///
    /// When all fail, the failure reports the deepest point reached by any
    /// of them.
    pub(super) fn first_of<T>(
        &mut self,
        alternatives: &[(&'static str, fn(&mut Self) -> PResult<T>)],
    ) -> PResult<T> {
        let mut last = None;
        for &(name, alternative) in alternatives {
            match self.speculate(name, alternative) {
                Ok(value) => {
                    // Failures of abandoned alternatives past this point
                    // no longer describe the input.
                    let position = self.cursor.position();
                    if self.furthest.as_ref().is_some_and(|f| f.position > position) {
                        self.furthest = None;
                    }
                    return Ok(value);
                }
                Err(fail) if fail.fatal => return Err(fail),
                Err(fail) => last = Some(fail),
            }
        }
        Err(last.unwrap_or_else(|| self.fail()))
    }

    /// Runs a rule, turning an ordinary failure into `None`.
    pub(super) fn optional<T>(
        &mut self,
        name: &'static str,
        body: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<Option<T>> {
        match self.speculate(name, body) {
            Ok(value) => Ok(Some(value)),
            Err(fail) if fail.fatal => Err(fail),
            Err(_) => Ok(None),
        }
    }

    /// Parses one or more items separated by `separator`.
    pub(super) fn one_or_more<T>(
        &mut self,
        separator: TokenKind,
        mut item: impl FnMut(&mut Self) -> PResult<T>,
    ) -> PResult<Vec<T>> {
        let mut items = vec![item(self)?];
        while self.eat(separator) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    /// Counts a rule invocation against the budget.
    fn tick(&mut self) -> PResult<()> {
        if self.halted.is_some() {
            return Err(ParseFail::fatal(self.cursor.position()));
        }
        self.invocations += 1;
        if let Some(limit) = self.config.rule_budget {
            if self.invocations % BUDGET_CHECK_INTERVAL == 0 && self.invocations > limit {
                warn!(limit, invocations = self.invocations, "rule budget exhausted");
                let error = ParseError::at(self.peek(), ParseErrorKind::BudgetExhausted { limit });
                self.errors.push(error);
                self.halted = Some(Halt::Budget);
                return Err(ParseFail::fatal(self.cursor.position()));
            }
        }
        Ok(())
    }

    // --- Recovery ---

    /// Returns true if a failure here may be reported and skipped over.
    ///
    /// Only the outermost query recovers; nested queries and speculative
    /// alternatives propagate their failures.
    pub(super) const fn can_recover(&self) -> bool {
        self.config.recover
            && self.speculation == 0
            && self.query_depth == 1
            && self.halted.is_none()
    }

    /// Converts a failure into a reported error.
    pub(super) fn report(&mut self, fail: ParseFail) {
        let token = self.cursor.token_at(fail.position);
        let error = ParseError::syntax(token, fail.expected, fail.rule_stack);
        debug!(line = error.line, column = error.column, "{error}");
        self.errors.push(error);
        self.furthest = None;

        if self.errors.len() >= self.config.max_errors && self.halted.is_none() {
            warn!(max_errors = self.config.max_errors, "error limit reached, stopping");
            self.halted = Some(Halt::ErrorLimit);
        }
    }

    /// Skips tokens until one in `sync` at or after token `failed_at` and
    /// outside parentheses, or EOF. A `(` that is never closed does not
    /// open a group. Returns the number skipped.
    pub(super) fn recover(&mut self, sync: &[TokenKind], failed_at: usize) -> usize {
        let closed = self.closed_parens();
        let mut skipped = 0;
        let mut depth = 0usize;
        while !self.cursor.at_eof() {
            let position = self.cursor.position();
            let kind = self.peek_kind(0);
            if depth == 0 && position >= failed_at && sync.contains(&kind) {
                break;
            }
            match kind {
                TokenKind::LeftParen if closed.contains(&position) => depth += 1,
                TokenKind::RightParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.cursor.advance();
            skipped += 1;
        }
        debug!(skipped, sync = %self.peek_kind(0), "resynchronized");
        skipped
    }

    /// Positions of the `(` tokens from here on that have a matching `)`.
    fn closed_parens(&self) -> HashSet<usize> {
        let mut open = Vec::new();
        let mut closed = HashSet::new();
        for index in self.cursor.position()..self.cursor.len() {
            match self.cursor.token_at(index).kind {
                TokenKind::LeftParen => open.push(index),
                TokenKind::RightParen => {
                    if let Some(start) = open.pop() {
                        closed.insert(start);
                    }
                }
                _ => {}
            }
        }
        closed
    }

    /// Reports `fail` and resynchronizes, or hands the failure back when
    /// recovery is not possible here.
    pub(super) fn recover_from(&mut self, fail: ParseFail, sync: &[TokenKind]) -> PResult<()> {
        if fail.fatal || !self.can_recover() {
            return Err(fail);
        }
        let failed_at = fail.position;
        self.report(fail);
        if self.halted.is_some() {
            return Err(ParseFail::fatal(self.cursor.position()));
        }
        self.recover(sync, failed_at);
        Ok(())
    }

    /// Runs a clause body, recovering at `sync` if it fails.
    pub(super) fn clause<T>(
        &mut self,
        sync: &[TokenKind],
        body: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<Option<T>> {
        match body(self) {
            Ok(value) => Ok(Some(value)),
            Err(fail) => self.recover_from(fail, sync).map(|()| None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(source: &str) -> Parser {
        Parser::from_source(source, ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_check_records_expectations() {
        let mut p = parser("foo");
        assert!(!p.check(TokenKind::Comma));
        assert!(!p.check_keyword(Keyword::From));
        let fail = p.fail();
        assert_eq!(fail.position, 0);
        assert_eq!(
            fail.expected,
            BTreeSet::from([TokenKind::Comma, TokenKind::Keyword(Keyword::From)])
        );
    }

    #[test]
    fn test_deeper_expectation_wins() {
        let mut p = parser("a b");
        let start = p.cursor.mark();
        p.advance();
        assert!(!p.check(TokenKind::Comma));
        p.cursor.rewind(start);
        assert!(!p.check(TokenKind::Dot));
        assert_eq!(p.fail().position, 1);
        assert_eq!(p.fail().expected, BTreeSet::from([TokenKind::Comma]));
    }

    #[test]
    fn test_failed_rule_rewinds() {
        let mut p = parser("a b c");
        let result: PResult<()> = p.rule("two_then_comma", |p| {
            p.advance();
            p.advance();
            p.expect(TokenKind::Comma).map(|_| ())
        });
        assert!(result.is_err());
        assert_eq!(p.cursor.position(), 0);
    }

    #[test]
    fn test_first_of_takes_first_success() {
        fn comma(p: &mut Parser) -> PResult<u8> {
            p.expect(TokenKind::Comma).map(|_| 1)
        }
        fn ident(p: &mut Parser) -> PResult<u8> {
            p.expect(TokenKind::Identifier).map(|_| 2)
        }
        let mut p = parser("a");
        assert_eq!(p.first_of(&[("comma", comma), ("ident", ident)]), Ok(2));
        assert_eq!(p.cursor.position(), 1);
    }

    #[test]
    fn test_first_of_merges_expectations() {
        fn comma(p: &mut Parser) -> PResult<()> {
            p.expect(TokenKind::Comma).map(|_| ())
        }
        fn dot(p: &mut Parser) -> PResult<()> {
            p.expect(TokenKind::Dot).map(|_| ())
        }
        let mut p = parser("a");
        let fail = p.first_of(&[("comma", comma), ("dot", dot)]).unwrap_err();
        assert_eq!(
            fail.expected,
            BTreeSet::from([TokenKind::Comma, TokenKind::Dot])
        );
        assert_eq!(p.cursor.position(), 0);
    }

    #[test]
    fn test_optional_and_one_or_more() {
        let mut p = parser("a, b, c;");
        let items = p
            .one_or_more(TokenKind::Comma, |p| p.expect(TokenKind::Identifier))
            .unwrap();
        assert_eq!(items.len(), 3);
        let missing = p
            .optional("comma", |p| p.expect(TokenKind::Comma))
            .unwrap();
        assert!(missing.is_none());
        assert_eq!(p.peek_kind(0), TokenKind::Semicolon);
    }

    #[test]
    fn test_recover_skips_to_sync() {
        let mut p = parser("x (y, z) , w");
        assert_eq!(p.recover(&[TokenKind::Comma], 0), 6);
        assert_eq!(p.peek_kind(0), TokenKind::Comma);
        assert_eq!(p.recover(&[TokenKind::Semicolon], 0), 2);
        assert!(p.cursor.at_eof());
    }

    #[test]
    fn test_recover_ignores_unclosed_paren() {
        // f ( 1 , FROM t
        let mut p = parser("f(1, FROM t");
        let sync = [TokenKind::Comma, TokenKind::Keyword(Keyword::From)];
        assert_eq!(p.recover(&sync, 4), 4);
        assert_eq!(p.peek_kind(0), TokenKind::Keyword(Keyword::From));
    }

    #[test]
    fn test_recover_stops_only_after_failure() {
        let mut p = parser("a, b, c");
        assert_eq!(p.recover(&[TokenKind::Comma], 2), 3);
        assert_eq!(p.cursor.position(), 3);
    }

    #[test]
    fn test_nesting_limit_is_fatal() {
        fn descend(p: &mut Parser) -> PResult<()> {
            p.rule("descend", descend)
        }
        let config = ParserConfig::default().with_max_depth(8);
        let mut p = Parser::from_source("a", config).unwrap();
        let fail = descend(&mut p).unwrap_err();
        assert!(fail.fatal);
        assert_eq!(p.errors().len(), 1);
        assert_eq!(p.errors()[0].kind, ParseErrorKind::DepthLimit { limit: 8 });
        assert_eq!(p.depth, 0);
        assert!(p.rule_stack.is_empty());
    }

    #[test]
    fn test_rule_budget_is_fatal() {
        let config = ParserConfig::default().with_rule_budget(Some(1));
        let mut p = Parser::from_source("a", config).unwrap();
        let mut outcome = Ok(());
        for _ in 0..BUDGET_CHECK_INTERVAL {
            outcome = p.rule("noop", |_| Ok(()));
            if outcome.is_err() {
                break;
            }
        }
        let fail = outcome.unwrap_err();
        assert!(fail.fatal);
        assert!(matches!(
            p.errors()[0].kind,
            ParseErrorKind::BudgetExhausted { limit: 1 }
        ));
    }
}
