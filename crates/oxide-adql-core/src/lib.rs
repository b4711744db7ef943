//! # oxide-adql-core
//!
//! A hand-written recursive descent parser for ADQL, the SQL dialect used
//! to query astronomical catalogues.
//!
//! This crate provides:
//! - A lexer producing typed tokens with line and column positions
//! - A backtracking rule engine with precedence climbing for expressions
//! - Error recovery that reports several independent errors per input
//! - An AST with a minimal-parentheses pretty-printer, a read-only
//!   [`Visitor`](ast::Visitor) and a rewriting [`Fold`](ast::Fold)
//!
//! ## Parsing
//!
//! ```rust
//! use oxide_adql_core::parse;
//!
//! let result = parse("SELECT ra, dec FROM gaia WHERE mag < 12 ORDER BY mag");
//! assert!(result.errors.is_empty());
//! let query = result.ast.unwrap();
//! assert_eq!(
//!     query.to_string(),
//!     "SELECT ra, dec FROM gaia WHERE mag < 12 ORDER BY mag"
//! );
//! ```
//!
//! ## Diagnostics
//!
//! Syntax errors do not stop the parse. Each malformed clause is reported
//! and skipped:
//!
//! ```rust
//! use oxide_adql_core::parse;
//!
//! let result = parse("SELECT a, FROM t WHERE");
//! assert_eq!(result.errors.len(), 2);
//! assert!(result.errors[0].to_string().starts_with("0:10: expected one of {"));
//! ```

pub mod ast;
pub mod config;
pub mod lexer;
pub mod parser;
pub mod precedence;

pub use ast::{Expr, Query};
pub use config::ParserConfig;
pub use lexer::{tokenize, LexError, Lexer, Token, TokenKind};
pub use parser::{ParseError, ParseResult, Parser};
pub use precedence::PrecedenceTable;

/// Parses `source` with the default configuration.
///
/// Never fails: lexical and syntax errors are collected in
/// [`ParseResult::errors`].
#[must_use]
pub fn parse(source: &str) -> ParseResult {
    parse_with(source, &ParserConfig::default())
}

/// Parses `source` with `config`.
///
/// A lexical error yields a single error and no tree.
#[must_use]
pub fn parse_with(source: &str, config: &ParserConfig) -> ParseResult {
    try_parse_with(source, config).unwrap_or_else(|error| ParseResult {
        ast: None,
        errors: vec![ParseError::lexical(error)],
    })
}

/// Parses `source` with the default configuration, surfacing lexical
/// errors separately.
///
/// # Errors
///
/// Returns the first [`LexError`] if `source` cannot be tokenized.
pub fn try_parse(source: &str) -> Result<ParseResult, LexError> {
    try_parse_with(source, &ParserConfig::default())
}

/// Parses `source` with `config`, surfacing lexical errors separately.
///
/// # Errors
///
/// Returns the first [`LexError`] if `source` cannot be tokenized.
pub fn try_parse_with(source: &str, config: &ParserConfig) -> Result<ParseResult, LexError> {
    Ok(Parser::from_source(source, config.clone())?.parse())
}
