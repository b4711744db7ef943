//! ADQL Parser
//!
//! A hand-written recursive descent parser. Expressions use precedence
//! climbing; alternatives that share a prefix are tried in order with
//! backtracking.

mod cursor;
mod engine;
mod error;
mod expr;
mod literal;
mod query;

pub use cursor::{Mark, TokenCursor};
pub use engine::{PResult, ParseResult, Parser};
pub use error::{ParseError, ParseErrorKind, ParseFail};
