//! ADQL Lexer/Tokenizer
//!
//! A hand-written lexer that turns query text into a vector of typed tokens
//! terminated by EOF. Whitespace and comments are dropped.

mod error;
mod span;
mod token;
mod tokenizer;

pub use error::LexError;
pub use span::{Position, Span};
pub use token::{Keyword, Token, TokenCategory, TokenKind, TOKEN_KIND_VERSION};
pub use tokenizer::{tokenize, Lexer};
