//! Lexer error types.

use super::Position;

/// A fatal tokenizing error.
///
/// The lexer stops at the first one; no tokens past the break are produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LexError {
    #[error("{at}: unterminated string literal")]
    UnterminatedString { at: Position },

    #[error("{at}: unterminated delimited identifier")]
    UnterminatedIdentifier { at: Position },

    #[error("{at}: empty delimited identifier")]
    EmptyIdentifier { at: Position },

    #[error("{at}: unterminated block comment")]
    UnterminatedComment { at: Position },

    #[error("{at}: malformed numeric literal '{text}'")]
    MalformedNumber { text: String, at: Position },

    #[error("{at}: illegal character '{ch}'")]
    IllegalCharacter { ch: char, at: Position },
}

impl LexError {
    /// Returns where the offending token starts.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::UnterminatedString { at }
            | Self::UnterminatedIdentifier { at }
            | Self::EmptyIdentifier { at }
            | Self::UnterminatedComment { at }
            | Self::MalformedNumber { at, .. }
            | Self::IllegalCharacter { at, .. } => *at,
        }
    }
}
