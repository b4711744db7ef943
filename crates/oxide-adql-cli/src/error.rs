//! Error types for the command-line front end.

use oxide_adql_core::LexError;

/// Failures that stop one input from being parsed at all.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The input could not be read.
    #[error("cannot read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The input could not be tokenized.
    #[error("{name}:{source}")]
    Lex {
        name: String,
        #[source]
        source: LexError,
    },

    /// The tree could not be rendered as JSON.
    #[error("cannot render JSON: {0}")]
    Json(#[from] serde_json::Error),
}
