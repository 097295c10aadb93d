//! Error types shared across the curator library.

use thiserror::Error;

/// Result type used by all library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building playlists.
///
/// Only conditions that abort an operation surface here. Recoverable
/// problems (malformed numeric selector parts, unrecognized remainder
/// modes) are logged and skipped instead, so a single bad filter never
/// takes down the whole run.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading a collection or configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A collection or configuration document is not valid JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Operand/operator count mismatch or unbalanced parentheses in a
    /// boolean expression. Fatal to that expression only.
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// A `{Playlist Name}` selector names a playlist that does not exist
    /// in any rendered tree. Fatal to the whole Combiner run.
    #[error("Playlist not found: {0}")]
    UnknownSelector(String),

    /// A taxonomy entry is neither a tag string nor a folder record.
    #[error("Invalid taxonomy entry: {0}")]
    InvalidTaxonomy(String),
}
