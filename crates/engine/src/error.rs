//! Engine boundary errors.

use thiserror::Error;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors crossing the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A query failed inside the engine.
    #[error("query failed: {message} (sql: {sql})")]
    Query {
        /// The offending statement.
        sql: String,
        /// Engine-reported failure message.
        message: String,
    },

    /// A result column held a different representation than the caller
    /// asked for.
    #[error("column {column} holds {actual} values, expected {expected}")]
    ColumnType {
        /// Zero-based column index.
        column: usize,
        /// Representation requested by the caller.
        expected: &'static str,
        /// Representation actually present.
        actual: &'static str,
    },

    /// Byte ingestion failed.
    #[error("ingestion failed: {0}")]
    Ingest(String),
}
