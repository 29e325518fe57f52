//! Query error types

use thiserror::Error;

/// Result type alias for query operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Query-specific error types
///
/// Malformed query text is never an error; it degrades to defaults.
#[derive(Error, Debug)]
pub enum QueryError {
    /// A delegated backend failed; carries the backend's own message
    #[error("Query execution error ({backend}): {message}")]
    Execution { backend: String, message: String },

    /// The plan was compiled for a snapshot of a different shape
    #[error("Plan does not fit snapshot: {0}")]
    ProfileMismatch(String),
}
