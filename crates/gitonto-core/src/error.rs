//! Error types for Gitonto Core

use thiserror::Error;

/// Result type alias using Gitonto's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Gitonto core error types
///
/// Missing optional data is never an error here; it is reported by the
/// validator. These variants cover snapshots that break the loader contract.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Duplicate entity identifier: {0}")]
    DuplicateEntity(String),

    #[error("Dangling reference: {from} --{edge}--> {to}")]
    DanglingReference {
        from: String,
        edge: &'static str,
        to: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
