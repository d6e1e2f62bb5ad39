//! Error types for morel-core

use thiserror::Error;

/// Result type alias using morel-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in morel-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Observation not found
    #[error("Observation not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote store rejected a request
    #[error("Remote store error: {0}")]
    Remote(String),

    /// Base64 payload could not be decoded
    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Photo transcoding error
    #[error("Transcode error: {0}")]
    Transcode(String),
}
