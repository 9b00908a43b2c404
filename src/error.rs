//! Error types for the voice chat relay

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voice chat relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech recognition service error
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Speech synthesis service error
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Upstream language-model error
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Relay responded with an error payload
    #[error("relay error: {0}")]
    Relay(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
