//! Error types for the pillpal_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pillpal_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persistence API could not be reached
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The persistence API answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A record from the persistence API failed schema validation
    #[error("Invalid record from API: {0}")]
    Decode(String),

    /// Input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required setting (base URL, credentials) is missing
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl Error {
    /// Whether repeating the same operation could succeed.
    ///
    /// Nothing in this crate retries on its own; this only informs callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
