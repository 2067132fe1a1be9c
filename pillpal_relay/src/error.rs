//! Relay error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Request body lacks a recipient or message text
    #[error("Missing 'to' or 'body'")]
    MissingFields,

    /// Provider credentials were not supplied at startup
    #[error("SMS provider not configured")]
    NotConfigured,

    /// The provider rejected the message or could not be reached
    #[error("{0}")]
    Provider(String),

    /// Invalid relay settings
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Provider(e.to_string())
    }
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingFields => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("SMS relay failure: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
