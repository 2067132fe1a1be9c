#![forbid(unsafe_code)]

//! HTTP relay that forwards SMS requests to a messaging provider.
//!
//! Routes:
//! - `GET /health`
//! - `POST /api/sms` with `{"to": ..., "body": ...}`

pub mod config;
pub mod error;
pub mod provider;
pub mod server;

pub use config::{ProviderCredentials, RelayConfig};
pub use error::RelayError;
pub use provider::{SentMessage, SmsProvider, TwilioProvider};
pub use server::{router, AppState};
