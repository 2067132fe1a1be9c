//! Relay settings, read from the environment.
//!
//! A `.env` file in the working directory is honored by the binary.

use crate::RelayError;

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_PROVIDER_URL: &str = "https://api.twilio.com";

/// Account credentials for the messaging provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    pub port: u16,
    pub provider_url: String,
    /// `None` when any credential is missing; sends then fail as not configured
    pub credentials: Option<ProviderCredentials>,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| RelayError::Config(format!("Invalid PORT: {:?}", raw)))?,
            None => DEFAULT_PORT,
        };

        let credentials = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_FROM"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from)) => Some(ProviderCredentials {
                account_sid,
                auth_token,
                from,
            }),
            _ => None,
        };

        Ok(Self {
            port,
            provider_url: get("TWILIO_API_URL").unwrap_or_else(|| DEFAULT_PROVIDER_URL.into()),
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_credentials() {
        let config = RelayConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8787);
        assert_eq!(config.provider_url, DEFAULT_PROVIDER_URL);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_partial_credentials_are_not_configured() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", ""),
            ("TWILIO_FROM", "+15550001111"),
        ]))
        .unwrap();
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_full_credentials_and_port() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "token"),
            ("TWILIO_FROM", "+15550001111"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.credentials.unwrap().account_sid, "AC123");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = RelayConfig::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(RelayError::Config(_))));
    }
}
