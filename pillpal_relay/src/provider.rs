//! Messaging provider seam and the Twilio REST implementation.

use crate::config::ProviderCredentials;
use crate::RelayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider acknowledgement for one message
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentMessage {
    pub id: String,
    pub status: String,
}

#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<SentMessage, RelayError>;
}

/// Sends through Twilio's `Messages.json` endpoint
pub struct TwilioProvider {
    client: reqwest::Client,
    base_url: String,
    credentials: ProviderCredentials,
}

#[derive(Deserialize)]
struct TwilioMessage {
    sid: String,
    status: String,
}

#[derive(Deserialize)]
struct TwilioError {
    message: String,
}

impl TwilioProvider {
    pub fn new(base_url: impl Into<String>, credentials: ProviderCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.credentials.account_sid
        )
    }
}

#[async_trait]
impl SmsProvider for TwilioProvider {
    async fn send(&self, to: &str, body: &str) -> Result<SentMessage, RelayError> {
        let form = [
            ("To", to),
            ("From", self.credentials.from.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<TwilioError>(&text)
                .map(|e| e.message)
                .unwrap_or_else(|_| format!("Provider returned {}", status));
            return Err(RelayError::Provider(message));
        }

        let message: TwilioMessage = serde_json::from_str(&text)
            .map_err(|e| RelayError::Provider(format!("Unexpected provider response: {}", e)))?;

        tracing::info!("Sent SMS {} ({})", message.sid, message.status);
        Ok(SentMessage {
            id: message.sid,
            status: message.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> ProviderCredentials {
        ProviderCredentials {
            account_sid: "AC123".into(),
            auth_token: "secret".into(),
            from: "+15550001111".into(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_form_and_returns_sid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(header_exists("Authorization"))
            .and(body_string_contains("Body=Take+Metformin"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "sid": "SM42",
                "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = TwilioProvider::new(server.uri(), credentials());
        let sent = provider.send("+15552223333", "Take Metformin").await.unwrap();

        assert_eq!(
            sent,
            SentMessage {
                id: "SM42".into(),
                status: "queued".into()
            }
        );
    }

    #[tokio::test]
    async fn test_provider_error_message_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 21211,
                "message": "The 'To' number is not a valid phone number.",
                "status": 400
            })))
            .mount(&server)
            .await;

        let provider = TwilioProvider::new(server.uri(), credentials());
        let err = provider.send("nope", "hello").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "The 'To' number is not a valid phone number."
        );
    }
}
