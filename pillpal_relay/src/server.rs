//! Relay routes.

use crate::provider::{SentMessage, SmsProvider};
use crate::RelayError;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    provider: Option<Arc<dyn SmsProvider>>,
}

impl AppState {
    pub fn new(provider: Option<Arc<dyn SmsProvider>>) -> Self {
        Self { provider }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sms", post(send_sms))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn send_sms(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SentMessage>, RelayError> {
    // Malformed JSON is treated like an empty body
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let (to, text) = match (field_text(&request, "to"), field_text(&request, "body")) {
        (Some(to), Some(text)) => (to, text),
        _ => return Err(RelayError::MissingFields),
    };

    let provider = state.provider.as_ref().ok_or(RelayError::NotConfigured)?;
    let sent = provider.send(&to, &text).await?;
    Ok(Json(sent))
}

/// Text of a request field. Strings and numbers are accepted; blank or other
/// values count as missing.
fn field_text(request: &Value, key: &str) -> Option<String> {
    let text = match request.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Records sends; fails when `fail` is set
    #[derive(Default)]
    struct FakeProvider {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl SmsProvider for FakeProvider {
        async fn send(&self, to: &str, body: &str) -> Result<SentMessage, RelayError> {
            if self.fail {
                return Err(RelayError::Provider("carrier rejected message".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(SentMessage {
                id: "SM1".into(),
                status: "queued".into(),
            })
        }
    }

    fn sms_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/sms")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(AppState::new(None));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_send_forwards_to_provider() {
        let provider = Arc::new(FakeProvider::default());
        let app = router(AppState::new(Some(provider.clone() as Arc<dyn SmsProvider>)));

        let response = app
            .oneshot(sms_request(r#"{"to": "+15552223333", "body": "Time for Metformin"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "id": "SM1", "status": "queued" })
        );
        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "Time for Metformin");
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_before_config_check() {
        let app = router(AppState::new(None));

        for body in [
            r#"{"to": "+15552223333"}"#,
            r#"{"to": "", "body": "hi"}"#,
            r#"{"to": null, "body": "hi"}"#,
            "not json",
        ] {
            let response = app.clone().oneshot(sms_request(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                json_body(response).await,
                json!({ "error": "Missing 'to' or 'body'" })
            );
        }
    }

    #[tokio::test]
    async fn test_numeric_recipient_is_forwarded() {
        let provider = Arc::new(FakeProvider::default());
        let app = router(AppState::new(Some(provider.clone() as Arc<dyn SmsProvider>)));

        let response = app
            .oneshot(sms_request(r#"{"to": 15552223333, "body": "Refill Losartan"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent[0].0, "15552223333");
        assert_eq!(sent[0].1, "Refill Losartan");
    }

    #[tokio::test]
    async fn test_not_configured() {
        let app = router(AppState::new(None));
        let response = app
            .oneshot(sms_request(r#"{"to": "+15552223333", "body": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "SMS provider not configured" })
        );
    }

    #[tokio::test]
    async fn test_provider_failure_is_server_error() {
        let provider = Arc::new(FakeProvider {
            fail: true,
            ..Default::default()
        });
        let app = router(AppState::new(Some(provider as Arc<dyn SmsProvider>)));
        let response = app
            .oneshot(sms_request(r#"{"to": "+15552223333", "body": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "carrier rejected message" })
        );
    }
}
