use pillpal_relay::{router, AppState, RelayConfig, RelayError, SmsProvider, TwilioProvider};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    pillpal_core::logging::init();

    let config = RelayConfig::from_env()?;

    let provider: Option<Arc<dyn SmsProvider>> = match config.credentials.clone() {
        Some(credentials) => Some(Arc::new(TwilioProvider::new(
            config.provider_url.clone(),
            credentials,
        ))),
        None => {
            tracing::warn!("SMS provider credentials missing; /api/sms will report not configured");
            None
        }
    };

    let app = router(AppState::new(provider));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("PillPal SMS relay listening on :{}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}
