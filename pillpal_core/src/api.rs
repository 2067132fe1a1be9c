//! Client for the persistence API.
//!
//! [`MedicineApi`] is the seam the store talks through. [`HttpMedicineApi`]
//! implements it over HTTP/JSON; every response body is parsed into the strict
//! record types before it reaches the rest of the crate.

use crate::config::ApiConfig;
use crate::{
    Error, IntakePayload, IntakeRecord, Medicine, MedicinePayload, RecordId, Result, Schedule,
    SchedulePayload,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Operations the client needs from the persistence API
#[async_trait]
pub trait MedicineApi: Send + Sync {
    /// `GET /medicines/`, schedules embedded
    async fn list_medicines(&self) -> Result<Vec<Medicine>>;

    /// `POST /medicines/`
    async fn create_medicine(&self, payload: &MedicinePayload) -> Result<Medicine>;

    /// `POST /schedules/`
    async fn create_schedule(&self, payload: &SchedulePayload) -> Result<Schedule>;

    /// `DELETE /medicines/{id}/`
    async fn delete_medicine(&self, id: &RecordId) -> Result<()>;

    /// `GET /intakes/`
    async fn list_intakes(&self) -> Result<Vec<IntakeRecord>>;

    /// `POST /intakes/`
    async fn create_intake(&self, payload: &IntakePayload) -> Result<IntakeRecord>;
}

/// HTTP implementation of [`MedicineApi`]
#[derive(Clone, Debug)]
pub struct HttpMedicineApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpMedicineApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    /// Build a client from config, failing with `NotConfigured` when no base URL is set
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let base_url = config.require_base_url()?;
        Ok(Self::new(base_url, config.token.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Token {}", token)),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        decode(path, response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.request(Method::POST, path).json(body).send().await?;
        decode(path, response).await
    }
}

/// Reject non-success statuses, then parse the body strictly
async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Decode(format!("{}: {}", path, e)))
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!("API returned {}: {}", status, body);
    Err(Error::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl MedicineApi for HttpMedicineApi {
    async fn list_medicines(&self) -> Result<Vec<Medicine>> {
        let medicines: Vec<Medicine> = self.get_json("medicines/").await?;
        tracing::debug!("Fetched {} medicines", medicines.len());
        Ok(medicines)
    }

    async fn create_medicine(&self, payload: &MedicinePayload) -> Result<Medicine> {
        self.post_json("medicines/", payload).await
    }

    async fn create_schedule(&self, payload: &SchedulePayload) -> Result<Schedule> {
        self.post_json("schedules/", payload).await
    }

    async fn delete_medicine(&self, id: &RecordId) -> Result<()> {
        let path = format!("medicines/{}/", id);
        let response = self.request(Method::DELETE, &path).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn list_intakes(&self) -> Result<Vec<IntakeRecord>> {
        self.get_json("intakes/").await
    }

    async fn create_intake(&self, payload: &IntakePayload) -> Result<IntakeRecord> {
        self.post_json("intakes/", payload).await
    }
}
