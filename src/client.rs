//! HTTP client for the forecast service.
//!
//! Endpoints:
//! - `GET /api/events?resolved=false`
//! - `GET /api/events/{id}/forecasts?hours=N`
//! - `GET /api/consensus/{id}`

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ViewError;
use crate::types::{ConsensusRecord, Event, EventForecasts, EventId, Observation};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },
    #[error("URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ApiError> for ViewError {
    fn from(err: ApiError) -> Self {
        ViewError::NetworkFailure(err.to_string())
    }
}

/// The three reads the view issues against the forecast service.
#[async_trait]
pub trait ForecastApi: Send + Sync {
    /// Unresolved events, in the order the service lists them.
    async fn list_active_events(&self) -> Result<Vec<Event>, ViewError>;

    /// Observations for one event from the last `hours` hours.
    async fn event_forecasts(
        &self,
        event_id: EventId,
        hours: u32,
    ) -> Result<Vec<Observation>, ViewError>;

    async fn consensus(&self, event_id: EventId) -> Result<ConsensusRecord, ViewError>;
}

pub struct HttpForecastClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpForecastClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ViewError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ViewError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        log::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, message });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ForecastApi for HttpForecastClient {
    async fn list_active_events(&self) -> Result<Vec<Event>, ViewError> {
        let mut url = self.endpoint("/api/events")?;
        url.query_pairs_mut().append_pair("resolved", "false");
        Ok(self.get_json(url).await?)
    }

    async fn event_forecasts(
        &self,
        event_id: EventId,
        hours: u32,
    ) -> Result<Vec<Observation>, ViewError> {
        let mut url = self.endpoint(&format!("/api/events/{}/forecasts", event_id))?;
        url.query_pairs_mut()
            .append_pair("hours", &hours.to_string());
        let body: EventForecasts = self.get_json(url).await?;
        Ok(body.forecasts)
    }

    async fn consensus(&self, event_id: EventId) -> Result<ConsensusRecord, ViewError> {
        let url = self.endpoint(&format!("/api/consensus/{}", event_id))?;
        Ok(self.get_json(url).await?)
    }
}
