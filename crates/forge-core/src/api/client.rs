use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::{ErrorBody, ForgeApi, GenerateRequest, GenerateResponse, HealthStatus};
use crate::config::Config;
use crate::error::{ForgeError, Result};
use crate::state::StatsSnapshot;

#[derive(Clone)]
pub struct ForgeClient {
    client: Client,
    base_url: String,
}

impl ForgeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForgeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(config.base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %text, "FORGE API error body");
            return Err(error_for_status(status.as_u16(), &text));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Map a non-2xx response to an error, keeping FastAPI's `detail` when present
fn error_for_status(status: u16, body: &str) -> ForgeError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { detail: serde_json::Value::String(detail) }) => {
            ForgeError::Api { status, detail }
        }
        Ok(ErrorBody { detail }) if !detail.is_null() => ForgeError::Api {
            status,
            detail: detail.to_string(),
        },
        _ => ForgeError::Status(status),
    }
}

#[async_trait]
impl ForgeApi for ForgeClient {
    async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn stats(&self) -> Result<StatsSnapshot> {
        let url = format!("{}/stats", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn generate_images(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/generate-images", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await?;

        Self::decode(response).await
    }
}
