pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::{ChatType, ImageResult, StatsSnapshot};

pub use client::ForgeClient;

/// Body of `POST /generate-images`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub user_prompt: String,
    pub chat_type: ChatType,
}

/// Response of `POST /generate-images`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub images: Vec<ImageResult>,
    /// Echo of the requested chat type; kept as a raw tag
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Value of `openai_api_key` when the backend has no key configured
pub const API_KEY_MISSING: &str = "missing";

/// Body of `GET /health`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// `"present"` or `"missing"`
    #[serde(default)]
    pub openai_api_key: Option<String>,
}

impl HealthStatus {
    /// Why image generation can't work against this backend, if it can't
    pub fn problem(&self) -> Option<String> {
        if self.status != "ok" {
            return Some(format!("backend status is {:?}", self.status));
        }
        if self.openai_api_key.as_deref() == Some(API_KEY_MISSING) {
            return Some("backend has no OpenAI API key; generation will fail".to_string());
        }
        None
    }
}

/// Error body the backend sends with non-2xx statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

/// The three backend endpoints the client talks to
#[async_trait]
pub trait ForgeApi: Send + Sync {
    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus>;

    /// `GET /stats`
    async fn stats(&self) -> Result<StatsSnapshot>;

    /// `POST /generate-images`
    async fn generate_images(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}

/// Startup readiness check. Returns whether the backend looks usable; the
/// outcome is only logged.
pub async fn check_health(api: &dyn ForgeApi) -> bool {
    match api.health().await {
        Ok(health) => match health.problem() {
            None => {
                tracing::info!(timestamp = ?health.timestamp, "FORGE backend is healthy");
                true
            }
            Some(problem) => {
                tracing::warn!(%problem, "FORGE backend is not ready");
                false
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "FORGE backend health check failed");
            false
        }
    }
}
