//! Thin reqwest client for the remote analysis service.
//!
//! One method per endpoint, passthrough JSON, no caching or retries. The
//! non-2xx error body is expected to carry `{ "message": ... }`, which is
//! surfaced verbatim as the user-facing error text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::audit::domain::{AnalysisResult, CombinedResult, TransactionRecord};
use crate::audit::orchestrator::{AnalysisBackend, AnalysisError};
use crate::config::ApiConfig;
use crate::monitor::MetricsSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    transactions: &'a [TransactionRecord],
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    results: Vec<AnalysisResult>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client bound to one base address, e.g. `http://localhost:8087/api`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST the full batch to `/analyze` and decode the result list.
    pub async fn analyze(
        &self,
        records: &[TransactionRecord],
    ) -> Result<Vec<AnalysisResult>, ClientError> {
        let url = format!("{}/analyze", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&AnalyzeRequest {
                transactions: records,
            })
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let response = check_status(response, "Failed to analyze transactions").await?;
        let body: AnalyzeResponse = decode(response, &url).await?;
        Ok(body.results)
    }

    /// Every stored transaction with its analysis, newest first.
    pub async fn transactions(&self) -> Result<Vec<CombinedResult>, ClientError> {
        let url = format!("{}/transactions", self.base_url);
        let response = self.get(&url, "Failed to fetch transactions").await?;
        decode(response, &url).await
    }

    pub async fn transaction(&self, id: &str) -> Result<CombinedResult, ClientError> {
        let url = format!("{}/transactions/{id}", self.base_url);
        let response = self.get(&url, "Failed to fetch transaction").await?;
        decode(response, &url).await
    }

    /// Liveness probe; the payload is passed through untouched.
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.get(&url, "Health check failed").await?;
        decode(response, &url).await
    }

    /// System-level metrics snapshot for the monitoring view.
    pub async fn system_metrics(&self) -> Result<MetricsSnapshot, ClientError> {
        let url = format!("{}/metrics", self.base_url);
        let response = self.get(&url, "Failed to get system metrics").await?;
        decode(response, &url).await
    }

    async fn get(&self, url: &str, fallback: &str) -> Result<reqwest::Response, ClientError> {
        let response =
            self.http
                .get(url)
                .send()
                .await
                .map_err(|source| ClientError::Transport {
                    url: url.to_string(),
                    source,
                })?;
        check_status(response, fallback).await
    }
}

async fn check_status(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| fallback.to_string());

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T>(response: reqwest::Response, url: &str) -> Result<T, ClientError>
where
    T: serde::de::DeserializeOwned,
{
    response
        .json::<T>()
        .await
        .map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
}

#[async_trait]
impl AnalysisBackend for ApiClient {
    async fn analyze(
        &self,
        records: &[TransactionRecord],
    ) -> Result<Vec<AnalysisResult>, AnalysisError> {
        ApiClient::analyze(self, records)
            .await
            .map_err(AnalysisError::from)
    }
}

impl From<ClientError> for AnalysisError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Transport { url, source } => {
                AnalysisError::Transport(format!("{url}: {source}"))
            }
            ClientError::Api { message, .. } => AnalysisError::Rejected { message },
            ClientError::Decode { url, source } => {
                AnalysisError::Decode(format!("{url}: {source}"))
            }
        }
    }
}
