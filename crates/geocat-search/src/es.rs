use std::time::Duration;

use async_trait::async_trait;
use geocat_core::error::{CatalogError, Result};
use serde_json::Value;

use crate::ports::SearchBackend;

/// Connection settings for the Elasticsearch HTTP adapter.
#[derive(Debug, Clone)]
pub struct EsConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EsConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9200".to_string(),
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

/// Elasticsearch adapter. Holds a shared connection pool via `reqwest`;
/// retries, if any, are the caller's responsibility.
#[derive(Debug, Clone)]
pub struct EsBackend {
    http: reqwest::Client,
    config: EsConfig,
}

impl EsBackend {
    pub fn new(config: EsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::backend(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    fn search_url(&self, index: &str) -> String {
        format!("{}/{}/_search", self.config.url.trim_end_matches('/'), index)
    }
}

#[async_trait]
impl SearchBackend for EsBackend {
    async fn search(&self, index: &str, body: &Value) -> Result<Value> {
        let url = self.search_url(index);
        let mut request = self.http.post(&url).json(body);
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::backend(format!("search request to {url} failed: {e}")))?;

        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|e| CatalogError::backend(format!("failed to read search response: {e}")))?;

        if !status.is_success() {
            // Surface the backend's own message for diagnosability.
            tracing::warn!(%status, index, "search backend returned an error");
            return Err(CatalogError::backend(format!(
                "search against {index} failed with {status}: {payload}"
            )));
        }

        serde_json::from_str(&payload)
            .map_err(|e| CatalogError::invalid_response(format!("response is not JSON: {e}")))
    }
}
