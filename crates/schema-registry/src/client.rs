//! Schema registry HTTP client.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SchemaError};

/// Connection settings for a Confluent-compatible schema registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL, e.g. `http://localhost:8081`
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Timeout for a single schema request
    pub timeout: Duration,
}

impl RegistryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SchemaResponse {
    schema: String,
}

/// Fetches schema definitions by id.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    config: RegistryConfig,
}

impl RegistryClient {
    pub fn new(config: RegistryConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(SchemaError::InvalidConfig(
                "schema registry URL is empty".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SchemaError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Fetch the raw schema definition registered under `id`.
    pub async fn schema_by_id(&self, id: u32) -> Result<String> {
        let url = format!("{}/schemas/ids/{id}", self.config.url.trim_end_matches('/'));
        let mut request = self.http.get(&url);
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|source| SchemaError::Http { id, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SchemaError::Status { id, status });
        }

        let body: SchemaResponse = response
            .json()
            .await
            .map_err(|source| SchemaError::Http { id, source })?;

        debug!("Fetched schema {id} from {url}");
        Ok(body.schema)
    }
}
