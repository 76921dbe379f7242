//! Shared HTTP plumbing for the service clients.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};

/// Configuration for one service client.
#[derive(Debug, Clone)]
pub struct ServiceClientConfig {
    /// Base URL of the service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further retry
    pub retry_base_delay: Duration,
}

impl Default for ServiceClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl ServiceClientConfig {
    /// Create config from `{prefix}_SERVICE_URL`, `{prefix}_SERVICE_TIMEOUT`
    /// and `{prefix}_SERVICE_RETRIES`.
    pub fn from_env(prefix: &str, default_url: &str) -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var(format!("{prefix}_SERVICE_URL"))
                .unwrap_or_else(|_| default_url.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: std::env::var(format!("{prefix}_SERVICE_TIMEOUT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: std::env::var(format!("{prefix}_SERVICE_RETRIES"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            retry_base_delay: defaults.retry_base_delay,
        }
    }
}

/// HTTP client with retry on transient failures.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    config: ServiceClientConfig,
}

impl ServiceClient {
    pub fn new(config: ServiceClientConfig) -> ServiceResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ServiceError::Network)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ServiceClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> ServiceResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let bytes = self.post(path, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// POST a JSON body and return the raw response body.
    pub async fn post_bytes<B>(&self, path: &str, body: &B) -> ServiceResult<Vec<u8>>
    where
        B: Serialize + Sync,
    {
        self.post(path, body).await
    }

    async fn post<B>(&self, path: &str, body: &B) -> ServiceResult<Vec<u8>>
    where
        B: Serialize + Sync,
    {
        let url = self.url(path);
        debug!("POST {}", url);

        self.with_retry(|| async {
            let response = self.http.post(&url).json(body).send().await?;
            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(ServiceError::from_status(status, text));
            }
            Ok(response.bytes().await?.to_vec())
        })
        .await
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> ServiceResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ServiceResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_base_delay * 2u32.pow(attempt);
                    warn!(
                        "Service request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
