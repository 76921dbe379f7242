//! Ledger HTTP client.
//!
//! Records finished videos through the ledger service. Each request runs
//! over a [`LazyConnection`] that is health-checked before reuse, with
//! retries on transient failures and request metrics.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, info_span, Instrument};

use crate::connection::{Connector, LazyConnection};
use crate::error::{LedgerError, LedgerResult};
use crate::metrics::record_request;
use crate::retry::{with_retry, RetryConfig};
use crate::types::{CreateVideoRecord, CreateVideoRecordResponse, RecordReceipt, VideoRecord};

/// Default environment variable holding the ledger API token.
pub const DEFAULT_TOKEN_VAR: &str = "LEDGER_API_TOKEN";

/// Records finished videos.
#[async_trait]
pub trait VideoLedger: Send + Sync {
    async fn create_video_record(&self, record: &VideoRecord) -> LedgerResult<RecordReceipt>;
}

/// Ledger client configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Base URL of the ledger service
    pub base_url: String,
    /// Environment variable read for the API token at connect time
    pub token_var: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl LedgerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_var: DEFAULT_TOKEN_VAR.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }

    /// Create config from environment variables.
    ///
    /// Fails with [`LedgerError::NotConfigured`] when `LEDGER_URL` is unset.
    pub fn from_env() -> LedgerResult<Self> {
        let base_url = std::env::var("LEDGER_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| LedgerError::not_configured("LEDGER_URL is not set"))?;

        let connect_timeout_secs: u64 = std::env::var("LEDGER_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
            ..Self::new(base_url)
        })
    }
}

/// An authenticated session against the ledger service.
#[derive(Debug, Clone)]
pub struct LedgerSession {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl LedgerSession {
    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn ping(&self) -> LedgerResult<()> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .request(self.http.get(&url))
            .send()
            .await
            .map_err(|e| LedgerError::connection_failed(format!("{}: {}", url, e)))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(LedgerError::connection_failed(format!(
                "{} returned {}",
                url,
                response.status()
            )))
        }
    }
}

/// Opens [`LedgerSession`]s.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    http: Client,
    config: LedgerConfig,
}

impl HttpConnector {
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("montage-ledger/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LedgerError::Network)?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl Connector for HttpConnector {
    type Connection = LedgerSession;

    async fn connect(&self) -> LedgerResult<LedgerSession> {
        let session = LedgerSession {
            http: self.http.clone(),
            base_url: self.config.base_url.clone(),
            token: std::env::var(&self.config.token_var)
                .ok()
                .filter(|t| !t.is_empty()),
        };
        session.ping().await?;
        Ok(session)
    }

    async fn is_alive(&self, conn: &LedgerSession) -> bool {
        match conn.ping().await {
            Ok(()) => true,
            Err(e) => {
                debug!("Ledger liveness check failed: {}", e);
                false
            }
        }
    }
}

/// HTTP-backed [`VideoLedger`].
pub struct HttpLedger {
    connection: LazyConnection<HttpConnector>,
    retry: RetryConfig,
}

impl HttpLedger {
    /// Create a client. No connection is opened until the first record.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let retry = config.retry.clone();
        Ok(Self {
            connection: LazyConnection::new(HttpConnector::new(config)?),
            retry,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> LedgerResult<Self> {
        Self::new(LedgerConfig::from_env()?)
    }

    async fn post_record(
        &self,
        session: &LedgerSession,
        body: &CreateVideoRecord<'_>,
    ) -> LedgerResult<RecordReceipt> {
        let url = format!("{}/records", session.base_url);
        let response = session
            .request(session.http.post(&url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let text = response.text().await.unwrap_or_default();
            return Err(LedgerError::from_http_status(
                status.as_u16(),
                format!("{} failed: {}", url, text),
            ));
        }

        let parsed: CreateVideoRecordResponse = response.json().await?;
        parsed
            .into_receipt()
            .ok_or_else(|| LedgerError::InvalidResponse("missing videoId".to_string()))
    }

    async fn create_once(&self, body: &CreateVideoRecord<'_>) -> LedgerResult<RecordReceipt> {
        let session = self.connection.get().await?;
        match self.post_record(&session, body).await {
            Err(LedgerError::Unauthorized(msg)) => {
                debug!("Ledger rejected session ({}), reconnecting once", msg);
                self.connection.invalidate().await;
                let session = self.connection.get().await?;
                self.post_record(&session, body).await
            }
            Err(e @ LedgerError::Network(_)) => {
                self.connection.invalidate().await;
                Err(e)
            }
            other => other,
        }
    }
}

#[async_trait]
impl VideoLedger for HttpLedger {
    async fn create_video_record(&self, record: &VideoRecord) -> LedgerResult<RecordReceipt> {
        let operation = CreateVideoRecord::OPERATION;
        let body = CreateVideoRecord::new(record);
        let span = info_span!("ledger_request", operation = %operation, user = %record.user_email);

        let start = Instant::now();
        let result = with_retry(&self.retry, operation, || self.create_once(&body))
            .instrument(span)
            .await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        if let Ok(receipt) = &result {
            info!(video_id = %receipt.video_id, output_key = %record.output_key, "Recorded video");
        }
        result
    }
}
