//! Object detection on sampled frames.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::client::{ServiceClient, ServiceClientConfig};
use crate::error::ServiceResult;
use crate::types::{DetectRequest, DetectResponse, DetectedLabel};

/// Labels an image with a detection model.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detect labels in `image` at or above `min_confidence` percent.
    async fn detect(
        &self,
        image: &[u8],
        model_ref: &str,
        min_confidence: f32,
    ) -> ServiceResult<Vec<DetectedLabel>>;
}

/// Detector backed by `POST {base}/detect`.
#[derive(Debug, Clone)]
pub struct HttpDetector {
    client: ServiceClient,
}

impl HttpDetector {
    pub fn new(config: ServiceClientConfig) -> ServiceResult<Self> {
        Ok(Self {
            client: ServiceClient::new(config)?,
        })
    }

    /// Create from `DETECTOR_SERVICE_*` environment variables.
    pub fn from_env() -> ServiceResult<Self> {
        Self::new(ServiceClientConfig::from_env(
            "DETECTOR",
            "http://localhost:8001",
        ))
    }
}

#[async_trait]
impl Detector for HttpDetector {
    async fn detect(
        &self,
        image: &[u8],
        model_ref: &str,
        min_confidence: f32,
    ) -> ServiceResult<Vec<DetectedLabel>> {
        let request = DetectRequest {
            image: STANDARD.encode(image),
            model_ref,
            min_confidence,
        };

        let response: DetectResponse = self.client.post_json("/detect", &request).await?;
        Ok(response.labels)
    }
}
