//! Commentary text generation.

use async_trait::async_trait;

use crate::client::{ServiceClient, ServiceClientConfig};
use crate::error::ServiceResult;
use crate::types::{GenerateRequest, GenerateResponse};

/// Generates text from a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> ServiceResult<String>;
}

/// Text generator backed by `POST {base}/generate`.
#[derive(Debug, Clone)]
pub struct HttpTextGenerator {
    client: ServiceClient,
}

impl HttpTextGenerator {
    pub fn new(config: ServiceClientConfig) -> ServiceResult<Self> {
        Ok(Self {
            client: ServiceClient::new(config)?,
        })
    }

    /// Create from `TEXT_SERVICE_*` environment variables.
    pub fn from_env() -> ServiceResult<Self> {
        Self::new(ServiceClientConfig::from_env("TEXT", "http://localhost:8002"))
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> ServiceResult<String> {
        let request = GenerateRequest {
            prompt,
            max_tokens,
            temperature,
        };

        let response: GenerateResponse = self.client.post_json("/generate", &request).await?;
        Ok(response.text)
    }
}
