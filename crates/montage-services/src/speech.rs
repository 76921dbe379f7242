//! Narration speech synthesis.

use async_trait::async_trait;

use crate::client::{ServiceClient, ServiceClientConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::types::{AudioFormat, SynthesizeRequest};

/// Default narration voice.
pub const DEFAULT_VOICE: &str = "Stephen";

/// Turns text into spoken audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        format: AudioFormat,
    ) -> ServiceResult<Vec<u8>>;
}

/// Synthesizer backed by `POST {base}/synthesize`, which answers with the
/// encoded audio as the response body.
#[derive(Debug, Clone)]
pub struct HttpSpeechSynthesizer {
    client: ServiceClient,
}

impl HttpSpeechSynthesizer {
    pub fn new(config: ServiceClientConfig) -> ServiceResult<Self> {
        Ok(Self {
            client: ServiceClient::new(config)?,
        })
    }

    /// Create from `SPEECH_SERVICE_*` environment variables.
    pub fn from_env() -> ServiceResult<Self> {
        Self::new(ServiceClientConfig::from_env(
            "SPEECH",
            "http://localhost:8003",
        ))
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        format: AudioFormat,
    ) -> ServiceResult<Vec<u8>> {
        let request = SynthesizeRequest {
            text,
            voice,
            format,
        };

        let audio = self.client.post_bytes("/synthesize", &request).await?;
        if audio.is_empty() {
            return Err(ServiceError::InvalidResponse(
                "Speech service returned no audio".to_string(),
            ));
        }
        Ok(audio)
    }
}
