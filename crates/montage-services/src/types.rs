//! Request and response types for the service APIs.

use serde::{Deserialize, Serialize};

/// One label returned by the detection service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLabel {
    /// Class name
    #[serde(alias = "name")]
    pub label: String,
    /// Confidence in percent (0-100)
    pub confidence: f32,
}

impl DetectedLabel {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DetectRequest<'a> {
    /// Base64 encoded image bytes
    pub image: String,
    pub model_ref: &'a str,
    pub min_confidence: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetectResponse {
    #[serde(default)]
    pub labels: Vec<DetectedLabel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest<'a> {
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub text: String,
}

/// Output encoding of synthesized speech.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Ogg,
    Pcm,
}

impl AudioFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Pcm => "pcm",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SynthesizeRequest<'a> {
    pub text: &'a str,
    pub voice: &'a str,
    pub format: AudioFormat,
}
