//! Clients for the model services used by the montage pipeline.
//!
//! Each service sits behind a trait so the pipeline can be driven by fakes:
//! - [`Detector`]: labels sampled frames
//! - [`TextGenerator`]: writes clip commentary
//! - [`SpeechSynthesizer`]: narrates commentary
//!
//! The HTTP implementations share [`ServiceClient`], which retries transient
//! failures (network errors, 5xx, 429) with exponential backoff.

pub mod client;
pub mod detector;
pub mod error;
pub mod speech;
pub mod text;
pub mod types;

pub use client::{ServiceClient, ServiceClientConfig};
pub use detector::{Detector, HttpDetector};
pub use error::{ServiceError, ServiceResult};
pub use speech::{HttpSpeechSynthesizer, SpeechSynthesizer, DEFAULT_VOICE};
pub use text::{HttpTextGenerator, TextGenerator};
pub use types::{AudioFormat, DetectedLabel};
