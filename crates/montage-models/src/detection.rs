//! Detection events emitted by the frame sampler.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A sentinel-class detection at a point in the source video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionEvent {
    /// Seconds from the start of the source video (non-negative).
    pub time: f64,
    /// Detector confidence, 0 to 100.
    pub confidence: f64,
}

impl DetectionEvent {
    pub fn new(time: f64, confidence: f64) -> Self {
        Self { time, confidence }
    }
}
