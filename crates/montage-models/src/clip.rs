//! Composer clip results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Interval;

/// A clip that survived every per-interval processing step.
///
/// `clip_number` is the 1-based position of the source interval, assigned
/// before failed intervals are filtered out, so numbering can have gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClipResult {
    pub clip_number: u32,
    pub start: f64,
    pub end: f64,
    pub commentary: String,
    /// Storage key of the published montage containing this clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub montage_key: Option<String>,
}

impl ClipResult {
    pub fn new(clip_number: u32, interval: Interval, commentary: impl Into<String>) -> Self {
        Self {
            clip_number,
            start: interval.start,
            end: interval.end,
            commentary: commentary.into(),
            montage_key: None,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}
