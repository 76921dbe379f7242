//! Stage envelopes.
//!
//! Every stage consumes the previous stage's envelope and returns a new one.
//! All envelopes flatten a [`SourceRef`] so the storage coordinates and owning
//! identity travel unchanged from the validator to the composer. Field names
//! are camelCase on the wire; unknown fields from upstream stages are ignored.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ClipResult, DetectionEvent, Interval, JobId};

/// Storage coordinates of the source video plus its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub bucket: String,
    pub video_key: String,
    /// Owning identity, derived from the first segment of `video_key`.
    pub email: String,
}

impl SourceRef {
    pub fn new(
        bucket: impl Into<String>,
        video_key: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            video_key: video_key.into(),
            email: email.into(),
        }
    }

    /// Last path segment of the video key (`user@x.com/run/game.mp4` -> `game.mp4`).
    pub fn file_name(&self) -> &str {
        self.video_key.rsplit('/').next().unwrap_or(&self.video_key)
    }

    /// File name without its extension (`game.mp4` -> `game`).
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }
}

/// Output of the input validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedEnvelope {
    #[serde(flatten)]
    pub source: SourceRef,
    pub detector_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

/// Output of the frame sampler and detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectionEnvelope {
    #[serde(flatten)]
    pub source: SourceRef,
    /// Empty when the upstream sampler did not echo it.
    #[serde(default, alias = "modelArn", skip_serializing_if = "String::is_empty")]
    pub detector_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    /// Detections in arrival (frame) order.
    #[serde(default, alias = "killTimestamps")]
    pub detections: Vec<DetectionEvent>,
    #[serde(default)]
    pub total_detections: usize,
}

impl DetectionEnvelope {
    pub fn new(input: ValidatedEnvelope, detections: Vec<DetectionEvent>) -> Self {
        Self {
            source: input.source,
            detector_ref: input.detector_ref,
            job_id: input.job_id,
            total_detections: detections.len(),
            detections,
        }
    }
}

/// Output of the interval merger. Detections are not carried forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntervalEnvelope {
    #[serde(flatten)]
    pub source: SourceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub intervals: Vec<Interval>,
    #[serde(default)]
    pub total_intervals: usize,
}

impl IntervalEnvelope {
    pub fn new(source: SourceRef, job_id: Option<JobId>, intervals: Vec<Interval>) -> Self {
        Self {
            source,
            job_id,
            total_intervals: intervals.len(),
            intervals,
        }
    }
}

/// Output of the clip composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComposedEnvelope {
    #[serde(flatten)]
    pub source: SourceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub clips: Vec<ClipResult>,
    #[serde(default)]
    pub total_clips: usize,
    /// Storage key of the published montage, absent when nothing was published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub montage_key: Option<String>,
}

impl ComposedEnvelope {
    /// Envelope for a run with nothing to highlight.
    pub fn empty(source: SourceRef, job_id: Option<JobId>) -> Self {
        Self {
            source,
            job_id,
            clips: Vec::new(),
            total_clips: 0,
            montage_key: None,
        }
    }

    /// Envelope for a published montage; every clip is annotated with its key.
    pub fn published(
        source: SourceRef,
        job_id: Option<JobId>,
        mut clips: Vec<ClipResult>,
        montage_key: String,
    ) -> Self {
        for clip in &mut clips {
            clip.montage_key = Some(montage_key.clone());
        }
        Self {
            source,
            job_id,
            total_clips: clips.len(),
            clips,
            montage_key: Some(montage_key),
        }
    }
}
