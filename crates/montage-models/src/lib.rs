//! Shared data models for the highlight montage pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Stage envelopes exchanged between pipeline stages
//! - Detection events produced by the frame sampler
//! - Clip intervals produced by the merger
//! - Clip results produced by the composer
//! - Encoding settings for re-encoding passes

pub mod clip;
pub mod detection;
pub mod encoding;
pub mod envelope;
pub mod interval;
pub mod job;

// Re-export common types
pub use clip::ClipResult;
pub use detection::DetectionEvent;
pub use encoding::EncodingConfig;
pub use envelope::{
    ComposedEnvelope, DetectionEnvelope, IntervalEnvelope, SourceRef, ValidatedEnvelope,
};
pub use interval::Interval;
pub use job::JobId;
