//! Highlight montage pipeline.
//!
//! This crate provides the four pipeline stages:
//! - [`validator`]: trigger payload checks and owner derivation
//! - [`sampler`]: 1 fps frame sampling and detection
//! - [`merger`]: detections to buffered, disjoint clip intervals
//! - [`composer`]: narrated clips, crossfade assembly, music, publication
//!
//! plus the configuration, error taxonomy, logging and metrics they share,
//! and the dispatch used by the `montage-stage` binary.

pub mod composer;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod merger;
pub mod metrics;
pub mod sampler;
pub mod scratch;
pub mod stage;
pub mod validator;

pub use composer::compose;
pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use error::{ErrorKind, PipelineError, PipelineResult, ValidationError};
pub use logging::StageLogger;
pub use merger::{merge, merge_intervals, merge_spans, BUFFER_SECS};
pub use sampler::sample_and_detect;
pub use stage::{output_schema, run_stage, Stage};
pub use validator::validate;
