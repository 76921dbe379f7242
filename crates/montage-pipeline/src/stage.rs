//! Stage dispatch for the runner binary.

use clap::ValueEnum;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use montage_models::{ComposedEnvelope, DetectionEnvelope, IntervalEnvelope, ValidatedEnvelope};

use crate::composer::compose;
use crate::config::PipelineConfig;
use crate::context::PipelineContext;
use crate::error::{PipelineError, PipelineResult, ValidationError};
use crate::merger::merge;
use crate::sampler::sample_and_detect;
use crate::validator::validate;

/// One pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    /// Check the trigger payload and derive the owner
    Validate,
    /// Sample frames and run detection
    Sample,
    /// Merge detections into clip intervals
    Merge,
    /// Produce, publish and record the montage
    Compose,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Sample => "sample",
            Stage::Merge => "merge",
            Stage::Compose => "compose",
        }
    }

    /// Whether the stage talks to storage, media tools or model services.
    pub fn needs_services(&self) -> bool {
        matches!(self, Stage::Sample | Stage::Compose)
    }
}

/// JSON schema of the envelope `stage` produces.
pub fn output_schema(stage: Stage) -> RootSchema {
    match stage {
        Stage::Validate => schema_for!(ValidatedEnvelope),
        Stage::Sample => schema_for!(DetectionEnvelope),
        Stage::Merge => schema_for!(IntervalEnvelope),
        Stage::Compose => schema_for!(ComposedEnvelope),
    }
}

/// Run `stage` on a JSON envelope and return the output envelope as JSON.
///
/// `ctx` must be present for stages where [`Stage::needs_services`] is true.
pub async fn run_stage(
    stage: Stage,
    payload: Value,
    config: &PipelineConfig,
    ctx: Option<&PipelineContext>,
) -> PipelineResult<Value> {
    match stage {
        Stage::Validate => to_json(&validate(&payload)?),
        Stage::Merge => {
            let input: DetectionEnvelope = parse(stage, payload)?;
            to_json(&merge(input, config.buffer_secs))
        }
        Stage::Sample => {
            let input: ValidatedEnvelope = parse(stage, payload)?;
            to_json(&sample_and_detect(require(stage, ctx)?, input).await?)
        }
        Stage::Compose => {
            let input: IntervalEnvelope = parse(stage, payload)?;
            to_json(&compose(require(stage, ctx)?, input).await?)
        }
    }
}

fn parse<T: DeserializeOwned>(stage: Stage, payload: Value) -> PipelineResult<T> {
    serde_json::from_value(payload).map_err(|e| {
        ValidationError::MalformedEnvelope {
            stage: stage.name(),
            message: e.to_string(),
        }
        .into()
    })
}

fn require(stage: Stage, ctx: Option<&PipelineContext>) -> PipelineResult<&PipelineContext> {
    ctx.ok_or_else(|| PipelineError::fatal(stage.name(), "stage requires service clients"))
}

fn to_json<T: Serialize>(envelope: &T) -> PipelineResult<Value> {
    serde_json::to_value(envelope).map_err(|e| PipelineError::fatal("serialize output envelope", e))
}
