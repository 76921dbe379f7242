//! Joining finished clips into one composite.

use std::path::{Path, PathBuf};

use montage_media::{compose_crossfade, concat_clips, remove_file_quietly, ConcatMode, CrossfadeStrategy};

use crate::context::PipelineContext;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::StageLogger;
use crate::metrics;

/// How the composite was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyMethod {
    /// A single clip, copied unchanged.
    Single,
    /// Crossfaded; `offsets` are the transition start times.
    Crossfade {
        strategy: CrossfadeStrategy,
        offsets: Vec<f64>,
    },
    /// Concat demuxer with stream copy.
    ConcatCopy,
    /// Concat demuxer with re-encoding.
    ConcatReencode,
}

/// Crossfade `clips` into `output`, falling back to plain concatenation.
///
/// Returns a [`PipelineError::Composition`] only when every way of joining
/// the clips failed.
pub async fn assemble(
    ctx: &PipelineContext,
    clips: &[PathBuf],
    output: &Path,
    logger: &StageLogger,
) -> PipelineResult<AssemblyMethod> {
    let runner = ctx.media.as_ref();
    let encoding = &ctx.config.encoding;

    let crossfade_err =
        match compose_crossfade(runner, clips, output, ctx.config.transition_secs, encoding).await
        {
            Ok(plan) if plan.strategy == CrossfadeStrategy::Single => {
                return Ok(AssemblyMethod::Single)
            }
            Ok(plan) => {
                return Ok(AssemblyMethod::Crossfade {
                    strategy: plan.strategy,
                    offsets: plan.offsets,
                })
            }
            Err(e) => PipelineError::composition(format!(
                "crossfade of {} clips failed: {}",
                clips.len(),
                e
            )),
        };

    logger.log_warning(&format!("{}; falling back to concatenation", crossfade_err));
    remove_file_quietly(output).await;

    let copy_err = match concat_clips(runner, clips, output, ConcatMode::StreamCopy, encoding).await {
        Ok(()) => {
            metrics::record_fallback("copy");
            return Ok(AssemblyMethod::ConcatCopy);
        }
        Err(e) => e,
    };

    logger.log_warning(&format!("stream copy concat failed, re-encoding: {}", copy_err));
    remove_file_quietly(output).await;

    match concat_clips(runner, clips, output, ConcatMode::Reencode, encoding).await {
        Ok(()) => {
            metrics::record_fallback("reencode");
            Ok(AssemblyMethod::ConcatReencode)
        }
        Err(e) => {
            remove_file_quietly(output).await;
            Err(PipelineError::composition(format!(
                "{}; stream copy concat: {}; re-encoded concat: {}",
                crossfade_err, copy_err, e
            )))
        }
    }
}
