//! Multi-clip crossfade planning and execution.
//!
//! Two clips get a video `xfade` paired with an equal-power `acrossfade`.
//! Three or more clips get a chain of `xfade`s while the audio tracks are
//! simply concatenated. The plan is computed up front from probed clip
//! durations so the branch taken can be inspected without running FFmpeg.

use std::path::{Path, PathBuf};

use montage_models::EncodingConfig;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, MediaRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters;
use crate::fs_utils::copy_file;
use crate::probe::probe_duration;

/// Default crossfade window in seconds.
pub const DEFAULT_TRANSITION_SECS: f64 = 0.5;

/// How the clips are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossfadeStrategy {
    /// One clip, used as-is.
    Single,
    /// Two clips: video xfade and equal-power audio crossfade.
    Pair,
    /// Three or more clips: chained video xfade, concatenated audio.
    Chain,
}

/// Fully computed crossfade plan.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossfadePlan {
    pub strategy: CrossfadeStrategy,
    /// Transition window in seconds
    pub transition: f64,
    /// Start of each transition, measured on the output timeline
    pub offsets: Vec<f64>,
    /// `-filter_complex` graph producing `[v]` and `[a]`, absent for a single clip
    pub filter_graph: Option<String>,
    /// Expected length of the video output
    pub video_duration: f64,
}

impl CrossfadePlan {
    /// Plan a crossfade over clips with the given durations.
    ///
    /// Fails when there are no clips, when the window is not positive, or when
    /// any clip is not longer than the window (the offsets would not advance).
    pub fn new(durations: &[f64], transition: f64) -> MediaResult<Self> {
        if durations.is_empty() {
            return Err(MediaError::invalid_input("No clips to crossfade"));
        }

        if durations.len() == 1 {
            return Ok(Self {
                strategy: CrossfadeStrategy::Single,
                transition,
                offsets: Vec::new(),
                filter_graph: None,
                video_duration: durations[0],
            });
        }

        if transition.is_nan() || transition <= 0.0 {
            return Err(MediaError::invalid_input(format!(
                "Transition must be positive, got {}",
                transition
            )));
        }

        if let Some((idx, d)) = durations
            .iter()
            .enumerate()
            .find(|(_, d)| d.is_nan() || **d <= transition)
        {
            return Err(MediaError::invalid_input(format!(
                "Clip {} is {:.3}s, not longer than the {:.3}s transition",
                idx, d, transition
            )));
        }

        let offsets = transition_offsets(durations, transition);
        let n = durations.len();
        let video_duration = durations.iter().sum::<f64>() - (n - 1) as f64 * transition;

        let (strategy, graph) = if n == 2 {
            (
                CrossfadeStrategy::Pair,
                format!(
                    "[0:v][1:v]{}[v];[0:a][1:a]{}[a]",
                    filters::xfade(transition, offsets[0]),
                    filters::acrossfade_equal_power(transition)
                ),
            )
        } else {
            (CrossfadeStrategy::Chain, chain_graph(&offsets, transition))
        };

        Ok(Self {
            strategy,
            transition,
            offsets,
            filter_graph: Some(graph),
            video_duration,
        })
    }
}

/// Offsets for each transition: transition `k` (1-based) starts at
/// `sum(d_0..d_{k-1}) - k * transition`.
pub fn transition_offsets(durations: &[f64], transition: f64) -> Vec<f64> {
    let mut elapsed = 0.0;
    durations
        .iter()
        .take(durations.len().saturating_sub(1))
        .enumerate()
        .map(|(idx, d)| {
            elapsed += d;
            elapsed - (idx + 1) as f64 * transition
        })
        .collect()
}

fn chain_graph(offsets: &[f64], transition: f64) -> String {
    let n = offsets.len() + 1;
    let mut parts = Vec::with_capacity(n);

    let mut previous = "[0:v]".to_string();
    for (idx, offset) in offsets.iter().enumerate() {
        let next_input = idx + 1;
        let label = if next_input == n - 1 {
            "[v]".to_string()
        } else {
            format!("[v{}]", next_input)
        };
        parts.push(format!(
            "{}[{}:v]{}{}",
            previous,
            next_input,
            filters::xfade(transition, *offset),
            label
        ));
        previous = label;
    }

    let audio_inputs: String = (0..n).map(|i| format!("[{}:a]", i)).collect();
    parts.push(format!("{}{}[a]", audio_inputs, filters::audio_concat(n)));

    parts.join(";")
}

/// Build the FFmpeg command for a multi-clip plan.
pub fn crossfade_command(
    clips: &[PathBuf],
    plan: &CrossfadePlan,
    encoding: &EncodingConfig,
    output: impl AsRef<Path>,
) -> MediaResult<FfmpegCommand> {
    let graph = plan
        .filter_graph
        .as_ref()
        .ok_or_else(|| MediaError::invalid_input("Single clip plan has no filter graph"))?;

    let cmd = clips
        .iter()
        .fold(FfmpegCommand::without_inputs(output), |cmd, clip| cmd.input(clip))
        .filter_complex(graph.clone())
        .map("[v]")
        .map("[a]")
        .output_args(encoding.output_args());

    Ok(cmd)
}

/// Probe every clip, plan the crossfade and render it to `output`.
///
/// A single clip is copied to `output` unchanged.
pub async fn compose_crossfade(
    runner: &dyn MediaRunner,
    clips: &[PathBuf],
    output: impl AsRef<Path>,
    transition: f64,
    encoding: &EncodingConfig,
) -> MediaResult<CrossfadePlan> {
    let output = output.as_ref();

    let mut durations = Vec::with_capacity(clips.len());
    for clip in clips {
        durations.push(probe_duration(runner, clip).await?);
    }
    debug!(?durations, "Probed clip durations");

    let plan = CrossfadePlan::new(&durations, transition)?;

    if plan.strategy == CrossfadeStrategy::Single {
        copy_file(&clips[0], output).await?;
        return Ok(plan);
    }

    info!(
        strategy = ?plan.strategy,
        clips = clips.len(),
        offsets = ?plan.offsets,
        "Rendering crossfade"
    );

    crossfade_command(clips, &plan, encoding, output)?
        .run(runner)
        .await?;

    Ok(plan)
}
