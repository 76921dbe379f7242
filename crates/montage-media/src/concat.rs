//! Concat-demuxer joining, used when crossfading is not possible.

use std::path::{Path, PathBuf};

use montage_models::EncodingConfig;
use tracing::debug;

use crate::command::{FfmpegCommand, MediaRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::remove_file_quietly;

/// How the concat demuxer output is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatMode {
    /// Stream copy, no re-encoding.
    StreamCopy,
    /// Re-encode with the configured codecs.
    Reencode,
}

/// Render a concat demuxer manifest listing `clips` in order.
pub fn concat_manifest(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|clip| {
            let escaped = clip.to_string_lossy().replace('\'', r"'\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}

/// Build the concat command reading `manifest`.
pub fn concat_command(
    manifest: impl AsRef<Path>,
    output: impl AsRef<Path>,
    mode: ConcatMode,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    let cmd = FfmpegCommand::without_inputs(output)
        .input(manifest)
        .input_arg("-f")
        .input_arg("concat")
        .input_arg("-safe")
        .input_arg("0");

    match mode {
        ConcatMode::StreamCopy => cmd.codec_copy(),
        ConcatMode::Reencode => cmd.output_args(encoding.output_args()),
    }
}

/// Concatenate `clips` in order into `output`.
///
/// The manifest is written beside `output` and removed afterwards.
pub async fn concat_clips(
    runner: &dyn MediaRunner,
    clips: &[PathBuf],
    output: impl AsRef<Path>,
    mode: ConcatMode,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    if clips.is_empty() {
        return Err(MediaError::invalid_input("No clips to concatenate"));
    }

    let output = output.as_ref();
    let manifest = output.with_extension("concat.txt");
    tokio::fs::write(&manifest, concat_manifest(clips)).await?;

    debug!(clips = clips.len(), ?mode, "Concatenating clips");
    let result = concat_command(&manifest, output, mode, encoding)
        .run(runner)
        .await
        .map(|_| ());

    remove_file_quietly(&manifest).await;
    result
}
