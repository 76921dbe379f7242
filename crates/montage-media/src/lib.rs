//! FFmpeg CLI wrapper for highlight extraction and montage composition.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building behind the [`MediaRunner`] seam
//! - Stream probing and fixed-rate frame sampling
//! - Per-clip trimming and narration overlay
//! - Crossfade planning with a concat-demuxer fallback
//! - Background music mixing

pub mod clip;
pub mod command;
pub mod concat;
pub mod error;
pub mod filters;
pub mod frames;
pub mod fs_utils;
pub mod music;
pub mod probe;
pub mod transition;

pub use clip::{overlay_narration, trim_stream_copy};
pub use command::{
    check_ffmpeg, check_ffprobe, FfmpegCommand, Invocation, MediaRunner, ProcessRunner, Tool,
    ToolOutput,
};
pub use concat::{concat_clips, ConcatMode};
pub use error::{MediaError, MediaResult};
pub use frames::{list_frames, sample_frames};
pub use fs_utils::{copy_file, remove_file_quietly, remove_files_quietly};
pub use music::{mix_background_music, MixDuration, DEFAULT_MUSIC_VOLUME};
pub use probe::{probe_duration, probe_stream, StreamInfo};
pub use transition::{
    compose_crossfade, CrossfadePlan, CrossfadeStrategy, DEFAULT_TRANSITION_SECS,
};
