//! FFmpeg filter expressions used by montage composition.

use crate::command::format_seconds;

/// Transition name passed to `xfade`.
pub const XFADE_TRANSITION: &str = "fade";

/// Audio curve for an equal-power crossfade.
pub const EQUAL_POWER_CURVE: &str = "qsin";

/// Video crossfade starting at `offset` seconds into the first input.
pub fn xfade(duration: f64, offset: f64) -> String {
    format!(
        "xfade=transition={}:duration={}:offset={}",
        XFADE_TRANSITION,
        format_seconds(duration),
        format_seconds(offset)
    )
}

/// Equal-power audio crossfade over `duration` seconds.
pub fn acrossfade_equal_power(duration: f64) -> String {
    format!(
        "acrossfade=d={}:c1={}:c2={}",
        format_seconds(duration),
        EQUAL_POWER_CURVE,
        EQUAL_POWER_CURVE
    )
}

/// Audio-only concatenation of `inputs` streams.
pub fn audio_concat(inputs: usize) -> String {
    format!("concat=n={}:v=0:a=1", inputs)
}

/// Background bed: input 1 attenuated to `volume`, mixed under input 0.
pub fn music_bed(volume: f64, duration_mode: &str) -> String {
    format!(
        "[1:a]volume={}[bg];[0:a][bg]amix=inputs=2:duration={}[a]",
        volume, duration_mode
    )
}
