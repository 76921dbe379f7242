//! Pipeline metrics.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Metric name constants for consistency.
pub mod names {
    pub const FRAMES_SAMPLED_TOTAL: &str = "montage_frames_sampled_total";
    pub const FRAME_DETECT_FAILURES_TOTAL: &str = "montage_frame_detect_failures_total";
    pub const DETECTIONS_TOTAL: &str = "montage_detections_total";
    pub const CLIPS_COMPOSED_TOTAL: &str = "montage_clips_composed_total";
    pub const CLIPS_SKIPPED_TOTAL: &str = "montage_clips_skipped_total";
    pub const COMPOSITION_FALLBACK_TOTAL: &str = "montage_composition_fallback_total";
}

/// Start the Prometheus scrape endpoint on `addr`.
pub fn install_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    Ok(())
}

pub fn record_frames_sampled(count: usize) {
    counter!(names::FRAMES_SAMPLED_TOTAL).increment(count as u64);
}

pub fn record_frame_failure() {
    counter!(names::FRAME_DETECT_FAILURES_TOTAL).increment(1);
}

pub fn record_detections(count: usize) {
    counter!(names::DETECTIONS_TOTAL).increment(count as u64);
}

pub fn record_clip_composed() {
    counter!(names::CLIPS_COMPOSED_TOTAL).increment(1);
}

/// Record a clip dropped at `step` (`narration`, `trim`, `overlay`).
pub fn record_clip_skipped(step: &'static str) {
    counter!(names::CLIPS_SKIPPED_TOTAL, "step" => step).increment(1);
}

/// Record a composition that fell back to concatenation (`copy` or `reencode`).
pub fn record_fallback(mode: &'static str) {
    counter!(names::COMPOSITION_FALLBACK_TOTAL, "mode" => mode).increment(1);
}
