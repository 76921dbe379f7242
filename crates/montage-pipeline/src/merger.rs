//! Interval merging.
//!
//! Each detection becomes a candidate window `[time - B, time + B]` clamped at
//! zero. Overlapping or touching windows are merged, bounds are rounded to a
//! tenth of a second, and windows that rounding made touch are merged again,
//! so the output is always sorted and strictly disjoint.

use std::cmp::Ordering;

use montage_models::{DetectionEnvelope, DetectionEvent, Interval, IntervalEnvelope};
use tracing::warn;

use crate::logging::StageLogger;

/// Padding applied on both sides of a detection, in seconds.
pub const BUFFER_SECS: f64 = 3.0;

/// Merge detection events into buffered clip intervals.
pub fn merge_intervals(events: &[DetectionEvent], buffer: f64) -> Vec<Interval> {
    let mut times: Vec<f64> = events
        .iter()
        .map(|e| e.time)
        .filter(|t| {
            let usable = t.is_finite() && *t >= 0.0;
            if !usable {
                warn!(time = t, "Ignoring detection with invalid timestamp");
            }
            usable
        })
        .collect();

    if times.is_empty() {
        return Vec::new();
    }

    times.sort_by(f64::total_cmp);

    let candidates: Vec<Interval> = times
        .into_iter()
        .map(|t| Interval::new((t - buffer).max(0.0), t + buffer))
        .collect();

    let rounded: Vec<Interval> = sweep(candidates).iter().map(Interval::rounded).collect();
    merge_spans(&rounded)
}

/// Merge overlapping or touching spans without adding any padding.
///
/// Applied to the output of [`merge_intervals`] this returns it unchanged.
pub fn merge_spans(spans: &[Interval]) -> Vec<Interval> {
    let mut sorted = spans.to_vec();
    sorted.sort_by(|a, b| match a.start.total_cmp(&b.start) {
        Ordering::Equal => a.end.total_cmp(&b.end),
        other => other,
    });
    sweep(sorted)
}

/// Single pass over spans sorted by start.
fn sweep(sorted: Vec<Interval>) -> Vec<Interval> {
    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());

    for span in sorted {
        match merged.last_mut() {
            Some(running) if span.start <= running.end => {
                running.end = running.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }

    merged
}

/// Merger stage: detections in, intervals out.
pub fn merge(input: DetectionEnvelope, buffer: f64) -> IntervalEnvelope {
    let logger = StageLogger::new(input.job_id.as_ref(), "merge");

    let intervals = merge_intervals(&input.detections, buffer);
    logger.log_completion(&format!(
        "{} detections merged into {} intervals",
        input.detections.len(),
        intervals.len()
    ));

    IntervalEnvelope::new(input.source, input.job_id, intervals)
}
