//! Clip intervals produced by the merger.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A candidate highlight region `[start, end)` in source-video seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the interval in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `other` lies entirely inside this interval (closed bounds).
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Both bounds rounded to one decimal place.
    pub fn rounded(&self) -> Self {
        Self {
            start: round_tenth(self.start),
            end: round_tenth(self.end),
        }
    }
}

/// Round a value in seconds to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
