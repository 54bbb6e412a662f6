//! Trace time spans.
//!
//! All trace timestamps are seconds (f64) at this layer; queries against
//! the engine use integer nanoseconds. Bucket boundaries are computed
//! with floor/ceil conversion so that adjacent buckets never leave a
//! nanosecond gap between them.

use serde::{Deserialize, Serialize};

/// A half-open span of trace time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    /// Start of the span, seconds.
    pub start_sec: f64,
    /// End of the span, seconds.
    pub end_sec: f64,
}

impl TimeSpan {
    /// Create a span. `start_sec` must not exceed `end_sec`.
    pub fn new(start_sec: f64, end_sec: f64) -> Self {
        debug_assert!(start_sec <= end_sec);
        TimeSpan { start_sec, end_sec }
    }

    /// Span duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end_sec - self.start_sec
    }

    /// Start of the span in integer nanoseconds, rounded down.
    pub fn start_ns(&self) -> i64 {
        (self.start_sec * 1e9).floor() as i64
    }

    /// End of the span in integer nanoseconds, rounded up.
    pub fn end_ns(&self) -> i64 {
        (self.end_sec * 1e9).ceil() as i64
    }

    /// Split the span into `count` equal-width contiguous buckets.
    ///
    /// Bucket `i` covers `[start + i*w, start + (i+1)*w)` where
    /// `w = duration / count`. The integer nanosecond bounds of each
    /// bucket use floor for the start and ceil for the end so that no
    /// event can fall between two buckets.
    pub fn buckets(&self, count: usize) -> Vec<TimeSpan> {
        let step = self.duration() / count as f64;
        (0..count)
            .map(|i| {
                let start = self.start_sec + i as f64 * step;
                TimeSpan {
                    start_sec: start,
                    end_sec: start + step,
                }
            })
            .collect()
    }
}
