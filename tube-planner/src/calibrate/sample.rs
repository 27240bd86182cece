//! Observed journey durations.

use chrono::Duration;

use crate::domain::{Line, humanize};

/// One observed single-line journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSample {
    /// The line the journey was made on.
    pub line: Line,
    /// Boarding station name.
    pub start: String,
    /// Alighting station name.
    pub end: String,
    /// Observed journey duration.
    pub observed: Duration,
}

impl TrainingSample {
    pub fn new(
        line: impl Into<Line>,
        start: impl Into<String>,
        end: impl Into<String>,
        observed: Duration,
    ) -> Self {
        Self {
            line: line.into(),
            start: start.into(),
            end: end.into(),
            observed,
        }
    }

    /// Observed duration in (fractional) seconds.
    pub fn observed_seconds(&self) -> f64 {
        self.observed.num_milliseconds() as f64 / 1000.0
    }

    /// "Bank to Moorgate on Northern (2 minutes, 5 seconds)".
    pub fn describe(&self) -> String {
        format!(
            "{} to {} on {} ({})",
            self.start,
            self.end,
            self.line,
            humanize(self.observed_seconds())
        )
    }
}
