//! Per-line physical constants and the learned speed multipliers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::error::ModelError;
use crate::domain::Line;

/// Source of table versions. Versions are unique across all tables, so a
/// memoized value keyed by version can never be served to a different table.
static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

fn unit_multiplier() -> f64 {
    1.0
}

/// Physical profile of one line. Speeds are in m/s, rates in m/s².
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineParameters {
    /// Nominal cruise top speed.
    pub top_speed: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    /// Trains per hour.
    pub frequency: f64,
    /// Average end-to-end operating speed, used by the primitive estimate.
    pub average_speed: f64,
    /// Learned multiplier on the top speed. Only calibration changes it.
    #[serde(default = "unit_multiplier")]
    pub relative_speed: f64,
}

impl LineParameters {
    /// Create parameters from speeds in km/h, with a unit multiplier.
    pub fn from_kmh(
        top_speed_kmh: f64,
        acceleration: f64,
        deceleration: f64,
        frequency: f64,
        average_speed_kmh: f64,
    ) -> Self {
        Self {
            top_speed: top_speed_kmh / 3.6,
            acceleration,
            deceleration,
            frequency,
            average_speed: average_speed_kmh / 3.6,
            relative_speed: 1.0,
        }
    }

    /// Check that every constant is finite and strictly positive.
    pub fn validate(&self, line: &Line) -> Result<(), ModelError> {
        let checks = [
            (self.top_speed, "top speed must be positive"),
            (self.acceleration, "acceleration must be positive"),
            (self.deceleration, "deceleration must be positive"),
            (self.frequency, "frequency must be positive"),
            (self.average_speed, "average speed must be positive"),
            (self.relative_speed, "relative speed must be positive"),
        ];
        for (value, reason) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(ModelError::InvalidParameters {
                    line: line.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

/// The parameters of every line, plus a version stamp.
///
/// The version changes whenever the table is modified. Memoized model
/// outputs are keyed by it, so values computed under old multipliers are
/// unreachable after a change. Mutation needs `&mut`, so no search can
/// observe a half-updated table.
#[derive(Debug, Clone)]
pub struct LineTable {
    lines: BTreeMap<Line, LineParameters>,
    version: u64,
}

impl LineTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            lines: BTreeMap::new(),
            version: next_version(),
        }
    }

    /// Insert or replace the parameters of a line.
    pub fn insert(&mut self, line: Line, params: LineParameters) {
        self.lines.insert(line, params);
        self.version = next_version();
    }

    /// Parameters of a line.
    pub fn get(&self, line: &Line) -> Result<&LineParameters, ModelError> {
        self.lines
            .get(line)
            .ok_or_else(|| ModelError::UnknownLine(line.clone()))
    }

    /// Returns true if the table has parameters for the named line.
    pub fn contains(&self, line: &str) -> bool {
        self.lines.contains_key(line)
    }

    /// Current version stamp.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Lines in name order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.keys()
    }

    /// (line, parameters) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Line, &LineParameters)> {
        self.lines.iter()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Current multiplier of a line.
    pub fn relative_speed(&self, line: &Line) -> Result<f64, ModelError> {
        self.get(line).map(|p| p.relative_speed)
    }

    /// Set the multiplier of a line and bump the version.
    pub fn set_relative_speed(&mut self, line: &Line, value: f64) -> Result<(), ModelError> {
        if !(value.is_finite() && value > 0.0) {
            return Err(ModelError::InvalidParameters {
                line: line.clone(),
                reason: "relative speed must be positive",
            });
        }
        let params = self
            .lines
            .get_mut(line)
            .ok_or_else(|| ModelError::UnknownLine(line.clone()))?;
        params.relative_speed = value;
        self.version = next_version();
        Ok(())
    }

    /// Snapshot of every line's multiplier.
    pub fn relative_speeds(&self) -> Vec<(Line, f64)> {
        self.lines
            .iter()
            .map(|(line, p)| (line.clone(), p.relative_speed))
            .collect()
    }
}

impl Default for LineTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(Line, LineParameters)> for LineTable {
    fn from_iter<I: IntoIterator<Item = (Line, LineParameters)>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
            version: next_version(),
        }
    }
}

/// Default profiles of the London Underground lines.
///
/// Top and average speeds are given in km/h and converted to m/s.
pub fn london_lines() -> LineTable {
    [
        ("Bakerloo", 72.0, 0.95, 1.17, 16.0, 27.04),
        ("Central", 85.0, 1.15, 1.20, 24.0, 37.27),
        ("Circle", 100.0, 1.3, 1.4, 6.0, 23.73),
        ("District", 100.0, 1.3, 1.4, 18.0, 29.19),
        ("Hammersmith & City", 100.0, 1.3, 1.4, 6.0, 25.33),
        ("Jubilee", 100.0, 1.4, 1.2, 24.0, 39.11),
        ("Metropolitan", 100.0, 1.3, 1.4, 12.0, 45.61),
        ("Northern", 72.0, 1.3, 1.4, 20.0, 33.28),
        ("Piccadilly", 72.0, 1.3, 1.4, 21.0, 33.11),
        ("Victoria", 80.0, 1.4, 1.4, 27.0, 40.66),
        ("Waterloo & City", 34.0, 1.3, 1.14, 12.0, 33.3),
    ]
    .into_iter()
    .map(|(name, top, accel, decel, freq, avg)| {
        (
            Line::new(name),
            LineParameters::from_kmh(top, accel, decel, freq, avg),
        )
    })
    .collect()
}
