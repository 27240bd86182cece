//! Observed dwell times.

use std::collections::HashMap;

use serde::Deserialize;

use super::error::ModelError;
use crate::domain::Line;

/// One dwell observation: average seconds a train of `line` stands at `station`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DwellRecord {
    pub station: String,
    pub line: String,
    pub seconds: f64,
}

/// Result of a dwell lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dwell {
    /// An observed average, in seconds.
    Recorded(f64),
    /// No observation for this (station, line); treated as zero.
    Missing,
}

impl Dwell {
    /// Dwell in seconds, zero when missing.
    pub fn seconds(self) -> f64 {
        match self {
            Dwell::Recorded(s) => s,
            Dwell::Missing => 0.0,
        }
    }

    /// Returns true if there was no observation.
    pub fn is_missing(self) -> bool {
        matches!(self, Dwell::Missing)
    }
}

/// Average dwell seconds keyed by (station name, line).
#[derive(Debug, Clone, Default)]
pub struct DwellTable {
    by_line: HashMap<Line, HashMap<String, f64>>,
    len: usize,
}

impl DwellTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records, rejecting negative or non-finite values.
    ///
    /// A repeated (station, line) keeps the last record.
    pub fn from_records(
        records: impl IntoIterator<Item = DwellRecord>,
    ) -> Result<Self, ModelError> {
        let mut table = Self::new();
        for record in records {
            table.insert(&record.station, Line::new(&record.line), record.seconds)?;
        }
        Ok(table)
    }

    /// Insert a single observation.
    pub fn insert(&mut self, station: &str, line: Line, seconds: f64) -> Result<(), ModelError> {
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err(ModelError::InvalidDwell {
                station: station.to_string(),
                line,
                seconds,
            });
        }
        let previous = self
            .by_line
            .entry(line)
            .or_default()
            .insert(station.to_string(), seconds);
        if previous.is_none() {
            self.len += 1;
        }
        Ok(())
    }

    /// Look up the dwell of `line` at the named station.
    pub fn get(&self, station: &str, line: &Line) -> Dwell {
        self.by_line
            .get(line)
            .and_then(|stations| stations.get(station))
            .map_or(Dwell::Missing, |s| Dwell::Recorded(*s))
    }

    /// Number of (station, line) observations.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no observations.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
