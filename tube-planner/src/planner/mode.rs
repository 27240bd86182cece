//! Search modes.

use std::fmt;
use std::str::FromStr;

use super::extended::EdgeKind;
use super::search::SearchError;

/// The metric a search minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Number of station-to-station hops.
    Stops,
    /// Meters travelled, plus the transfer penalty at each change.
    Distance,
    /// Seconds, from the supplied travel-time source.
    Time,
    /// Number of line changes.
    Transfers,
}

impl SearchMode {
    /// All modes, in display order.
    pub const ALL: [SearchMode; 4] = [
        SearchMode::Stops,
        SearchMode::Distance,
        SearchMode::Time,
        SearchMode::Transfers,
    ];

    /// Returns the mode name as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Stops => "stops",
            SearchMode::Distance => "distance",
            SearchMode::Time => "time",
            SearchMode::Transfers => "transfers",
        }
    }

    /// Fixed weight of an edge kind in this mode, or `None` if the weight
    /// comes from the distance or the travel-time source.
    pub fn fixed_weight(self, kind: EdgeKind) -> Option<f64> {
        match (self, kind) {
            (SearchMode::Stops, EdgeKind::Ride) => Some(1.0),
            (SearchMode::Stops, EdgeKind::Transfer) => Some(0.0),
            (SearchMode::Transfers, EdgeKind::Ride) => Some(0.0),
            (SearchMode::Transfers, EdgeKind::Transfer) => Some(1.0),
            (SearchMode::Distance | SearchMode::Time, _) => None,
        }
    }
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stops" => Ok(SearchMode::Stops),
            "distance" => Ok(SearchMode::Distance),
            "time" => Ok(SearchMode::Time),
            "transfers" => Ok(SearchMode::Transfers),
            _ => Err(SearchError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
