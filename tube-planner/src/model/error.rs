//! Time model error types.

use crate::domain::Line;
use crate::network::NetworkError;

/// Errors from the travel-time model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// The kinematic solver produced a negative or undefined cruise distance.
    /// Indicates malformed physical constants or corrupted input data.
    #[error(
        "model inconsistency on {line} line: remaining distance {remaining} m for a {distance} m hop"
    )]
    Inconsistency {
        line: Line,
        distance: f64,
        remaining: f64,
    },

    /// The line has no parameters in the line table
    #[error("no parameters for line {0}")]
    UnknownLine(Line),

    /// A physical constant is out of range
    #[error("invalid parameters for {line} line: {reason}")]
    InvalidParameters { line: Line, reason: &'static str },

    /// A dwell record is negative or not a number
    #[error("invalid dwell time {seconds} s for {station} on {line} line")]
    InvalidDwell {
        station: String,
        line: Line,
        seconds: f64,
    },

    /// The configured congestion hub is not in the network
    #[error("congestion hub: {0}")]
    HubNotFound(#[from] NetworkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::Inconsistency {
            line: Line::new("Victoria"),
            distance: 100.0,
            remaining: -3.5,
        };
        assert_eq!(
            err.to_string(),
            "model inconsistency on Victoria line: remaining distance -3.5 m for a 100 m hop"
        );

        let err = ModelError::UnknownLine(Line::new("Elizabeth"));
        assert_eq!(err.to_string(), "no parameters for line Elizabeth");

        let err = ModelError::InvalidParameters {
            line: Line::new("Central"),
            reason: "acceleration must be positive",
        };
        assert_eq!(
            err.to_string(),
            "invalid parameters for Central line: acceleration must be positive"
        );

        let err = ModelError::HubNotFound(NetworkError::StationNotFound("Waterloo".into()));
        assert_eq!(err.to_string(), "congestion hub: station not found: Waterloo");
    }
}
