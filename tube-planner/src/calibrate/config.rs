//! Calibration configuration.

use super::error::CalibrationError;

/// Search interval and stopping tolerance for the per-line multipliers.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationConfig {
    /// Lowest multiplier considered.
    pub lower: f64,

    /// Highest multiplier considered.
    pub upper: f64,

    /// The search stops once the interval is narrower than this.
    pub tolerance: f64,
}

impl CalibrationConfig {
    pub fn new(lower: f64, upper: f64, tolerance: f64) -> Self {
        Self {
            lower,
            upper,
            tolerance,
        }
    }

    /// Check that the interval is well formed and the tolerance positive.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !(self.lower.is_finite() && self.lower >= 0.0) {
            return Err(CalibrationError::InvalidConfig(
                "lower bound must be finite and non-negative",
            ));
        }
        if !(self.upper.is_finite() && self.upper > self.lower) {
            return Err(CalibrationError::InvalidConfig(
                "upper bound must be finite and above the lower bound",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(CalibrationError::InvalidConfig(
                "tolerance must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 3.0,
            tolerance: 1e-3,
        }
    }
}
