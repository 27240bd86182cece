//! Fitting the per-line speed multipliers to observed journeys.

mod calibrator;
mod config;
mod error;
mod sample;

pub use calibrator::{CalibrationReport, Calibrator, LineAdjustment};
pub use config::CalibrationConfig;
pub use error::CalibrationError;
pub use sample::TrainingSample;
