//! Great-circle distances.

use geo::{Distance, HaversineMeasure, Point};

/// Mean Earth radius used for all distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two `(longitude, latitude)` points
/// given in degrees.
pub fn haversine(from: Point<f64>, to: Point<f64>) -> f64 {
    HaversineMeasure::new(EARTH_RADIUS_M).distance(from, to)
}
