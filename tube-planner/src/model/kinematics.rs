//! Closed-form accelerate–cruise–decelerate run times.

use super::error::ModelError;
use crate::domain::Line;

/// Time in seconds to run `distance` meters from standstill to standstill.
///
/// The train accelerates at `acceleration` towards `top_speed`, cruises, and
/// brakes at `deceleration`. If the hop is too short to reach top speed, the
/// distance is split between the two phases so that both end at the same
/// peak velocity. Fails with [`ModelError::Inconsistency`] if the cruise
/// distance comes out negative or undefined; the value is never clamped.
pub fn run_time(
    line: &Line,
    distance: f64,
    top_speed: f64,
    acceleration: f64,
    deceleration: f64,
) -> Result<f64, ModelError> {
    if distance == 0.0 {
        return Ok(0.0);
    }
    if !(top_speed.is_finite() && top_speed > 0.0) {
        return Err(ModelError::InvalidParameters {
            line: line.clone(),
            reason: "effective top speed must be positive",
        });
    }

    let accel_time = top_speed / acceleration;
    let decel_time = top_speed / deceleration;
    let accel_dist = accel_time * (top_speed / 2.0);
    let decel_dist = decel_time * (top_speed / 2.0);
    let distance_if_momentary_top_speed = accel_dist + decel_dist;

    if distance_if_momentary_top_speed > distance {
        // Braking distance is inversely proportional to the rate, so the
        // accelerating share of the hop is decel / (accel + decel).
        let total_rate = acceleration + deceleration;
        let accel_dist = distance * deceleration / total_rate;
        let decel_dist = distance * acceleration / total_rate;
        let peak = (2.0 * accel_dist * acceleration).sqrt();
        return Ok(accel_dist / (peak / 2.0) + decel_dist / (peak / 2.0));
    }

    let remaining = distance - distance_if_momentary_top_speed;
    if !(remaining >= 0.0) {
        return Err(ModelError::Inconsistency {
            line: line.clone(),
            distance,
            remaining,
        });
    }
    Ok(accel_time + decel_time + remaining / top_speed)
}
