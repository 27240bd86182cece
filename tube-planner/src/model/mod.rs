//! Kinematic travel-time model.
//!
//! Travel time between adjacent stations is modelled as an
//! accelerate–cruise–decelerate profile whose effective top speed depends on
//! the hop length, the line, a learned per-line multiplier and a congestion
//! factor around a hub station. Dwell times come from observed averages and
//! transfers are penalised by station size and the new line's headway.

mod config;
mod dwell;
mod error;
mod kinematics;
mod lines;
mod time;

pub use config::ModelConfig;
pub use dwell::{Dwell, DwellRecord, DwellTable};
pub use error::ModelError;
pub use kinematics::run_time;
pub use lines::{LineParameters, LineTable, london_lines};
pub use time::{TimeModel, primitive_time};
