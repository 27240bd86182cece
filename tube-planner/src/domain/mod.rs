//! Domain types for the tube journey planner.
//!
//! This module contains the value types shared by the network, the time
//! model and the planner. Types that carry invariants enforce them at
//! construction time.

mod line;
mod route;
mod station;
mod time;

pub use line::Line;
pub use route::{ExtendedVertex, Route, RouteError};
pub use station::{Station, StationId};
pub use time::{DurationError, format_mmss, humanize, parse_mmss};
