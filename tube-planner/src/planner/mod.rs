//! Route planning over the line-augmented graph.
//!
//! The physical network is expanded so that every (station, line) pair is a
//! vertex. Riding keeps the line, and changing lines keeps the station, so a
//! single Dijkstra search can weigh stops, distance, time or line changes.

mod config;
mod extended;
mod mode;
mod search;
mod times;

pub use config::SearchConfig;
pub use extended::{EdgeKind, ExtendedEdge, ExtendedGraph};
pub use mode::SearchMode;
pub use search::{RouteFinder, RouteResult, SearchError};
pub use times::{ModelledTimes, PrimitiveTimes, TravelTimes};
