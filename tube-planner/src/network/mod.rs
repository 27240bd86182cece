//! Immutable station/edge model of the rail network.
//!
//! The network is built once from raw station and edge records. Stations
//! without any incident edge are dropped and the survivors are renumbered
//! contiguously. Every edge is stored in both directions with its haversine
//! length precomputed.

mod error;
mod earth;
mod graph;

pub use error::NetworkError;
pub use earth::{EARTH_RADIUS_M, haversine};
pub use graph::{Link, Network, RawEdge, RawStation};
