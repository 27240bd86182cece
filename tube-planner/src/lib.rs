//! Tube journey planner.
//!
//! Plans journeys across a rail network by searching a graph whose vertices
//! are (station, line) pairs, and estimates travel times with a kinematic
//! model whose per-line speed multipliers are calibrated against observed
//! trip durations.

pub mod calibrate;
pub mod data;
pub mod domain;
pub mod model;
pub mod network;
pub mod planner;
