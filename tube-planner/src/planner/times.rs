//! Travel-time sources for time-weighted search.

use crate::domain::{Line, StationId};
use crate::model::{self, LineTable, ModelError, TimeModel};
use crate::network::Network;

/// Supplies edge weights, in seconds, for [`SearchMode::Time`](super::SearchMode::Time)
/// and the transfer penalty of distance search.
pub trait TravelTimes {
    /// Time to ride `line` from `from` to the adjacent station `to`.
    fn ride_time(&self, from: StationId, to: StationId, line: &Line) -> Result<f64, ModelError>;

    /// Time to change from `from` to `to` at `station`.
    fn transfer_time(&self, station: StationId, from: &Line, to: &Line)
    -> Result<f64, ModelError>;
}

/// Uncalibrated estimate: each hop at the line's average speed, and a flat
/// interchange penalty.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveTimes<'a> {
    network: &'a Network,
    lines: &'a LineTable,
    transfer_secs: f64,
}

impl<'a> PrimitiveTimes<'a> {
    pub fn new(network: &'a Network, lines: &'a LineTable, transfer_secs: f64) -> Self {
        Self {
            network,
            lines,
            transfer_secs,
        }
    }
}

impl TravelTimes for PrimitiveTimes<'_> {
    fn ride_time(&self, from: StationId, to: StationId, line: &Line) -> Result<f64, ModelError> {
        model::primitive_time(self.network, from, to, line, self.lines)
    }

    fn transfer_time(&self, _: StationId, _: &Line, _: &Line) -> Result<f64, ModelError> {
        Ok(self.transfer_secs)
    }
}

/// The kinematic model evaluated against a particular line table.
#[derive(Clone, Copy)]
pub struct ModelledTimes<'m, 'a> {
    model: &'m TimeModel<'a>,
    lines: &'m LineTable,
}

impl<'m, 'a> ModelledTimes<'m, 'a> {
    pub fn new(model: &'m TimeModel<'a>, lines: &'m LineTable) -> Self {
        Self { model, lines }
    }
}

impl TravelTimes for ModelledTimes<'_, '_> {
    fn ride_time(&self, from: StationId, to: StationId, line: &Line) -> Result<f64, ModelError> {
        self.model.edge_time(from, to, line, self.lines)
    }

    fn transfer_time(
        &self,
        station: StationId,
        from: &Line,
        to: &Line,
    ) -> Result<f64, ModelError> {
        self.model.transfer_time(station, from, to, self.lines)
    }
}
