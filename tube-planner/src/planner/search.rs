//! Dijkstra search over the extended graph.
//!
//! Finds the cheapest route between two stations for a given
//! [`SearchMode`], where the route may ride any line and change lines at
//! shared stations. A forced-line variant restricts the search to a single
//! line, which is what calibration compares observed journeys against.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::domain::{ExtendedVertex, Line, Route, RouteError, StationId};
use crate::model::ModelError;
use crate::network::Network;

use super::config::SearchConfig;
use super::extended::{EdgeKind, ExtendedEdge, ExtendedGraph};
use super::mode::SearchMode;
use super::times::TravelTimes;

/// Error from route search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// Search mode name not recognised
    #[error("invalid search mode: {0}")]
    InvalidMode(String),

    /// The time source failed to evaluate an edge
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Search settled more vertices than allowed
    #[error("search abandoned after settling {limit} vertices")]
    IterationLimit { limit: usize },

    /// A weight function returned a negative or undefined weight
    #[error("edge weight must be non-negative, got {weight}")]
    InvalidWeight { weight: f64 },

    /// Rebuilt path is not a valid route
    #[error("rebuilt path is not a route: {0}")]
    Route(#[from] RouteError),
}

/// Outcome of a route search.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// The cheapest route, or `None` if the stations are unknown or
    /// disconnected.
    pub route: Option<Route>,

    /// Total weight of the route in the units of the search mode.
    /// Infinite when no route was found.
    pub weight: f64,

    /// Number of vertices settled during the search.
    pub settled: usize,
}

impl RouteResult {
    /// The result for an unknown or unreachable pair.
    pub fn not_found() -> Self {
        Self {
            route: None,
            weight: f64::INFINITY,
            settled: 0,
        }
    }

    /// Returns true if a route was found.
    pub fn is_found(&self) -> bool {
        self.route.is_some()
    }

    /// One-line directions, or "No route found".
    pub fn journey_summary(&self, network: &Network) -> String {
        match &self.route {
            Some(route) => route.journey_summary(network.as_lookup()),
            None => "No route found".to_string(),
        }
    }
}

/// Route finder over a fixed network.
///
/// The extended graph is built once in [`new`](Self::new) and shared by
/// every search; weights are evaluated per mode as edges are relaxed.
#[derive(Debug, Clone)]
pub struct RouteFinder<'a> {
    network: &'a Network,
    graph: ExtendedGraph,
    config: SearchConfig,
}

impl<'a> RouteFinder<'a> {
    pub fn new(network: &'a Network, config: SearchConfig) -> Self {
        let graph = ExtendedGraph::build(network);
        debug!(
            vertices = graph.len(),
            edges = graph.edge_count(),
            "Built extended graph"
        );
        Self {
            network,
            graph,
            config,
        }
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    pub fn graph(&self) -> &ExtendedGraph {
        &self.graph
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Find the cheapest route from `start` to `end` under `mode`.
    ///
    /// The search starts from every line serving `start` at zero cost and
    /// ends at the first settled vertex of `end`. `times` supplies ride and
    /// transfer times in time mode, and the transfer penalty in distance
    /// mode.
    pub fn find_route(
        &self,
        start: StationId,
        end: StationId,
        mode: SearchMode,
        times: &dyn TravelTimes,
    ) -> Result<RouteResult, SearchError> {
        if !self.network.contains(start) || !self.network.contains(end) {
            return Ok(RouteResult::not_found());
        }

        let sources: Vec<usize> = self.graph.vertices_at(start).collect();
        let result = self.dijkstra(&sources, end, |from, edge| {
            if let Some(weight) = mode.fixed_weight(edge.kind) {
                return Ok(Some(weight));
            }
            let (a, b) = (self.graph.vertex(from), self.graph.vertex(edge.to));
            let weight = match (mode, edge.kind) {
                (SearchMode::Distance, EdgeKind::Ride) => edge.distance,
                (_, EdgeKind::Ride) => times.ride_time(a.station, b.station, &a.line)?,
                (_, EdgeKind::Transfer) => times.transfer_time(a.station, &a.line, &b.line)?,
            };
            Ok(Some(weight))
        })?;

        debug!(
            %mode,
            from = self.network.name(start).unwrap_or_default(),
            to = self.network.name(end).unwrap_or_default(),
            found = result.is_found(),
            weight = result.weight,
            settled = result.settled,
            "Route search complete"
        );
        Ok(result)
    }

    /// Like [`find_route`](Self::find_route), with stations given by name.
    ///
    /// A name that does not resolve gives [`RouteResult::not_found`].
    pub fn find_route_by_name(
        &self,
        start: &str,
        end: &str,
        mode: SearchMode,
        times: &dyn TravelTimes,
    ) -> Result<RouteResult, SearchError> {
        match (self.network.resolve(start), self.network.resolve(end)) {
            (Ok(start), Ok(end)) => self.find_route(start, end, mode, times),
            (Err(e), _) | (_, Err(e)) => {
                debug!(error = %e, "Route endpoint not found");
                Ok(RouteResult::not_found())
            }
        }
    }

    /// Fewest-stops route from `start` to `end` that stays on `line`.
    ///
    /// Not found if `line` does not serve `start`, or does not reach `end`.
    pub fn find_forced_route(
        &self,
        start: StationId,
        end: StationId,
        line: &Line,
    ) -> Result<RouteResult, SearchError> {
        let Some(source) = self.graph.ordinal(start, line) else {
            return Ok(RouteResult::not_found());
        };
        if !self.network.contains(end) {
            return Ok(RouteResult::not_found());
        }

        // Ride edges keep the line, so starting on it is enough.
        self.dijkstra(&[source], end, |_, edge| {
            Ok((edge.kind == EdgeKind::Ride).then_some(1.0))
        })
    }

    /// Multi-source Dijkstra with lazy deletion.
    ///
    /// `weight` returns `None` for an edge that must not be traversed.
    fn dijkstra<F>(
        &self,
        sources: &[usize],
        end: StationId,
        mut weight: F,
    ) -> Result<RouteResult, SearchError>
    where
        F: FnMut(usize, &ExtendedEdge) -> Result<Option<f64>, SearchError>,
    {
        let mut best = vec![f64::INFINITY; self.graph.len()];
        let mut prev: Vec<Option<usize>> = vec![None; self.graph.len()];
        let mut queue = BinaryHeap::new();
        let mut settled = 0;

        for &source in sources {
            best[source] = 0.0;
            queue.push(Reverse((OrderedFloat(0.0), source)));
        }

        while let Some(Reverse((OrderedFloat(dist), current))) = queue.pop() {
            if dist > best[current] {
                continue;
            }
            settled += 1;
            if settled > self.config.max_settled {
                return Err(SearchError::IterationLimit {
                    limit: self.config.max_settled,
                });
            }

            if self.graph.vertex(current).station == end {
                let route = Route::new(self.path_to(current, &prev))?;
                return Ok(RouteResult {
                    route: Some(route),
                    weight: dist,
                    settled,
                });
            }

            for edge in self.graph.edges_from(current) {
                let Some(w) = weight(current, edge)? else {
                    continue;
                };
                if w.is_nan() || w < 0.0 {
                    return Err(SearchError::InvalidWeight { weight: w });
                }
                let candidate = dist + w;
                if candidate < best[edge.to] {
                    trace!(from = current, to = edge.to, candidate, "Relaxed edge");
                    best[edge.to] = candidate;
                    prev[edge.to] = Some(current);
                    queue.push(Reverse((OrderedFloat(candidate), edge.to)));
                }
            }
        }

        Ok(RouteResult {
            settled,
            ..RouteResult::not_found()
        })
    }

    /// Follow predecessor links back from `target` to a source.
    fn path_to(&self, target: usize, prev: &[Option<usize>]) -> Vec<ExtendedVertex> {
        let mut ordinals = vec![target];
        let mut current = target;
        while let Some(p) = prev[current] {
            ordinals.push(p);
            current = p;
        }
        ordinals
            .into_iter()
            .rev()
            .map(|o| self.graph.vertex(o).clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
