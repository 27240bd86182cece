//! The station graph.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use super::earth::haversine;
use super::error::NetworkError;
use crate::domain::{Line, Station, StationId};

/// A station record as supplied by the data source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawStation {
    /// Source id, not necessarily contiguous.
    pub id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// An undirected edge record as supplied by the data source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEdge {
    pub from: u32,
    pub to: u32,
    pub line: String,
    /// Display colour for map rendering; not used by the planner.
    #[serde(default)]
    pub colour: Option<String>,
}

/// One directed adjacency entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// Neighbouring station.
    pub to: StationId,
    /// Line serving the hop.
    pub line: Line,
    /// Great-circle length in meters.
    pub distance: f64,
}

/// Immutable station/edge model.
#[derive(Debug, Clone)]
pub struct Network {
    stations: Vec<Station>,
    adjacency: Vec<Vec<Link>>,
    by_name: HashMap<String, StationId>,
}

impl Network {
    /// Build the network from raw records.
    ///
    /// Stations with no incident edge are discarded and the remaining ones are
    /// numbered in input order. Fails if an edge names an undeclared station
    /// or two stations share a source id.
    pub fn build(stations: Vec<RawStation>, edges: &[RawEdge]) -> Result<Self, NetworkError> {
        let mut raw_index: HashMap<u32, usize> = HashMap::with_capacity(stations.len());
        for (idx, station) in stations.iter().enumerate() {
            if raw_index.insert(station.id, idx).is_some() {
                return Err(NetworkError::DuplicateStationId(station.id));
            }
        }

        let mut incident = vec![0usize; stations.len()];
        let mut resolved_edges = Vec::with_capacity(edges.len());
        for edge in edges {
            let from = *raw_index
                .get(&edge.from)
                .ok_or(NetworkError::UnknownStationId(edge.from))?;
            let to = *raw_index
                .get(&edge.to)
                .ok_or(NetworkError::UnknownStationId(edge.to))?;
            incident[from] += 1;
            incident[to] += 1;
            resolved_edges.push((from, to, Line::new(&edge.line)));
        }

        // Renumber surviving stations contiguously
        let total = stations.len();
        let mut remap: Vec<Option<StationId>> = vec![None; total];
        let mut kept = Vec::new();
        for (idx, raw) in stations.into_iter().enumerate() {
            if incident[idx] == 0 {
                continue;
            }
            let id = StationId(kept.len());
            remap[idx] = Some(id);
            kept.push(Station::new(id, raw.name, raw.latitude, raw.longitude));
        }

        let mut network = Self {
            adjacency: vec![Vec::new(); kept.len()],
            by_name: HashMap::with_capacity(kept.len()),
            stations: kept,
        };

        for station in &network.stations {
            network.by_name.insert(station.name.clone(), station.id);
        }

        for (from, to, line) in resolved_edges {
            // Both endpoints have an incident edge, so both were kept
            let (Some(a), Some(b)) = (remap[from], remap[to]) else {
                continue;
            };
            let distance = network.distance(a, b);
            network.adjacency[a.0].push(Link {
                to: b,
                line: line.clone(),
                distance,
            });
            network.adjacency[b.0].push(Link {
                to: a,
                line,
                distance,
            });
        }

        debug!(
            stations = network.stations.len(),
            dropped = total - network.stations.len(),
            edges = edges.len(),
            "Built network"
        );

        Ok(network)
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns true if the network has no stations.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Returns true if `id` names a station of this network.
    pub fn contains(&self, id: StationId) -> bool {
        id.0 < self.stations.len()
    }

    /// All stations, indexed by id.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Look up a station by id.
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.0)
    }

    /// Station ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = StationId> + '_ {
        (0..self.stations.len()).map(StationId)
    }

    /// Directed adjacency entries leaving `station`.
    pub fn neighbors(&self, station: StationId) -> &[Link] {
        self.adjacency
            .get(station.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of directed adjacency entries at `station`.
    pub fn degree(&self, station: StationId) -> usize {
        self.neighbors(station).len()
    }

    /// Distinct lines serving `station`, sorted by name.
    pub fn lines_at(&self, station: StationId) -> Vec<Line> {
        let mut lines: Vec<Line> = self
            .neighbors(station)
            .iter()
            .map(|link| link.line.clone())
            .collect();
        lines.sort();
        lines.dedup();
        lines
    }

    /// Great-circle distance in meters between any two stations.
    ///
    /// The pair is evaluated in id order, so `distance(a, b)` and
    /// `distance(b, a)` are bit-for-bit equal.
    ///
    /// # Panics
    ///
    /// Panics if either id is not part of this network.
    pub fn distance(&self, a: StationId, b: StationId) -> f64 {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        let (sa, sb) = (&self.stations[a.0], &self.stations[b.0]);
        haversine(sa.point(), sb.point())
    }

    /// Resolve a station name to its id.
    ///
    /// Surrounding whitespace is ignored. An exact match wins; otherwise the
    /// first case-insensitive match in id order is returned.
    pub fn resolve(&self, name: &str) -> Result<StationId, NetworkError> {
        let name = name.trim();
        if let Some(id) = self.by_name.get(name) {
            return Ok(*id);
        }

        let wanted = name.to_lowercase();
        self.stations
            .iter()
            .find(|s| s.name.to_lowercase() == wanted)
            .map(|s| s.id)
            .ok_or_else(|| NetworkError::StationNotFound(name.to_string()))
    }

    /// Station display name.
    pub fn name(&self, id: StationId) -> Option<&str> {
        self.station(id).map(|s| s.name.as_str())
    }

    /// All station names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stations.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Create a closure suitable for [`Route::journey_summary`](crate::domain::Route::journey_summary).
    pub fn as_lookup<'a>(&'a self) -> impl Fn(StationId) -> Option<&'a str> + 'a {
        move |id| self.name(id)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn stations(coords: &[(f64, f64)]) -> Vec<RawStation> {
        coords
            .iter()
            .enumerate()
            .map(|(i, (lat, lon))| RawStation {
                id: i as u32,
                name: format!("S{i}"),
                latitude: *lat,
                longitude: *lon,
            })
            .collect()
    }

    proptest! {
        /// distance(a, b) == distance(b, a) exactly, and distance(a, a) == 0
        #[test]
        fn distance_symmetry(coords in prop::collection::vec((51.3f64..51.7, -0.5f64..0.3), 2..8)) {
            let n = coords.len() as u32;
            let edges: Vec<RawEdge> = (1..n)
                .map(|i| RawEdge { from: i - 1, to: i, line: "X".into(), colour: None })
                .collect();
            let network = Network::build(stations(&coords), &edges).unwrap();
            for a in network.ids() {
                prop_assert_eq!(network.distance(a, a), 0.0);
                for b in network.ids() {
                    prop_assert_eq!(network.distance(a, b), network.distance(b, a));
                }
            }
        }
    }
}
