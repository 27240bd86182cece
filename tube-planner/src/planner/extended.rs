//! The line-augmented search graph.
//!
//! Every (station, line) pair served by the network becomes a vertex,
//! identified by a dense ordinal. Ride edges follow the physical edges on the
//! same line; transfer edges join the vertices of one station pairwise.
//! Edge weights are not stored: they depend on the search mode and are
//! evaluated during relaxation.

use std::collections::HashMap;
use std::ops::Range;

use crate::domain::{ExtendedVertex, Line, StationId};
use crate::network::Network;

/// Kind of an extended edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Same line, adjacent stations.
    Ride,
    /// Same station, different lines.
    Transfer,
}

/// A directed edge between vertex ordinals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtendedEdge {
    /// Target vertex ordinal.
    pub to: usize,
    pub kind: EdgeKind,
    /// Physical length in meters; zero for transfers.
    pub distance: f64,
}

/// Arena of extended vertices with their outgoing edges.
#[derive(Debug, Clone)]
pub struct ExtendedGraph {
    vertices: Vec<ExtendedVertex>,
    edges: Vec<Vec<ExtendedEdge>>,
    /// Ordinal range of each station's vertices, indexed by station id.
    by_station: Vec<Range<usize>>,
    index: HashMap<ExtendedVertex, usize>,
}

impl ExtendedGraph {
    /// Materialize the extended graph of a network.
    ///
    /// Ordinals are assigned station by station in id order, and within a
    /// station in line-name order.
    pub fn build(network: &Network) -> Self {
        let mut vertices = Vec::new();
        let mut by_station = Vec::with_capacity(network.len());
        let mut index = HashMap::new();

        for station in network.ids() {
            let start = vertices.len();
            for line in network.lines_at(station) {
                let vertex = ExtendedVertex::new(station, line);
                index.insert(vertex.clone(), vertices.len());
                vertices.push(vertex);
            }
            by_station.push(start..vertices.len());
        }

        let mut graph = Self {
            edges: vec![Vec::new(); vertices.len()],
            vertices,
            by_station,
            index,
        };

        for station in network.ids() {
            for link in network.neighbors(station) {
                let from = graph.ordinal(station, &link.line);
                let to = graph.ordinal(link.to, &link.line);
                if let (Some(from), Some(to)) = (from, to) {
                    graph.edges[from].push(ExtendedEdge {
                        to,
                        kind: EdgeKind::Ride,
                        distance: link.distance,
                    });
                }
            }

            let range = graph.by_station[station.0].clone();
            for from in range.clone() {
                for to in range.clone() {
                    if from != to {
                        graph.edges[from].push(ExtendedEdge {
                            to,
                            kind: EdgeKind::Transfer,
                            distance: 0.0,
                        });
                    }
                }
            }
        }

        graph
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// The vertex with the given ordinal.
    ///
    /// # Panics
    ///
    /// Panics if the ordinal is out of range.
    pub fn vertex(&self, ordinal: usize) -> &ExtendedVertex {
        &self.vertices[ordinal]
    }

    /// Ordinal of the (station, line) vertex, if the line serves the station.
    pub fn ordinal(&self, station: StationId, line: &Line) -> Option<usize> {
        self.index
            .get(&ExtendedVertex::new(station, line.clone()))
            .copied()
    }

    /// Ordinals of every vertex at `station`.
    pub fn vertices_at(&self, station: StationId) -> Range<usize> {
        self.by_station.get(station.0).cloned().unwrap_or(0..0)
    }

    /// Outgoing edges of a vertex.
    pub fn edges_from(&self, ordinal: usize) -> &[ExtendedEdge] {
        self.edges.get(ordinal).map(Vec::as_slice).unwrap_or(&[])
    }
}
