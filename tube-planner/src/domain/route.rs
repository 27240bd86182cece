//! Routes through the line-augmented search graph.
//!
//! A [`Route`] is the vertex sequence produced by the planner. Each vertex is a
//! (station, line) pair: consecutive vertices either share a line and ride to
//! an adjacent station, or share a station and transfer between lines.

use super::{Line, StationId};

/// Placeholder used when a station id has no name in the lookup.
const UNKNOWN_STATION: &str = "?";

/// A (station, line) pair: the unit of traversal in the search graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtendedVertex {
    /// The physical station.
    pub station: StationId,
    /// The line the traveller is on at this station.
    pub line: Line,
}

impl ExtendedVertex {
    /// Create a new vertex.
    pub fn new(station: StationId, line: Line) -> Self {
        Self { station, line }
    }
}

/// Error returned when constructing an invalid route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A route must contain at least one vertex.
    #[error("route must have at least one vertex")]
    Empty,

    /// Consecutive vertices change both station and line at once.
    #[error("vertices {0} and {1} are neither a ride nor a transfer")]
    Disconnected(usize, usize),
}

/// An ordered sequence of extended vertices from origin to destination.
///
/// Invariant: non-empty, and every consecutive pair either keeps the line
/// (a ride) or keeps the station (a transfer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    vertices: Vec<ExtendedVertex>,
}

impl Route {
    /// Create a route, validating the ride/transfer invariant.
    pub fn new(vertices: Vec<ExtendedVertex>) -> Result<Self, RouteError> {
        if vertices.is_empty() {
            return Err(RouteError::Empty);
        }
        for (i, pair) in vertices.windows(2).enumerate() {
            let (a, b) = (&pair[0], &pair[1]);
            let ride = a.line == b.line && a.station != b.station;
            let transfer = a.station == b.station && a.line != b.line;
            if !ride && !transfer {
                return Err(RouteError::Disconnected(i, i + 1));
            }
        }
        Ok(Self { vertices })
    }

    /// Returns the vertices in travel order.
    pub fn vertices(&self) -> &[ExtendedVertex] {
        &self.vertices
    }

    /// Returns the number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false: routes are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the first vertex.
    pub fn first(&self) -> &ExtendedVertex {
        &self.vertices[0]
    }

    /// Returns the last vertex.
    pub fn last(&self) -> &ExtendedVertex {
        &self.vertices[self.vertices.len() - 1]
    }

    /// Returns the origin station.
    pub fn origin(&self) -> StationId {
        self.first().station
    }

    /// Returns the destination station.
    pub fn destination(&self) -> StationId {
        self.last().station
    }

    /// Number of line changes along the route.
    pub fn transfer_count(&self) -> usize {
        self.vertices
            .windows(2)
            .filter(|pair| pair[0].line != pair[1].line)
            .count()
    }

    /// Number of station-to-station hops.
    pub fn hop_count(&self) -> usize {
        self.vertices
            .windows(2)
            .filter(|pair| pair[0].station != pair[1].station)
            .count()
    }

    /// Stations visited, with transfers collapsed.
    pub fn stations(&self) -> Vec<StationId> {
        let mut stations: Vec<StationId> = self.vertices.iter().map(|v| v.station).collect();
        stations.dedup();
        stations
    }

    /// Lines used, in boarding order, one entry per leg.
    pub fn lines(&self) -> Vec<&Line> {
        let mut lines: Vec<&Line> = self.vertices.iter().map(|v| &v.line).collect();
        lines.dedup();
        lines
    }

    /// One-line summary: "Start at A on X line -> Transfer to Y line at C -> Arrive at D".
    ///
    /// `name` maps station ids to display names.
    pub fn journey_summary<'n>(&self, name: impl Fn(StationId) -> Option<&'n str>) -> String {
        let name = |id| name(id).unwrap_or(UNKNOWN_STATION);
        let last = self.vertices.len() - 1;
        let mut parts = Vec::new();

        for (i, vertex) in self.vertices.iter().enumerate() {
            if i == 0 {
                parts.push(format!(
                    "Start at {} on {} line",
                    name(vertex.station),
                    vertex.line
                ));
            } else if self.vertices[i - 1].line != vertex.line {
                parts.push(format!(
                    "Transfer to {} line at {}",
                    vertex.line,
                    name(self.vertices[i - 1].station)
                ));
            } else if i == last {
                parts.push(format!("Arrive at {}", name(vertex.station)));
            }
        }

        parts.join(" -> ")
    }

    /// Step-by-step directions, one instruction per line of text.
    pub fn describe<'n>(&self, name: impl Fn(StationId) -> Option<&'n str>) -> String {
        let name = |id| name(id).unwrap_or(UNKNOWN_STATION);
        let last = self.vertices.len() - 1;
        let mut steps = Vec::with_capacity(self.vertices.len());

        for (i, vertex) in self.vertices.iter().enumerate() {
            if i == 0 {
                steps.push(format!(
                    "Start at {} on {} line",
                    name(vertex.station),
                    vertex.line
                ));
            } else if self.vertices[i - 1].line != vertex.line {
                steps.push(format!(
                    "Transfer to {} line at {}",
                    vertex.line,
                    name(self.vertices[i - 1].station)
                ));
            } else if i == last {
                steps.push(format!("Arrive at {}", name(vertex.station)));
            } else {
                steps.push(format!("Continue to {}", name(vertex.station)));
            }
        }

        steps.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(station: usize, line: &str) -> ExtendedVertex {
        ExtendedVertex::new(StationId(station), Line::new(line))
    }

    fn names(id: StationId) -> Option<&'static str> {
        ["Alpha", "Bravo", "Charlie", "Delta"].get(id.0).copied()
    }

    fn sample_route() -> Route {
        Route::new(vec![
            v(0, "X"),
            v(1, "X"),
            v(2, "X"),
            v(2, "Y"),
            v(3, "Y"),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Route::new(vec![]), Err(RouteError::Empty));
    }

    #[test]
    fn rejects_disconnected_steps() {
        let err = Route::new(vec![v(0, "X"), v(1, "Y")]).unwrap_err();
        assert_eq!(err, RouteError::Disconnected(0, 1));

        // Staying put on the same line is not a step either
        assert!(Route::new(vec![v(0, "X"), v(0, "X")]).is_err());
    }

    #[test]
    fn accessors() {
        let route = sample_route();
        assert_eq!(route.len(), 5);
        assert!(!route.is_empty());
        assert_eq!(route.origin(), StationId(0));
        assert_eq!(route.destination(), StationId(3));
        assert_eq!(route.transfer_count(), 1);
        assert_eq!(route.hop_count(), 3);
        assert_eq!(
            route.stations(),
            vec![StationId(0), StationId(1), StationId(2), StationId(3)]
        );
        assert_eq!(route.lines(), vec![&Line::new("X"), &Line::new("Y")]);
    }

    #[test]
    fn lines_repeat_when_reboarded() {
        let route = Route::new(vec![
            v(0, "X"),
            v(1, "X"),
            v(1, "Y"),
            v(2, "Y"),
            v(2, "X"),
            v(3, "X"),
        ])
        .unwrap();
        assert_eq!(
            route.lines(),
            vec![&Line::new("X"), &Line::new("Y"), &Line::new("X")]
        );
        assert_eq!(route.transfer_count(), 2);
    }

    #[test]
    fn journey_summary_format() {
        let route = sample_route();
        assert_eq!(
            route.journey_summary(names),
            "Start at Alpha on X line -> Transfer to Y line at Charlie -> Arrive at Delta"
        );
    }

    #[test]
    fn journey_summary_is_deterministic() {
        let route = sample_route();
        let rebuilt = Route::new(route.vertices().to_vec()).unwrap();
        assert_eq!(route.journey_summary(names), rebuilt.journey_summary(names));
    }

    #[test]
    fn single_vertex_summary() {
        let route = Route::new(vec![v(1, "X")]).unwrap();
        assert_eq!(route.journey_summary(names), "Start at Bravo on X line");
        assert_eq!(route.hop_count(), 0);
    }

    #[test]
    fn unknown_names_use_placeholder() {
        let route = Route::new(vec![v(9, "X"), v(8, "X")]).unwrap();
        assert_eq!(
            route.journey_summary(names),
            "Start at ? on X line -> Arrive at ?"
        );
    }

    #[test]
    fn describe_lists_every_step() {
        let route = sample_route();
        assert_eq!(
            route.describe(names),
            "Start at Alpha on X line\n\
             Continue to Bravo\n\
             Continue to Charlie\n\
             Transfer to Y line at Charlie\n\
             Arrive at Delta"
        );
    }
}
