//! Station types.

use std::fmt;

use geo::Point;

/// Contiguous index of a station within a built network.
///
/// Ids are assigned after stations without any incident edge have been
/// discarded, so they range over `0..network.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(pub usize);

impl StationId {
    /// Returns the underlying index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A physical stop with geographic coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Network-local id.
    pub id: StationId,
    /// Display name, e.g. "Oxford Circus".
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Station {
    /// Create a new station.
    pub fn new(id: StationId, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Location as a `(longitude, latitude)` point.
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_id() {
        assert_eq!(StationId(42).to_string(), "#42");
        assert_eq!(StationId(7).index(), 7);
    }

    #[test]
    fn ids_order_by_index() {
        let mut ids = vec![StationId(3), StationId(0), StationId(2)];
        ids.sort();
        assert_eq!(ids, vec![StationId(0), StationId(2), StationId(3)]);
    }

    #[test]
    fn new_station() {
        let s = Station::new(StationId(1), "Bank", 51.5133, -0.0886);
        assert_eq!(s.name, "Bank");
        assert_eq!(s.id, StationId(1));
    }

    #[test]
    fn point_is_longitude_first() {
        let s = Station::new(StationId(0), "Bank", 51.5133, -0.0886);
        assert_eq!(s.point().x(), -0.0886);
        assert_eq!(s.point().y(), 51.5133);
    }
}
