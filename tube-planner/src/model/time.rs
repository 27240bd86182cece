//! The travel-time model over a network.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use moka::sync::Cache;
use tracing::{trace, warn};

use super::config::ModelConfig;
use super::dwell::{Dwell, DwellTable};
use super::error::ModelError;
use super::kinematics::run_time;
use super::lines::LineTable;
use crate::domain::{Line, StationId};
use crate::network::Network;

/// Distance between `a` and `b` over the average speed of `line`, in seconds.
///
/// Needs no dwell data or hub, so it is usable before a [`TimeModel`] exists.
pub fn primitive_time(
    network: &Network,
    a: StationId,
    b: StationId,
    line: &Line,
    lines: &LineTable,
) -> Result<f64, ModelError> {
    let params = lines.get(line)?;
    params.validate(line)?;
    Ok(network.distance(a, b) / params.average_speed)
}

/// Cache key for effective top speeds: (from, to, line, table version).
type TopSpeedKey = (StationId, StationId, Line, u64);

/// Cache key for run times: (distance bits, line, top speed bits, table version).
type RunTimeKey = (u64, Line, u64, u64);

/// Kinematic, dwell and transfer time functions over a network.
///
/// Every function takes the [`LineTable`] it should evaluate against.
/// Memoized values are keyed by the table's version, so a value computed
/// under old multipliers is never returned after the table changes. When a
/// new version is seen, the caches are also flushed to release the stale
/// entries.
pub struct TimeModel<'a> {
    network: &'a Network,
    dwell: &'a DwellTable,
    config: ModelConfig,
    hub: Option<StationId>,
    top_speeds: Cache<TopSpeedKey, f64>,
    run_times: Cache<RunTimeKey, f64>,
    seen_version: AtomicU64,
    missing_dwell: Mutex<BTreeSet<(StationId, Line)>>,
}

impl<'a> TimeModel<'a> {
    /// Create a model, resolving the configured congestion hub by name.
    pub fn new(
        network: &'a Network,
        dwell: &'a DwellTable,
        config: ModelConfig,
    ) -> Result<Self, ModelError> {
        let hub = config
            .hub_station
            .as_deref()
            .map(|name| network.resolve(name))
            .transpose()?;

        Ok(Self {
            network,
            dwell,
            hub,
            top_speeds: Cache::builder().max_capacity(config.cache_capacity).build(),
            run_times: Cache::builder().max_capacity(config.cache_capacity).build(),
            seen_version: AtomicU64::new(0),
            missing_dwell: Mutex::new(BTreeSet::new()),
            config,
        })
    }

    /// The network this model is evaluated over.
    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// The model constants.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The resolved congestion hub, if any.
    pub fn hub(&self) -> Option<StationId> {
        self.hub
    }

    /// Flush the caches the first time a new table version is seen.
    fn observe(&self, lines: &LineTable) {
        let version = lines.version();
        if self.seen_version.swap(version, Ordering::Relaxed) != version {
            self.top_speeds.invalidate_all();
            self.run_times.invalidate_all();
        }
    }

    /// Congestion factor for a hop: the hub floor, recovering logarithmically
    /// with the hop's mean distance from the hub.
    pub fn congestion_factor(&self, a: StationId, b: StationId) -> f64 {
        let Some(hub) = self.hub else {
            return 1.0;
        };
        let to_hub = (self.network.distance(hub, a) + self.network.distance(hub, b)) / 2.0;
        let offset = self.config.congestion_offset_m;
        self.config.congestion_floor
            + ((to_hub + offset).ln() - offset.ln()) / self.config.congestion_divisor
    }

    /// Effective top speed (m/s) of `line` between two adjacent stations.
    pub fn top_speed(
        &self,
        a: StationId,
        b: StationId,
        line: &Line,
        lines: &LineTable,
    ) -> Result<f64, ModelError> {
        self.observe(lines);
        let key = (a, b, line.clone(), lines.version());
        if let Some(speed) = self.top_speeds.get(&key) {
            return Ok(speed);
        }

        let params = lines.get(line)?;
        params.validate(line)?;
        let distance = self.network.distance(a, b);
        let speed = params.top_speed
            * self.config.distance_base_coefficient
            * distance.powf(self.config.distance_relevance_coefficient)
            * params.relative_speed
            * self.congestion_factor(a, b);

        self.top_speeds.insert(key, speed);
        Ok(speed)
    }

    /// Run time (seconds) of `line` over `distance` meters with the given top speed.
    pub fn adjacent_time(
        &self,
        distance: f64,
        line: &Line,
        top_speed: f64,
        lines: &LineTable,
    ) -> Result<f64, ModelError> {
        self.observe(lines);
        let key = (
            distance.to_bits(),
            line.clone(),
            top_speed.to_bits(),
            lines.version(),
        );
        if let Some(time) = self.run_times.get(&key) {
            return Ok(time);
        }

        let params = lines.get(line)?;
        params.validate(line)?;
        let time = run_time(
            line,
            distance,
            top_speed,
            params.acceleration,
            params.deceleration,
        )?;

        self.run_times.insert(key, time);
        Ok(time)
    }

    /// Average dwell of `line` at `station`.
    ///
    /// A missing observation counts as zero. It is logged as a warning the
    /// first time it is seen and kept for [`missing_dwell`](Self::missing_dwell).
    pub fn dwell_time(&self, station: StationId, line: &Line) -> Dwell {
        let name = self.network.name(station).unwrap_or_default();
        let dwell = self.dwell.get(name, line);
        if dwell.is_missing() {
            let first = self
                .missing_dwell
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((station, line.clone()));
            if first {
                warn!(station = name, line = %line, "No dwell data, assuming zero");
            } else {
                trace!(station = name, line = %line, "No dwell data");
            }
        }
        dwell
    }

    /// (station, line) pairs that were looked up without dwell data.
    pub fn missing_dwell(&self) -> Vec<(StationId, Line)> {
        self.missing_dwell
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Interchange penalty (seconds) for changing onto `to` at `station`.
    ///
    /// Walking time grows with the square root of the station's degree; the
    /// wait is half the new line's headway. The line being left does not
    /// matter.
    pub fn transfer_time(
        &self,
        station: StationId,
        _from: &Line,
        to: &Line,
        lines: &LineTable,
    ) -> Result<f64, ModelError> {
        let params = lines.get(to)?;
        params.validate(to)?;
        let degree = self.network.degree(station) as f64;
        let walk = (degree / 2.0).sqrt() * self.config.interchange_walk_secs;
        let wait = (3600.0 / params.frequency) / 2.0;
        Ok(walk + wait)
    }

    /// Time (seconds) to depart `current` on `line` and arrive at `next`:
    /// the dwell at `current` plus the run time of the hop.
    pub fn edge_time(
        &self,
        current: StationId,
        next: StationId,
        line: &Line,
        lines: &LineTable,
    ) -> Result<f64, ModelError> {
        let dwell = self.dwell_time(current, line).seconds();
        let top_speed = self.top_speed(current, next, line, lines)?;
        let distance = self.network.distance(current, next);
        Ok(dwell + self.adjacent_time(distance, line, top_speed, lines)?)
    }

    /// Uncalibrated estimate (seconds): hop length over the line's average speed.
    pub fn primitive_time(
        &self,
        a: StationId,
        b: StationId,
        line: &Line,
        lines: &LineTable,
    ) -> Result<f64, ModelError> {
        primitive_time(self.network, a, b, line, lines)
    }

    /// Number of memoized values currently held.
    pub fn cached_entries(&self) -> u64 {
        self.top_speeds.run_pending_tasks();
        self.run_times.run_pending_tasks();
        self.top_speeds.entry_count() + self.run_times.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineParameters;
    use crate::network::{RawEdge, RawStation};

    /// Meters per degree of longitude along the equator.
    const M_PER_DEG: f64 = std::f64::consts::PI * crate::network::EARTH_RADIUS_M / 180.0;

    fn station(id: u32, name: &str, east_m: f64) -> RawStation {
        RawStation {
            id,
            name: name.to_string(),
            latitude: 0.0,
            longitude: east_m / M_PER_DEG,
        }
    }

    fn edge(from: u32, to: u32, line: &str) -> RawEdge {
        RawEdge {
            from,
            to,
            line: line.to_string(),
            colour: None,
        }
    }

    /// Hub at 0 m, A at 1 km, B at 2 km, C at 5 km along the equator.
    fn network() -> Network {
        Network::build(
            vec![
                station(0, "Hub", 0.0),
                station(1, "A", 1000.0),
                station(2, "B", 2000.0),
                station(3, "C", 5000.0),
            ],
            &[
                edge(0, 1, "X"),
                edge(1, 2, "X"),
                edge(2, 3, "X"),
                edge(1, 2, "Y"),
            ],
        )
        .unwrap()
    }

    fn lines() -> LineTable {
        [
            (
                Line::new("X"),
                LineParameters {
                    top_speed: 20.0,
                    acceleration: 1.0,
                    deceleration: 1.0,
                    frequency: 12.0,
                    average_speed: 10.0,
                    relative_speed: 1.0,
                },
            ),
            (
                Line::new("Y"),
                LineParameters {
                    top_speed: 10.0,
                    acceleration: 0.5,
                    deceleration: 0.5,
                    frequency: 24.0,
                    average_speed: 8.0,
                    relative_speed: 1.0,
                },
            ),
        ]
        .into_iter()
        .collect()
    }

    /// Coefficients chosen so the effective top speed is the nominal one.
    fn flat_config() -> ModelConfig {
        ModelConfig {
            distance_base_coefficient: 1.0,
            distance_relevance_coefficient: 0.0,
            ..ModelConfig::default()
        }
        .with_hub(None)
    }

    fn id(network: &Network, name: &str) -> StationId {
        network.resolve(name).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn unknown_hub_is_an_error() {
        let network = network();
        let dwell = DwellTable::new();
        let config = ModelConfig::default().with_hub(Some("Waterloo"));
        assert!(matches!(
            TimeModel::new(&network, &dwell, config),
            Err(ModelError::HubNotFound(_))
        ));
    }

    #[test]
    fn top_speed_without_congestion() {
        let network = network();
        let dwell = DwellTable::new();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let lines = lines();

        let (a, b) = (id(&network, "A"), id(&network, "B"));
        let speed = model.top_speed(a, b, &Line::new("X"), &lines).unwrap();
        assert!(close(speed, 20.0), "got {speed}");
    }

    #[test]
    fn top_speed_grows_with_distance() {
        let network = network();
        let dwell = DwellTable::new();
        let config = ModelConfig::default().with_hub(None);
        let model = TimeModel::new(&network, &dwell, config.clone()).unwrap();
        let lines = lines();
        let x = Line::new("X");

        let (a, b, c) = (id(&network, "A"), id(&network, "B"), id(&network, "C"));
        let short = model.top_speed(a, b, &x, &lines).unwrap();
        let long = model.top_speed(b, c, &x, &lines).unwrap();
        assert!(long > short);

        let expected = 20.0
            * config.distance_base_coefficient
            * network.distance(a, b).powf(config.distance_relevance_coefficient);
        assert!(close(short, expected));
    }

    #[test]
    fn congestion_factor_recovers_away_from_hub() {
        let network = network();
        let dwell = DwellTable::new();
        let config = flat_config().with_hub(Some("Hub"));
        let model = TimeModel::new(&network, &dwell, config).unwrap();

        let (hub, a, b, c) = (
            id(&network, "Hub"),
            id(&network, "A"),
            id(&network, "B"),
            id(&network, "C"),
        );
        assert_eq!(model.hub(), Some(hub));
        assert!(close(model.congestion_factor(hub, hub), 0.5));

        // A-B averages 1.5 km from the hub
        let expected = 0.5 + ((1500.0f64 + 3000.0).ln() - 3000.0f64.ln()) / 15.0;
        assert!(close(model.congestion_factor(a, b), expected));
        assert!(model.congestion_factor(b, c) > model.congestion_factor(a, b));

        let speed = model.top_speed(a, b, &Line::new("X"), &lines()).unwrap();
        assert!(close(speed, 20.0 * expected));
    }

    #[test]
    fn edge_time_adds_dwell_to_run_time() {
        let network = network();
        let mut dwell = DwellTable::new();
        dwell.insert("A", Line::new("X"), 25.0).unwrap();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let lines = lines();
        let x = Line::new("X");

        let (a, b) = (id(&network, "A"), id(&network, "B"));
        let t = model.edge_time(a, b, &x, &lines).unwrap();
        let run = 40.0 + (network.distance(a, b) - 400.0) / 20.0;
        assert!(close(t, 25.0 + run), "got {t}");

        // No dwell observed at B on X
        let back = model.edge_time(b, a, &x, &lines).unwrap();
        assert!(close(back, run));
        assert_eq!(model.missing_dwell(), vec![(b, x.clone())]);
    }

    #[test]
    fn missing_dwell_recorded_once() {
        let network = network();
        let dwell = DwellTable::new();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let a = id(&network, "A");

        assert_eq!(model.dwell_time(a, &Line::new("X")), Dwell::Missing);
        assert_eq!(model.dwell_time(a, &Line::new("X")), Dwell::Missing);
        assert_eq!(model.missing_dwell().len(), 1);
    }

    #[test]
    fn transfer_time_uses_degree_and_new_headway() {
        let network = network();
        let dwell = DwellTable::new();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let lines = lines();

        // B has X to A, X to C and Y to A: degree 3
        let b = id(&network, "B");
        assert_eq!(network.degree(b), 3);
        let t = model
            .transfer_time(b, &Line::new("X"), &Line::new("Y"), &lines)
            .unwrap();
        let expected = (1.5f64).sqrt() * 60.0 + (3600.0 / 24.0) / 2.0;
        assert!(close(t, expected));

        // Independent of the line being left
        let t2 = model
            .transfer_time(b, &Line::new("Z"), &Line::new("Y"), &lines)
            .unwrap();
        assert_eq!(t, t2);
    }

    #[test]
    fn multiplier_change_is_never_served_stale() {
        let network = network();
        let dwell = DwellTable::new();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let mut lines = lines();
        let x = Line::new("X");
        let (a, b) = (id(&network, "A"), id(&network, "B"));

        let before = model.edge_time(a, b, &x, &lines).unwrap();
        lines.set_relative_speed(&x, 2.0).unwrap();
        let after = model.edge_time(a, b, &x, &lines).unwrap();
        assert!(after < before);

        assert!(close(model.top_speed(a, b, &x, &lines).unwrap(), 40.0));

        lines.set_relative_speed(&x, 1.0).unwrap();
        assert!(close(model.edge_time(a, b, &x, &lines).unwrap(), before));
    }

    #[test]
    fn unknown_line_propagates() {
        let network = network();
        let dwell = DwellTable::new();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let (a, b) = (id(&network, "A"), id(&network, "B"));

        let err = model
            .edge_time(a, b, &Line::new("Z"), &lines())
            .unwrap_err();
        assert_eq!(err, ModelError::UnknownLine(Line::new("Z")));
    }

    #[test]
    fn primitive_time_is_distance_over_average_speed() {
        let network = network();
        let dwell = DwellTable::new();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let (a, b) = (id(&network, "A"), id(&network, "B"));

        let t = model
            .primitive_time(a, b, &Line::new("X"), &lines())
            .unwrap();
        assert!(close(t, network.distance(a, b) / 10.0));
    }

    #[test]
    fn memoizes_values() {
        let network = network();
        let dwell = DwellTable::new();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let lines = lines();
        let (a, b) = (id(&network, "A"), id(&network, "B"));

        model.edge_time(a, b, &Line::new("X"), &lines).unwrap();
        assert_eq!(model.cached_entries(), 2);
        model.edge_time(a, b, &Line::new("X"), &lines).unwrap();
        assert_eq!(model.cached_entries(), 2);
    }
}
