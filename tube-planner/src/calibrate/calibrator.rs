//! Per-line speed multiplier fitting.
//!
//! Every training sample is a journey on a single line, so its predicted
//! duration depends only on that line's multiplier. Each line is therefore
//! fitted independently: a ternary search over the configured interval,
//! minimizing the squared error of the line's own samples.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::domain::{Line, Route};
use crate::model::{LineTable, ModelError, TimeModel};
use crate::planner::RouteFinder;

use super::config::CalibrationConfig;
use super::error::CalibrationError;
use super::sample::TrainingSample;

/// A sample with its forced-line route resolved.
#[derive(Debug, Clone)]
struct PreparedSample {
    line: Line,
    route: Route,
    observed: f64,
}

/// Outcome of fitting one line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineAdjustment {
    pub line: Line,
    /// Multiplier before fitting.
    pub before: f64,
    /// Multiplier after fitting; equal to `before` if the fit was rejected.
    pub after: f64,
    /// Squared error of this line's samples before fitting.
    pub loss_before: f64,
    /// Squared error of this line's samples after fitting.
    pub loss_after: f64,
}

impl LineAdjustment {
    /// Returns true if the fitted multiplier was kept.
    pub fn changed(&self) -> bool {
        self.after != self.before
    }
}

/// Summary of a calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    /// One entry per line that had usable samples, in line order.
    pub adjustments: Vec<LineAdjustment>,
    /// Total squared error before calibration.
    pub initial_loss: f64,
    /// Total squared error after calibration.
    pub final_loss: f64,
    pub samples_used: usize,
    pub samples_skipped: usize,
}

/// Fits the relative-speed multipliers of a [`LineTable`] to observed
/// journey durations.
pub struct Calibrator<'m, 'a> {
    model: &'m TimeModel<'a>,
    samples: Vec<PreparedSample>,
    skipped: usize,
    config: CalibrationConfig,
}

impl<'m, 'a> Calibrator<'m, 'a> {
    /// Resolve every sample to its forced-line route.
    ///
    /// Routes do not depend on the multipliers, so this happens once.
    /// Samples whose stations are unknown, or that cannot be made on their
    /// line, are skipped with a warning.
    pub fn new(
        finder: &RouteFinder<'_>,
        model: &'m TimeModel<'a>,
        samples: &[TrainingSample],
        config: CalibrationConfig,
    ) -> Result<Self, CalibrationError> {
        config.validate()?;

        let network = finder.network();
        let mut prepared = Vec::with_capacity(samples.len());
        let mut skipped = 0;

        for sample in samples {
            let resolved = (network.resolve(&sample.start), network.resolve(&sample.end));
            let (start, end) = match resolved {
                (Ok(start), Ok(end)) => (start, end),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(sample = %sample.describe(), error = %e, "Skipping training sample");
                    skipped += 1;
                    continue;
                }
            };

            match finder.find_forced_route(start, end, &sample.line)?.route {
                Some(route) => prepared.push(PreparedSample {
                    line: sample.line.clone(),
                    route,
                    observed: sample.observed_seconds(),
                }),
                None => {
                    warn!(
                        sample = %sample.describe(),
                        "Skipping training sample: no route on its line"
                    );
                    skipped += 1;
                }
            }
        }

        debug!(used = prepared.len(), skipped, "Prepared training samples");

        Ok(Self {
            model,
            samples: prepared,
            skipped,
            config,
        })
    }

    /// Number of samples that will be fitted against.
    pub fn samples_used(&self) -> usize {
        self.samples.len()
    }

    /// Number of samples dropped during preparation.
    pub fn samples_skipped(&self) -> usize {
        self.skipped
    }

    /// Lines that have at least one usable sample.
    pub fn lines(&self) -> BTreeSet<Line> {
        self.samples.iter().map(|s| s.line.clone()).collect()
    }

    /// Predicted duration (seconds) of a single-line route: the sum of
    /// dwell plus run time over every hop.
    pub fn predict(&self, route: &Route, lines: &LineTable) -> Result<f64, ModelError> {
        route.vertices().windows(2).try_fold(0.0, |total, pair| {
            let (current, next) = (&pair[0], &pair[1]);
            Ok(total + self.model.edge_time(current.station, next.station, &current.line, lines)?)
        })
    }

    /// Total squared error over every usable sample.
    pub fn loss(&self, lines: &LineTable) -> Result<f64, ModelError> {
        self.loss_where(lines, |_| true)
    }

    /// Squared error over the samples of one line.
    pub fn line_loss(&self, line: &Line, lines: &LineTable) -> Result<f64, ModelError> {
        self.loss_where(lines, |sample| sample.line == *line)
    }

    fn loss_where(
        &self,
        lines: &LineTable,
        include: impl Fn(&PreparedSample) -> bool,
    ) -> Result<f64, ModelError> {
        self.samples
            .iter()
            .filter(|s| include(s))
            .try_fold(0.0, |loss, sample| {
                let error = self.predict(&sample.route, lines)? - sample.observed;
                Ok(loss + error * error)
            })
    }

    /// Fit every line's multiplier in place.
    ///
    /// A fitted value that would increase the line's error is discarded, so
    /// the total error never increases. On failure the multiplier of the
    /// line being fitted is restored; lines fitted earlier keep their new
    /// values.
    pub fn calibrate(&self, lines: &mut LineTable) -> Result<CalibrationReport, CalibrationError> {
        let initial_loss = self.loss(lines)?;
        info!(
            samples = self.samples.len(),
            skipped = self.skipped,
            loss = initial_loss,
            "Starting calibration"
        );

        let mut adjustments = Vec::new();
        for line in self.lines() {
            let before = lines.relative_speed(&line)?;
            match self.fit_line(&line, before, lines) {
                Ok(adjustment) => {
                    info!(
                        line = %line,
                        before = adjustment.before,
                        after = adjustment.after,
                        loss_before = adjustment.loss_before,
                        loss_after = adjustment.loss_after,
                        "Calibrated line"
                    );
                    adjustments.push(adjustment);
                }
                Err(e) => {
                    lines.set_relative_speed(&line, before)?;
                    return Err(e);
                }
            }
        }

        let final_loss = self.loss(lines)?;
        info!(initial_loss, final_loss, "Calibration finished");

        Ok(CalibrationReport {
            adjustments,
            initial_loss,
            final_loss,
            samples_used: self.samples.len(),
            samples_skipped: self.skipped,
        })
    }

    fn fit_line(
        &self,
        line: &Line,
        before: f64,
        lines: &mut LineTable,
    ) -> Result<LineAdjustment, CalibrationError> {
        let loss_before = self.line_loss(line, lines)?;
        let candidate = self.ternary_search(line, lines)?;
        lines.set_relative_speed(line, candidate)?;
        let loss_candidate = self.line_loss(line, lines)?;

        let (after, loss_after) = if loss_candidate > loss_before {
            debug!(line = %line, candidate, "Fit increased error, keeping previous multiplier");
            lines.set_relative_speed(line, before)?;
            (before, loss_before)
        } else {
            (candidate, loss_candidate)
        };

        Ok(LineAdjustment {
            line: line.clone(),
            before,
            after,
            loss_before,
            loss_after,
        })
    }

    /// Narrow the configured interval around the minimum of the line's
    /// error and return its midpoint.
    ///
    /// Leaves the line's multiplier at the last evaluated point.
    fn ternary_search(&self, line: &Line, lines: &mut LineTable) -> Result<f64, CalibrationError> {
        let (mut lo, mut hi) = (self.config.lower, self.config.upper);
        while hi - lo > self.config.tolerance {
            let third = (hi - lo) / 3.0;
            let (m1, m2) = (lo + third, hi - third);

            lines.set_relative_speed(line, m1)?;
            let f1 = self.line_loss(line, lines)?;
            lines.set_relative_speed(line, m2)?;
            let f2 = self.line_loss(line, lines)?;

            if f1 < f2 {
                hi = m2;
            } else {
                lo = m1;
            }
        }
        Ok((lo + hi) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DwellTable, LineParameters, ModelConfig};
    use crate::network::{EARTH_RADIUS_M, Network, RawEdge, RawStation};
    use crate::planner::SearchConfig;
    use chrono::Duration;

    const M_PER_DEG: f64 = std::f64::consts::PI * EARTH_RADIUS_M / 180.0;

    /// Stations every 5 km along the equator: A-B-C on X, A-B on Y.
    fn network() -> Network {
        let stations = ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, name)| RawStation {
                id: i as u32,
                name: name.to_string(),
                latitude: 0.0,
                longitude: 5000.0 * i as f64 / M_PER_DEG,
            })
            .collect();
        let edges = [(0, 1, "X"), (1, 2, "X"), (0, 1, "Y")]
            .iter()
            .map(|(from, to, line)| RawEdge {
                from: *from,
                to: *to,
                line: line.to_string(),
                colour: None,
            })
            .collect::<Vec<_>>();
        Network::build(stations, &edges).unwrap()
    }

    fn lines() -> LineTable {
        let params = LineParameters {
            top_speed: 20.0,
            acceleration: 1.0,
            deceleration: 1.0,
            frequency: 12.0,
            average_speed: 10.0,
            relative_speed: 1.0,
        };
        [(Line::new("X"), params.clone()), (Line::new("Y"), params)]
            .into_iter()
            .collect()
    }

    fn dwell() -> DwellTable {
        let mut dwell = DwellTable::new();
        dwell.insert("A", Line::new("X"), 30.0).unwrap();
        dwell.insert("B", Line::new("X"), 30.0).unwrap();
        dwell.insert("A", Line::new("Y"), 30.0).unwrap();
        dwell
    }

    fn flat_config() -> ModelConfig {
        ModelConfig {
            distance_base_coefficient: 1.0,
            distance_relevance_coefficient: 0.0,
            ..ModelConfig::default()
        }
        .with_hub(None)
    }

    /// Samples whose durations are what the model predicts with the given
    /// multiplier on X.
    fn synthetic_samples(
        finder: &RouteFinder<'_>,
        model: &TimeModel<'_>,
        multiplier: f64,
    ) -> Vec<TrainingSample> {
        let mut truth = lines();
        truth.set_relative_speed(&Line::new("X"), multiplier).unwrap();
        let network = finder.network();

        [("A", "B"), ("A", "C"), ("B", "C"), ("C", "A")]
            .into_iter()
            .map(|(from, to)| {
                let (s, t) = (network.resolve(from).unwrap(), network.resolve(to).unwrap());
                let route = finder
                    .find_forced_route(s, t, &Line::new("X"))
                    .unwrap()
                    .route
                    .unwrap();
                let seconds = route
                    .vertices()
                    .windows(2)
                    .map(|p| {
                        model
                            .edge_time(p[0].station, p[1].station, &p[0].line, &truth)
                            .unwrap()
                    })
                    .sum::<f64>();
                let observed = Duration::milliseconds((seconds * 1000.0).round() as i64);
                TrainingSample::new("X", from, to, observed)
            })
            .collect()
    }

    #[test]
    fn recovers_known_multiplier() {
        let network = network();
        let dwell = dwell();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let finder = RouteFinder::new(&network, SearchConfig::default());
        let samples = synthetic_samples(&finder, &model, 1.7);

        let calibrator =
            Calibrator::new(&finder, &model, &samples, CalibrationConfig::default()).unwrap();
        let mut lines = lines();
        let report = calibrator.calibrate(&mut lines).unwrap();

        let fitted = lines.relative_speed(&Line::new("X")).unwrap();
        assert!((fitted - 1.7).abs() < 0.01, "fitted {fitted}");
        assert!(report.final_loss < report.initial_loss);
        assert!(report.final_loss < 1.0);
        assert_eq!(report.samples_used, 4);
        assert_eq!(report.samples_skipped, 0);

        // Only X had samples
        assert_eq!(report.adjustments.len(), 1);
        assert!(report.adjustments[0].changed());
        assert_eq!(lines.relative_speed(&Line::new("Y")).unwrap(), 1.0);
    }

    #[test]
    fn prediction_sums_dwell_and_run_times() {
        let network = network();
        let dwell = dwell();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let finder = RouteFinder::new(&network, SearchConfig::default());
        let samples = [TrainingSample::new("X", "A", "C", Duration::seconds(600))];
        let calibrator =
            Calibrator::new(&finder, &model, &samples, CalibrationConfig::default()).unwrap();
        let lines = lines();

        let route = &calibrator.samples[0].route;
        let (a, b, c) = (
            network.resolve("A").unwrap(),
            network.resolve("B").unwrap(),
            network.resolve("C").unwrap(),
        );
        let run = |d: f64| 40.0 + (d - 400.0) / 20.0;
        let expected =
            30.0 + run(network.distance(a, b)) + 30.0 + run(network.distance(b, c));
        let predicted = calibrator.predict(route, &lines).unwrap();
        assert!((predicted - expected).abs() < 1e-6, "got {predicted}");

        let loss = calibrator.loss(&lines).unwrap();
        assert!((loss - (predicted - 600.0).powi(2)).abs() < 1e-6);
    }

    #[test]
    fn skips_unusable_samples() {
        let network = network();
        let dwell = dwell();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let finder = RouteFinder::new(&network, SearchConfig::default());
        let samples = [
            TrainingSample::new("X", "A", "Nowhere", Duration::seconds(60)),
            // Y does not reach C
            TrainingSample::new("Y", "A", "C", Duration::seconds(60)),
            TrainingSample::new("Y", "A", "B", Duration::seconds(300)),
        ];

        let calibrator =
            Calibrator::new(&finder, &model, &samples, CalibrationConfig::default()).unwrap();
        assert_eq!(calibrator.samples_used(), 1);
        assert_eq!(calibrator.samples_skipped(), 2);
        assert_eq!(
            calibrator.lines().into_iter().collect::<Vec<_>>(),
            vec![Line::new("Y")]
        );
    }

    #[test]
    fn rejected_fit_restores_multiplier() {
        let network = network();
        let dwell = dwell();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let finder = RouteFinder::new(&network, SearchConfig::default());
        let samples = synthetic_samples(&finder, &model, 1.7);

        // The true value lies outside the searched interval
        let config = CalibrationConfig::new(0.0, 1.0, 1e-3);
        let calibrator = Calibrator::new(&finder, &model, &samples, config).unwrap();
        let mut lines = lines();
        let x = Line::new("X");
        lines.set_relative_speed(&x, 1.7).unwrap();

        let report = calibrator.calibrate(&mut lines).unwrap();
        assert_eq!(lines.relative_speed(&x).unwrap(), 1.7);
        assert!(!report.adjustments[0].changed());
        assert!(report.final_loss <= report.initial_loss);
    }

    #[test]
    fn empty_sample_set_is_a_no_op() {
        let network = network();
        let dwell = dwell();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let finder = RouteFinder::new(&network, SearchConfig::default());

        let calibrator =
            Calibrator::new(&finder, &model, &[], CalibrationConfig::default()).unwrap();
        let mut lines = lines();
        let report = calibrator.calibrate(&mut lines).unwrap();
        assert!(report.adjustments.is_empty());
        assert_eq!(report.initial_loss, 0.0);
        assert_eq!(report.final_loss, 0.0);
    }

    #[test]
    fn invalid_config_rejected() {
        let network = network();
        let dwell = dwell();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let finder = RouteFinder::new(&network, SearchConfig::default());

        let result = Calibrator::new(
            &finder,
            &model,
            &[],
            CalibrationConfig::new(3.0, 0.0, 1e-3),
        );
        assert!(matches!(result, Err(CalibrationError::InvalidConfig(_))));
    }

    #[test]
    fn unknown_line_in_table_propagates() {
        let network = network();
        let dwell = dwell();
        let model = TimeModel::new(&network, &dwell, flat_config()).unwrap();
        let finder = RouteFinder::new(&network, SearchConfig::default());
        let samples = [TrainingSample::new("Y", "A", "B", Duration::seconds(300))];
        let calibrator =
            Calibrator::new(&finder, &model, &samples, CalibrationConfig::default()).unwrap();

        let mut only_x: LineTable = lines()
            .iter()
            .filter(|(line, _)| line.as_str() == "X")
            .map(|(line, params)| (line.clone(), params.clone()))
            .collect();
        let err = calibrator.calibrate(&mut only_x).unwrap_err();
        assert_eq!(
            err,
            CalibrationError::Model(ModelError::UnknownLine(Line::new("Y")))
        );
    }
}
