//! Strict loaders for the network, dwell, line and training files.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::error::DataError;
use crate::calibrate::TrainingSample;
use crate::domain::{Line, parse_mmss};
use crate::model::{DwellRecord, DwellTable, LineParameters, LineTable, london_lines};
use crate::network::{Network, RawEdge, RawStation};

pub const STATIONS_FILE: &str = "stations.csv";
pub const EDGES_FILE: &str = "edges.csv";
pub const TRAINING_FILE: &str = "training.csv";
pub const DWELL_FILE: &str = "dwell_times.json";
pub const LINES_FILE: &str = "lines.json";

/// A row of the training file. The duration is "mm:ss".
#[derive(Debug, Deserialize)]
struct TrainingRecord {
    line: String,
    start: String,
    end: String,
    duration: String,
}

/// An entry of the line override file. Speeds are in km/h, as in
/// [`london_lines`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LineRecord {
    line: String,
    top_speed_kmh: f64,
    acceleration: f64,
    deceleration: f64,
    frequency: f64,
    average_speed_kmh: f64,
    #[serde(default)]
    relative_speed: Option<f64>,
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    let csv_error = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_error)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read `id,name,latitude,longitude` rows.
pub fn read_stations(path: &Path) -> Result<Vec<RawStation>, DataError> {
    read_csv(path)
}

/// Read `from,to,line,colour` rows. The colour column may be empty.
pub fn read_edges(path: &Path) -> Result<Vec<RawEdge>, DataError> {
    read_csv(path)
}

/// Read `line,start,end,duration` rows into training samples.
pub fn read_training(path: &Path) -> Result<Vec<TrainingSample>, DataError> {
    let records: Vec<TrainingRecord> = read_csv(path)?;
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let observed = parse_mmss(&record.duration).map_err(|e| DataError::InvalidRecord {
                path: path.to_path_buf(),
                // Header is line 1
                line: idx + 2,
                reason: e.to_string(),
            })?;
            Ok(TrainingSample::new(
                record.line,
                record.start,
                record.end,
                observed,
            ))
        })
        .collect()
}

/// Read a JSON array of `{station, line, seconds}` objects.
pub fn read_dwell_table(path: &Path) -> Result<DwellTable, DataError> {
    let records: Vec<DwellRecord> = read_json(path)?;
    Ok(DwellTable::from_records(records)?)
}

/// Read a JSON array of line profiles and apply them over the defaults.
pub fn read_line_table(path: &Path) -> Result<LineTable, DataError> {
    let records: Vec<LineRecord> = read_json(path)?;
    let mut table = london_lines();
    for record in records {
        let line = Line::new(&record.line);
        let mut params = LineParameters::from_kmh(
            record.top_speed_kmh,
            record.acceleration,
            record.deceleration,
            record.frequency,
            record.average_speed_kmh,
        );
        if let Some(relative_speed) = record.relative_speed {
            params.relative_speed = relative_speed;
        }
        params.validate(&line)?;
        table.insert(line, params);
    }
    Ok(table)
}

/// Drop edges on lines the table has no parameters for.
///
/// Returns the number of edges removed. Each unknown line is logged once.
pub fn retain_known_lines(edges: &mut Vec<RawEdge>, lines: &LineTable) -> usize {
    let before = edges.len();
    let mut unknown = BTreeSet::new();
    edges.retain(|edge| {
        let known = lines.contains(&edge.line);
        if !known {
            unknown.insert(edge.line.clone());
        }
        known
    });
    for line in &unknown {
        warn!(line = %line, "Dropping edges on line with no parameters");
    }
    before - edges.len()
}

/// Everything needed to plan and calibrate, loaded from one directory.
#[derive(Debug)]
pub struct Dataset {
    pub network: Network,
    pub lines: LineTable,
    pub dwell: DwellTable,
    pub training: Vec<TrainingSample>,
}

impl Dataset {
    /// Load a data directory.
    ///
    /// `stations.csv`, `edges.csv` and `dwell_times.json` are required.
    /// `lines.json` overrides the default line profiles and `training.csv`
    /// supplies calibration samples; both may be absent.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, DataError> {
        let dir = dir.as_ref();
        let file = |name: &str| -> PathBuf { dir.join(name) };

        let lines = match optional(file(LINES_FILE)) {
            Some(path) => read_line_table(&path)?,
            None => london_lines(),
        };

        let stations = read_stations(&file(STATIONS_FILE))?;
        let mut edges = read_edges(&file(EDGES_FILE))?;
        let dropped = retain_known_lines(&mut edges, &lines);
        let network = Network::build(stations, &edges)?;

        let dwell = read_dwell_table(&file(DWELL_FILE))?;

        let training = match optional(file(TRAINING_FILE)) {
            Some(path) => read_training(&path)?,
            None => {
                debug!(dir = %dir.display(), "No training file");
                Vec::new()
            }
        };

        info!(
            stations = network.len(),
            edges = edges.len(),
            dropped_edges = dropped,
            lines = lines.len(),
            dwell = dwell.len(),
            training = training.len(),
            "Loaded dataset"
        );

        Ok(Self {
            network,
            lines,
            dwell,
            training,
        })
    }
}

fn optional(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}
