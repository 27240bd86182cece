//! Loading the network, model and training data from disk.
//!
//! All files are parsed strictly: an unreadable file, a malformed row or an
//! out-of-range value is an error rather than a silently skipped record. The
//! one exception is edges on lines with no parameters, which are dropped
//! with a warning.

mod error;
mod load;

pub use error::DataError;
pub use load::{
    DWELL_FILE, Dataset, EDGES_FILE, LINES_FILE, STATIONS_FILE, TRAINING_FILE, read_dwell_table,
    read_edges, read_line_table, read_stations, read_training, retain_known_lines,
};
