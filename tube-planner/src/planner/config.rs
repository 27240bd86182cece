//! Search configuration for the route finder.

/// Configuration parameters for route search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of vertices settled before a search is abandoned.
    /// The tube graph has a few hundred extended vertices, so this only
    /// trips on pathological inputs.
    pub max_settled: usize,

    /// Flat interchange penalty (seconds) used by the primitive time
    /// estimate.
    pub primitive_transfer_secs: f64,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(max_settled: usize, primitive_transfer_secs: f64) -> Self {
        Self {
            max_settled,
            primitive_transfer_secs,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_settled: 1_000_000,
            primitive_transfer_secs: 180.0,
        }
    }
}
