//! Time model configuration.

/// Constants of the travel-time model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Scale applied to the distance term of the effective top speed,
    /// defined at 1 m.
    pub distance_base_coefficient: f64,

    /// Exponent of the hop length in the effective top speed. Longer hops
    /// let trains get closer to their nominal top speed.
    pub distance_relevance_coefficient: f64,

    /// Station around which effective speeds are reduced, resolved by name.
    /// `None` disables the congestion factor.
    pub hub_station: Option<String>,

    /// Congestion factor at the hub itself.
    pub congestion_floor: f64,

    /// Distance offset (meters) inside the congestion logarithm.
    pub congestion_offset_m: f64,

    /// Divisor of the congestion logarithm. Larger values flatten the
    /// recovery of speed away from the hub.
    pub congestion_divisor: f64,

    /// Interchange walking time scale (seconds) for a station of degree 2.
    pub interchange_walk_secs: f64,

    /// Maximum number of memoized values per cache.
    pub cache_capacity: u64,
}

impl ModelConfig {
    /// Returns this configuration with the congestion hub replaced.
    pub fn with_hub(mut self, hub: Option<&str>) -> Self {
        self.hub_station = hub.map(str::to_string);
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            distance_base_coefficient: 0.11539970618192215,
            distance_relevance_coefficient: 0.24683055802825526,
            hub_station: Some("Waterloo".to_string()),
            congestion_floor: 0.5,
            congestion_offset_m: 3000.0,
            congestion_divisor: 15.0,
            interchange_walk_secs: 60.0,
            cache_capacity: 100_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ModelConfig::default();

        assert_eq!(config.distance_base_coefficient, 0.11539970618192215);
        assert_eq!(config.distance_relevance_coefficient, 0.24683055802825526);
        assert_eq!(config.hub_station.as_deref(), Some("Waterloo"));
        assert_eq!(config.congestion_floor, 0.5);
        assert_eq!(config.congestion_offset_m, 3000.0);
        assert_eq!(config.congestion_divisor, 15.0);
        assert_eq!(config.interchange_walk_secs, 60.0);
        assert_eq!(config.cache_capacity, 100_000);
    }

    #[test]
    fn with_hub() {
        let config = ModelConfig::default().with_hub(None);
        assert!(config.hub_station.is_none());

        let config = config.with_hub(Some("Bank"));
        assert_eq!(config.hub_station.as_deref(), Some("Bank"));
    }
}
