//! CLI configuration from environment.

use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Cost grid cell edge in meters.
    pub cell_size_m: f64,
    /// Overrides the ideal span derived from the project configuration.
    pub ideal_span_m: Option<f64>,
    /// Seed for the synthetic suburb scenario.
    pub seed: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            cell_size_m: 10.0,
            ideal_span_m: None,
            seed: 7,
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            cell_size_m: lookup("POLEPLAN_CELL_SIZE_M")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cell_size_m),
            ideal_span_m: lookup("POLEPLAN_IDEAL_SPAN_M").and_then(|s| s.parse().ok()),
            seed: lookup("POLEPLAN_SEED")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.seed),
        }
    }
}
