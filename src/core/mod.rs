//! Core monitoring pipeline: scan, simulate, expand and query readings.

pub mod forecast;
pub mod generator;
pub mod query;
pub mod random;
pub mod scanner;
pub mod timeline;

use serde::Deserialize;

/// Tunables for the synthetic reading simulator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Base spacing between generated readings.
    pub cadence_minutes: f64,
    /// Maximum deviation either side of the cadence.
    pub jitter_minutes: f64,
    pub min_entries: usize,
    pub max_entries: usize,
    /// Chance that a generated vital lands inside its range.
    pub in_range_probability: f64,
    /// Widest out-of-range excursion past either bound.
    pub excursion: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            cadence_minutes: 15.0,
            jitter_minutes: 5.0,
            min_entries: 2,
            max_entries: 4,
            in_range_probability: 0.85,
            excursion: 5.0,
        }
    }
}
