//! Forward extrapolation of each patient's reading history.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, instrument};

use super::generator::generate;
use super::random::RandomSource;
use super::scanner::scan;
use super::SimulationSettings;
use crate::models::{Alert, NewAlert, Reading, VitalRangeTable};

#[derive(Debug, thiserror::Error)]
#[error("alert dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Where alerts raised during expansion are sent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn dispatch(&self, alert: NewAlert) -> Result<Alert, DispatchError>;
}

pub struct TimelineExpander<'a> {
    ranges: &'a VitalRangeTable,
    settings: &'a SimulationSettings,
    sink: &'a dyn AlertSink,
}

impl<'a> TimelineExpander<'a> {
    pub fn new(
        ranges: &'a VitalRangeTable,
        settings: &'a SimulationSettings,
        sink: &'a dyn AlertSink,
    ) -> Self {
        Self { ranges, settings, sink }
    }

    /// Generates the next few readings for every patient in `history`.
    ///
    /// Returns only the new readings; `history` is left untouched. No reading
    /// is stamped after `now`. Each new reading with anomalies produces one
    /// alert through the sink; a failed dispatch is logged and dropped.
    #[instrument(skip_all, fields(history = history.len()))]
    pub async fn expand(
        &self,
        history: &[Reading],
        now: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> Vec<Reading> {
        let mut generated = Vec::new();

        for seed in latest_per_patient(history) {
            let entries = self.entry_count(rng);
            let mut previous = seed.recorded_at;

            for _ in 0..entries {
                let next = previous + self.step(rng);
                if next > now {
                    break;
                }

                let reading = generate(seed, next, self.ranges, self.settings, rng);
                let anomalies = scan(&reading, self.ranges);
                if !anomalies.is_empty() {
                    let alert = NewAlert::new(reading.patient_id.clone(), anomalies, now);
                    if let Err(e) = self.sink.dispatch(alert).await {
                        error!(patient_id = %reading.patient_id, "Failed to send alert: {}", e);
                    }
                }

                previous = next;
                generated.push(reading);
            }
        }

        debug!("Generated {} readings", generated.len());
        generated
    }

    fn entry_count(&self, rng: &mut dyn RandomSource) -> usize {
        let min = self.settings.min_entries;
        let max = self.settings.max_entries.max(min);
        let span = (max - min + 1) as f64;
        (min + (rng.unit() * span).floor() as usize).min(max)
    }

    fn step(&self, rng: &mut dyn RandomSource) -> Duration {
        let cadence = self.settings.cadence_minutes * 60_000.0;
        let jitter = (rng.unit() * 2.0 - 1.0) * self.settings.jitter_minutes * 60_000.0;
        Duration::milliseconds((cadence + jitter).round() as i64)
    }
}

/// Each patient's chronologically last reading, in order of first appearance.
fn latest_per_patient(history: &[Reading]) -> Vec<&Reading> {
    let mut order = Vec::new();
    let mut latest: HashMap<&str, &Reading> = HashMap::new();

    for reading in history {
        match latest.entry(reading.patient_id.as_str()) {
            Entry::Vacant(slot) => {
                order.push(reading.patient_id.as_str());
                slot.insert(reading);
            }
            Entry::Occupied(mut slot) => {
                if reading.recorded_at >= slot.get().recorded_at {
                    slot.insert(reading);
                }
            }
        }
    }

    order.into_iter().filter_map(|id| latest.get(id).copied()).collect()
}
