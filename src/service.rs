//! The monitoring pipeline behind the HTTP routes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

use crate::core::forecast::ForecastClient;
use crate::core::query::query;
use crate::core::random::{RandomSource, RngSource};
use crate::core::timeline::TimelineExpander;
use crate::core::SimulationSettings;
use crate::dataset::DatasetSource;
use crate::error::Result;
use crate::models::{AnomalySummary, Reading, VitalRangeTable};
use crate::store::{AlertStore, ReadingHistory, ReadingStore};

/// Anomaly summaries for every patient, or the row for one patient if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnomalyResults {
    All(Vec<AnomalySummary>),
    Patient(Option<AnomalySummary>),
}

/// Shared application state: the stores plus everything needed to extend
/// and query them.
pub struct Monitor {
    source: Arc<dyn DatasetSource>,
    forecast: ForecastClient,
    readings: ReadingStore,
    alerts: AlertStore,
    ranges: VitalRangeTable,
    simulation: SimulationSettings,
    rng: Mutex<Box<dyn RandomSource>>,
}

impl Monitor {
    pub fn new(source: Arc<dyn DatasetSource>, forecast: ForecastClient) -> Self {
        Self {
            source,
            forecast,
            readings: ReadingStore::new(),
            alerts: AlertStore::new(),
            ranges: VitalRangeTable::default(),
            simulation: SimulationSettings::default(),
            rng: Mutex::new(Box::new(RngSource::from_entropy())),
        }
    }

    pub fn with_ranges(mut self, ranges: VitalRangeTable) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn with_simulation(mut self, simulation: SimulationSettings) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn with_random_source(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn alerts(&self) -> &AlertStore {
        &self.alerts
    }

    pub fn readings(&self) -> &ReadingStore {
        &self.readings
    }

    /// Loads the dataset if needed, extends every patient's timeline up to
    /// `now`, then returns the readings the caller asked for.
    #[instrument(skip(self, now))]
    pub async fn patient_data(
        &self,
        patient_id: Option<&str>,
        time_range_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reading>> {
        let mut history = self.readings.write().await;
        self.advance(&mut history, now).await?;
        let history = history.downgrade();
        query(history.readings(), patient_id, time_range_days, now)
    }

    /// Runs one load-and-expand cycle, returning how many readings were added.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut history = self.readings.write().await;
        self.advance(&mut history, now).await
    }

    async fn advance(&self, history: &mut ReadingHistory, now: DateTime<Utc>) -> Result<usize> {
        if !history.is_initialized() {
            let rows = self.source.readings().await.map_err(|e| {
                error!("Data initialization failed: {}", e);
                e
            })?;
            history.load(rows)?;
        }

        let generated = {
            let mut rng = self.rng.lock().await;
            TimelineExpander::new(&self.ranges, &self.simulation, &self.alerts)
                .expand(history.readings(), now, rng.as_mut())
                .await
        };

        let added = generated.len();
        history.append(generated);
        info!(added, total = history.readings().len(), "timeline advanced");
        Ok(added)
    }

    #[instrument(skip(self))]
    pub async fn anomaly_results(&self, patient_id: Option<&str>) -> Result<AnomalyResults> {
        let rows = self.source.anomaly_summaries().await?;
        Ok(match patient_id {
            Some(id) => AnomalyResults::Patient(rows.into_iter().find(|r| r.patient_id == id)),
            None => AnomalyResults::All(rows),
        })
    }

    pub async fn prediction(&self, patient_id: &str) -> Result<Value> {
        self.forecast.prediction(patient_id).await
    }
}
