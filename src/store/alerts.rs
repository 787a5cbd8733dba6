use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::core::timeline::{AlertSink, DispatchError};
use crate::error::{Error, Result};
use crate::models::{Alert, AlertPatch, AlertStatus, NewAlert};

#[derive(Default)]
struct AlertLog {
    alerts: Vec<Alert>,
    index: HashMap<Uuid, usize>,
}

/// In-memory alert list, kept in insertion order. Lives for the process.
#[derive(Default)]
pub struct AlertStore {
    inner: RwLock<AlertLog>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All alerts, or only `patient_id`'s, oldest first.
    pub async fn list(&self, patient_id: Option<&str>) -> Vec<Alert> {
        let log = self.inner.read().await;
        log.alerts
            .iter()
            .filter(|a| patient_id.map_or(true, |id| a.patient_id == id))
            .cloned()
            .collect()
    }

    #[cfg(test)]
    pub(crate) async fn get(&self, id: Uuid) -> Option<Alert> {
        let log = self.inner.read().await;
        log.index.get(&id).map(|&i| log.alerts[i].clone())
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.inner.read().await.alerts.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stores `alert` as pending under a fresh id.
    #[instrument(skip(self, alert), fields(patient_id = %alert.patient_id))]
    pub async fn add(&self, alert: NewAlert) -> Result<Alert> {
        alert.validate()?;

        let stored = Alert {
            id: Uuid::new_v4(),
            patient_id: alert.patient_id,
            status: AlertStatus::Pending,
            timestamp: alert.timestamp.unwrap_or_else(Utc::now),
            anomalies: alert.anomalies,
            prescription: alert.prescription,
        };

        let mut log = self.inner.write().await;
        let position = log.alerts.len();
        log.index.insert(stored.id, position);
        log.alerts.push(stored.clone());
        info!(alert_id = %stored.id, "alert size {}", log.alerts.len());

        Ok(stored)
    }

    /// Merges `patch` into the alert with `id`, keeping fields it leaves out.
    ///
    /// Status changes are not restricted; reopening an addressed alert is
    /// allowed but logged.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: AlertPatch) -> Result<Alert> {
        let not_found = || Error::AlertNotFound(id.to_string());
        let key = Uuid::parse_str(id).map_err(|_| not_found())?;

        let mut log = self.inner.write().await;
        let position = *log.index.get(&key).ok_or_else(not_found)?;
        let alert = &mut log.alerts[position];

        if let Some(anomalies) = &patch.anomalies {
            if anomalies.iter().any(|a| a.patient_id != alert.patient_id) {
                return Err(Error::InvalidAlert(format!(
                    "anomalies must belong to patient {}",
                    alert.patient_id
                )));
            }
        }

        if let Some(status) = patch.status {
            if alert.status == AlertStatus::Addressed && status == AlertStatus::Pending {
                warn!(alert_id = %alert.id, "alert reopened after being addressed");
            }
            alert.status = status;
        }
        if let Some(prescription) = patch.prescription {
            alert.prescription = Some(prescription);
        }
        if let Some(anomalies) = patch.anomalies {
            alert.anomalies = anomalies;
        }
        if let Some(timestamp) = patch.timestamp {
            alert.timestamp = timestamp;
        }

        Ok(alert.clone())
    }
}

#[async_trait]
impl AlertSink for AlertStore {
    async fn dispatch(&self, alert: NewAlert) -> Result<Alert, DispatchError> {
        self.add(alert).await.map_err(|e| DispatchError(e.to_string()))
    }
}
