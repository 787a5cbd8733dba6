//! Filtering of the expanded reading history for callers.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};
use crate::models::Reading;

/// Selects readings for one patient, or the latest reading of every patient.
///
/// With `patient_id`, returns that patient's readings in history order and
/// fails with [`Error::PatientNotFound`] if there are none. With
/// `time_range_days`, drops readings older than `now` minus that many days;
/// a window reaching past the earliest representable instant keeps everything.
/// Without `patient_id`, keeps one reading per patient: the latest, with the
/// earlier entry winning a tie.
pub fn query(
    readings: &[Reading],
    patient_id: Option<&str>,
    time_range_days: Option<u32>,
    now: DateTime<Utc>,
) -> Result<Vec<Reading>> {
    let mut selected: Vec<&Reading> = readings.iter().collect();

    if let Some(id) = patient_id {
        selected.retain(|r| r.patient_id == id);
        if selected.is_empty() {
            return Err(Error::PatientNotFound(id.to_string()));
        }
    }

    if let Some(days) = time_range_days {
        if let Some(cutoff) = now.checked_sub_signed(Duration::days(i64::from(days))) {
            selected.retain(|r| r.recorded_at >= cutoff);
        }
    }

    if patient_id.is_none() {
        selected = latest_per_patient(selected);
    }

    Ok(selected.into_iter().cloned().collect())
}

fn latest_per_patient(readings: Vec<&Reading>) -> Vec<&Reading> {
    let mut latest: Vec<&Reading> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for reading in readings {
        match slots.get(reading.patient_id.as_str()) {
            Some(&slot) => {
                if reading.recorded_at > latest[slot].recorded_at {
                    latest[slot] = reading;
                }
            }
            None => {
                slots.insert(reading.patient_id.as_str(), latest.len());
                latest.push(reading);
            }
        }
    }

    latest
}
