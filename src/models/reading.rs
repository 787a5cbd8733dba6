use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::vitals::VitalParameter;

/// One vitals observation for a patient.
///
/// Vital fields keep the text they arrived with; a value that does not parse
/// is skipped when the reading is scanned rather than rejected at ingest.
/// JSON keys match the source dataset's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "Patient_ID")]
    pub patient_id: String,
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "Time_of_Recording")]
    pub recorded_at: DateTime<Utc>,
    #[serde(rename = "Age")]
    pub age: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Respiratory_Rate")]
    pub respiratory_rate: String,
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: String,
    #[serde(rename = "BP_Systolic")]
    pub bp_systolic: String,
    #[serde(rename = "BP_Diastolic")]
    pub bp_diastolic: String,
    #[serde(rename = "Temperature (°C)")]
    pub temperature: String,
    #[serde(rename = "SpO2 (%)")]
    pub spo2: String,
}

impl Reading {
    /// Raw text recorded for `parameter`.
    pub fn raw(&self, parameter: VitalParameter) -> &str {
        match parameter {
            VitalParameter::RespiratoryRate => &self.respiratory_rate,
            VitalParameter::HeartRate => &self.heart_rate,
            VitalParameter::BpSystolic => &self.bp_systolic,
            VitalParameter::BpDiastolic => &self.bp_diastolic,
            VitalParameter::Temperature => &self.temperature,
            VitalParameter::SpO2 => &self.spo2,
        }
    }

    /// Numeric value of `parameter`, or `None` when the text is not a number.
    pub fn value(&self, parameter: VitalParameter) -> Option<f64> {
        self.raw(parameter)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
    }

    pub(crate) fn raw_mut(&mut self, parameter: VitalParameter) -> &mut String {
        match parameter {
            VitalParameter::RespiratoryRate => &mut self.respiratory_rate,
            VitalParameter::HeartRate => &mut self.heart_rate,
            VitalParameter::BpSystolic => &mut self.bp_systolic,
            VitalParameter::BpDiastolic => &mut self.bp_diastolic,
            VitalParameter::Temperature => &mut self.temperature,
            VitalParameter::SpO2 => &mut self.spo2,
        }
    }

    /// Moves the reading to `timestamp`, keeping `Day` in step with it.
    pub(crate) fn set_recorded_at(&mut self, timestamp: DateTime<Utc>) {
        self.recorded_at = timestamp;
        self.day = timestamp.day().to_string();
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Parses a recording timestamp as found in the dataset.
///
/// Zone-less forms are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Precomputed anomaly counts for one patient, passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    #[serde(rename = "Patient_ID")]
    pub patient_id: String,
    #[serde(rename = "Last_1_day", default)]
    pub last_1_day: String,
    #[serde(rename = "Last_7_days", default)]
    pub last_7_days: String,
    #[serde(rename = "Last_10_days", default)]
    pub last_10_days: String,
}
