//! Monitored vital parameters and their acceptable ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A monitored vital sign.
///
/// Variant order is the order in which readings are scanned and generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VitalParameter {
    #[serde(rename = "Respiratory Rate")]
    RespiratoryRate,
    #[serde(rename = "Heart Rate")]
    HeartRate,
    #[serde(rename = "BP Systolic")]
    BpSystolic,
    #[serde(rename = "BP Diastolic")]
    BpDiastolic,
    #[serde(rename = "Temperature")]
    Temperature,
    #[serde(rename = "SpO2")]
    SpO2,
}

impl VitalParameter {
    pub const ALL: [VitalParameter; 6] = [
        VitalParameter::RespiratoryRate,
        VitalParameter::HeartRate,
        VitalParameter::BpSystolic,
        VitalParameter::BpDiastolic,
        VitalParameter::Temperature,
        VitalParameter::SpO2,
    ];

    /// Human-readable label, as shown on alerts.
    pub fn label(self) -> &'static str {
        match self {
            VitalParameter::RespiratoryRate => "Respiratory Rate",
            VitalParameter::HeartRate => "Heart Rate",
            VitalParameter::BpSystolic => "BP Systolic",
            VitalParameter::BpDiastolic => "BP Diastolic",
            VitalParameter::Temperature => "Temperature",
            VitalParameter::SpO2 => "SpO2",
        }
    }
}

impl fmt::Display for VitalParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive acceptable band for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalRange {
    pub min: f64,
    pub max: f64,
}

impl VitalRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Range lookup keyed by [`VitalParameter`].
///
/// Deserializes from the `[ranges]` config section; any parameter left out
/// keeps its clinical default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalRangeTable {
    pub respiratory_rate: VitalRange,
    pub heart_rate: VitalRange,
    pub bp_systolic: VitalRange,
    pub bp_diastolic: VitalRange,
    pub temperature: VitalRange,
    pub spo2: VitalRange,
}

impl Default for VitalRangeTable {
    fn default() -> Self {
        Self {
            respiratory_rate: VitalRange::new(12.0, 20.0),
            heart_rate: VitalRange::new(55.0, 110.0),
            bp_systolic: VitalRange::new(80.0, 130.0),
            bp_diastolic: VitalRange::new(55.0, 85.0),
            temperature: VitalRange::new(36.1, 37.8),
            spo2: VitalRange::new(93.0, 102.0),
        }
    }
}

impl VitalRangeTable {
    pub fn range(&self, parameter: VitalParameter) -> VitalRange {
        match parameter {
            VitalParameter::RespiratoryRate => self.respiratory_rate,
            VitalParameter::HeartRate => self.heart_rate,
            VitalParameter::BpSystolic => self.bp_systolic,
            VitalParameter::BpDiastolic => self.bp_diastolic,
            VitalParameter::Temperature => self.temperature,
            VitalParameter::SpO2 => self.spo2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        let range = VitalRange::new(12.0, 20.0);
        assert!(range.contains(12.0));
        assert!(range.contains(20.0));
        assert!(!range.contains(11.9));
        assert!(!range.contains(20.1));
    }

    #[test]
    fn parameter_serializes_as_label() {
        for parameter in VitalParameter::ALL {
            let json = serde_json::to_string(&parameter).unwrap();
            assert_eq!(json, format!("\"{}\"", parameter.label()));
        }
    }

    #[test]
    fn partial_table_keeps_defaults() {
        let table: VitalRangeTable =
            serde_json::from_str(r#"{"heart_rate": {"min": 50.0, "max": 120.0}}"#).unwrap();
        assert_eq!(table.range(VitalParameter::HeartRate), VitalRange::new(50.0, 120.0));
        assert_eq!(table.range(VitalParameter::SpO2), VitalRange::new(93.0, 102.0));
    }
}
