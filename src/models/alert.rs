use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::vitals::{VitalParameter, VitalRange};

/// A single out-of-range observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub patient_id: String,
    pub parameter: VitalParameter,
    pub value: f64,
    pub normal_range: VitalRange,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Pending,
    Addressed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub patient_id: String,
    pub status: AlertStatus,
    pub timestamp: DateTime<Utc>,
    pub anomalies: Vec<Anomaly>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
}

/// An alert as submitted for storage, before it has an id or status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "anomalies_match_patient"))]
pub struct NewAlert {
    #[validate(length(min = 1))]
    pub patient_id: String,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prescription: Option<String>,
}

impl NewAlert {
    pub fn new(patient_id: impl Into<String>, anomalies: Vec<Anomaly>, timestamp: DateTime<Utc>) -> Self {
        Self {
            patient_id: patient_id.into(),
            anomalies,
            timestamp: Some(timestamp),
            prescription: None,
        }
    }
}

fn anomalies_match_patient(alert: &NewAlert) -> Result<(), ValidationError> {
    if alert.anomalies.iter().all(|a| a.patient_id == alert.patient_id) {
        Ok(())
    } else {
        Err(ValidationError::new("anomaly_patient_mismatch"))
    }
}

/// Fields a reviewer may change on a stored alert. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPatch {
    #[serde(default)]
    pub status: Option<AlertStatus>,
    #[serde(default)]
    pub prescription: Option<String>,
    #[serde(default)]
    pub anomalies: Option<Vec<Anomaly>>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl AlertPatch {
    /// The usual review action: mark addressed with a prescription.
    pub fn addressed(prescription: impl Into<String>) -> Self {
        Self {
            status: Some(AlertStatus::Addressed),
            prescription: Some(prescription.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anomaly(patient_id: &str) -> Anomaly {
        Anomaly {
            patient_id: patient_id.into(),
            parameter: VitalParameter::HeartRate,
            value: 131.2,
            normal_range: VitalRange::new(55.0, 110.0),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn new_alert_rejects_foreign_anomalies() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        assert!(NewAlert::new("P1", vec![anomaly("P1")], now).validate().is_ok());
        assert!(NewAlert::new("P1", vec![anomaly("P1"), anomaly("P2")], now).validate().is_err());
        assert!(NewAlert::new("", vec![], now).validate().is_err());
    }

    #[test]
    fn alert_json_shape() {
        let alert = Alert {
            id: Uuid::nil(),
            patient_id: "P1".into(),
            status: AlertStatus::Pending,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            anomalies: vec![anomaly("P1")],
            prescription: None,
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["patientId"], "P1");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["anomalies"][0]["parameter"], "Heart Rate");
        assert_eq!(json["anomalies"][0]["normalRange"]["max"], 110.0);
        assert!(json.get("prescription").is_none());
    }

    #[test]
    fn patch_ignores_immutable_fields() {
        let patch: AlertPatch =
            serde_json::from_str(r#"{"id": "x", "patientId": "P9", "status": "addressed"}"#).unwrap();
        assert_eq!(patch.status, Some(AlertStatus::Addressed));
        assert_eq!(patch.prescription, None);
    }
}
