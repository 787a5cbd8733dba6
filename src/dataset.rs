//! External vitals datasets, published as CSV over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::reading::parse_timestamp;
use crate::models::{AnomalySummary, Reading};

/// Supplies the baseline readings and the precomputed anomaly summaries.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn readings(&self) -> Result<Vec<Reading>>;
    async fn anomaly_summaries(&self) -> Result<Vec<AnomalySummary>>;
}

/// One row of the readings CSV before its timestamp is interpreted.
#[derive(Debug, Deserialize)]
struct ReadingRow {
    #[serde(rename = "Patient_ID")]
    patient_id: String,
    #[serde(rename = "Day", default)]
    day: String,
    #[serde(rename = "Time_of_Recording", default)]
    time_of_recording: String,
    #[serde(rename = "Age", default)]
    age: String,
    #[serde(rename = "Gender", default)]
    gender: String,
    #[serde(rename = "Respiratory_Rate", default)]
    respiratory_rate: String,
    #[serde(rename = "Heart_Rate", default)]
    heart_rate: String,
    #[serde(rename = "BP_Systolic", default)]
    bp_systolic: String,
    #[serde(rename = "BP_Diastolic", default)]
    bp_diastolic: String,
    #[serde(rename = "Temperature (°C)", default)]
    temperature: String,
    #[serde(rename = "SpO2 (%)", default)]
    spo2: String,
}

impl ReadingRow {
    fn into_reading(self) -> Option<Reading> {
        let Some(recorded_at) = parse_timestamp(&self.time_of_recording) else {
            warn!(
                patient_id = %self.patient_id,
                "Dropping row with unreadable timestamp {:?}",
                self.time_of_recording
            );
            return None;
        };
        Some(Reading {
            patient_id: self.patient_id,
            day: self.day,
            recorded_at,
            age: self.age,
            gender: self.gender,
            respiratory_rate: self.respiratory_rate,
            heart_rate: self.heart_rate,
            bp_systolic: self.bp_systolic,
            bp_diastolic: self.bp_diastolic,
            temperature: self.temperature,
            spo2: self.spo2,
        })
    }
}

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes())
}

/// Parses the readings CSV. A malformed row fails the whole dataset; a row
/// with an unreadable timestamp is dropped.
pub fn parse_readings(text: &str) -> Result<Vec<Reading>> {
    let mut readings = Vec::new();
    for row in csv_reader(text).deserialize::<ReadingRow>() {
        if let Some(reading) = row?.into_reading() {
            readings.push(reading);
        }
    }
    Ok(readings)
}

pub fn parse_anomaly_summaries(text: &str) -> Result<Vec<AnomalySummary>> {
    csv_reader(text)
        .deserialize::<AnomalySummary>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Fetches both datasets from fixed URLs on every call.
pub struct HttpCsvSource {
    client: Client,
    readings_url: String,
    anomaly_results_url: String,
}

impl HttpCsvSource {
    pub fn new(readings_url: impl Into<String>, anomaly_results_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            readings_url: readings_url.into(),
            anomaly_results_url: anomaly_results_url.into(),
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        info!("Fetching CSV data from: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl DatasetSource for HttpCsvSource {
    #[instrument(skip(self))]
    async fn readings(&self) -> Result<Vec<Reading>> {
        let text = self.fetch(&self.readings_url).await?;
        parse_readings(&text)
    }

    #[instrument(skip(self))]
    async fn anomaly_summaries(&self) -> Result<Vec<AnomalySummary>> {
        let text = self.fetch(&self.anomaly_results_url).await?;
        parse_anomaly_summaries(&text)
    }
}

/// Fixed in-memory datasets.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub readings: Vec<Reading>,
    pub summaries: Vec<AnomalySummary>,
}

#[async_trait]
impl DatasetSource for StaticSource {
    async fn readings(&self) -> Result<Vec<Reading>> {
        Ok(self.readings.clone())
    }

    async fn anomaly_summaries(&self) -> Result<Vec<AnomalySummary>> {
        Ok(self.summaries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const READINGS_CSV: &str = "\
Patient_ID , Day,Time_of_Recording,Age,Gender,Respiratory_Rate,Heart_Rate,BP_Systolic,BP_Diastolic, Temperature (°C),SpO2 (%),Ward
P1,1,2024-03-01 08:00:00,64,M,16,88,124,82,36.9,97,ICU
P2,1,2024-03-01T08:05:00Z,51,F,18,abc,118,77,37.1,95,ICU

P1,1,not a time,64,M,16,88,124,82,36.9,97,ICU
";

    const SUMMARY_CSV: &str = "\
Patient_ID,Last_1_day,Last_7_days,Last_10_days
P1,2,9,14
P2,0,1,1
";

    #[test]
    fn parses_readings_with_trimmed_headers() {
        let readings = parse_readings(READINGS_CSV).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].patient_id, "P1");
        assert_eq!(readings[0].temperature, "36.9");
        assert_eq!(
            readings[0].recorded_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
        );
        assert_eq!(readings[1].heart_rate, "abc");
    }

    #[test]
    fn ragged_rows_fail_the_dataset() {
        let text = "Patient_ID,Time_of_Recording\nP1,2024-03-01 08:00:00,extra\n";
        assert!(matches!(parse_readings(text), Err(Error::Csv(_))));
    }

    #[test]
    fn parses_anomaly_summaries() {
        let rows = parse_anomaly_summaries(SUMMARY_CSV).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].last_7_days, "9");
    }

    #[tokio::test]
    async fn http_source_fetches_both_datasets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vitals.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(READINGS_CSV))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/anomalies.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUMMARY_CSV))
            .mount(&server)
            .await;

        let source = HttpCsvSource::new(
            format!("{}/vitals.csv", server.uri()),
            format!("{}/anomalies.csv", server.uri()),
        );
        assert_eq!(source.readings().await.unwrap().len(), 2);
        assert_eq!(source.anomaly_summaries().await.unwrap()[1].patient_id, "P2");
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = HttpCsvSource::new(server.uri(), server.uri());
        let err = source.readings().await.unwrap_err();
        assert!(matches!(err, Error::UpstreamStatus { status: 503, .. }));
        assert_eq!(err.to_string(), "Failed to fetch CSV: 503 Service Unavailable");
    }
}
