use reqwest::Client;
use serde_json::Value;
use tracing::{error, instrument};
use url::Url;

use crate::error::{Error, Result};

const FALLBACK_MESSAGE: &str = "Failed to fetch prediction";
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Client for the external vitals forecasting service.
pub struct ForecastClient {
    client: Client,
    base_url: Url,
}

impl ForecastClient {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    fn prediction_url(&self, patient_id: &str) -> Option<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push("predictions")
            .push(patient_id);
        Some(url)
    }

    /// Fetches the forecast for `patient_id`, passing the upstream JSON through.
    ///
    /// An upstream error status is kept, with the upstream `detail` as the
    /// message when it has one.
    #[instrument(skip(self))]
    pub async fn prediction(&self, patient_id: &str) -> Result<Value> {
        let internal = || Error::Forecast {
            status: 500,
            message: INTERNAL_MESSAGE.to_string(),
        };

        let url = self.prediction_url(patient_id).ok_or_else(internal)?;
        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Error fetching prediction: {}", e);
            internal()
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_owned));
            return Err(Error::Forecast {
                status: status.as_u16(),
                message: detail.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            error!("Error decoding prediction: {}", e);
            internal()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn passes_successful_predictions_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/predictions/P12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"heart_rate": [81.0, 83.5]})))
            .mount(&server)
            .await;

        let client = ForecastClient::new(&server.uri()).unwrap();
        let body = client.prediction("P12").await.unwrap();
        assert_eq!(body, json!({"heart_rate": [81.0, 83.5]}));
    }

    #[tokio::test]
    async fn keeps_upstream_status_and_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/predictions/P404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "No model for patient"})))
            .mount(&server)
            .await;

        let client = ForecastClient::new(&server.uri()).unwrap();
        let err = client.prediction("P404").await.unwrap_err();
        assert!(matches!(err, Error::Forecast { status: 404, ref message } if message == "No model for patient"));
    }

    #[tokio::test]
    async fn falls_back_when_error_has_no_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = ForecastClient::new(&server.uri()).unwrap();
        let err = client.prediction("P1").await.unwrap_err();
        assert!(matches!(err, Error::Forecast { status: 502, ref message } if message == FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn unreachable_service_is_internal_error() {
        let client = ForecastClient::new("http://127.0.0.1:9").unwrap();
        let err = client.prediction("P1").await.unwrap_err();
        assert!(matches!(err, Error::Forecast { status: 500, ref message } if message == INTERNAL_MESSAGE));
    }
}
