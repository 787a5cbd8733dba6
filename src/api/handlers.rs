use actix_web::{web, HttpResponse, ResponseError};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use super::ApiSettings;
use crate::error::{Error, Result};
use crate::models::{AlertPatch, NewAlert};
use crate::service::Monitor;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientFilter {
    pub patient_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDataQuery {
    pub patient_id: Option<String>,
    pub time_range: Option<String>,
}

/// Blank query values count as absent; anything else is passed through as sent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn parse_time_range(value: Option<&str>) -> Result<Option<u32>> {
    value
        .map(|days| {
            days.parse::<u32>()
                .map_err(|_| Error::InvalidQuery(format!("timeRange must be a whole number of days, got {days:?}")))
        })
        .transpose()
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_alerts(
    monitor: web::Data<Monitor>,
    query: web::Query<PatientFilter>,
) -> HttpResponse {
    let alerts = monitor.alerts().list(present(&query.patient_id)).await;
    HttpResponse::Ok().json(alerts)
}

pub async fn create_alert(
    monitor: web::Data<Monitor>,
    body: web::Json<NewAlert>,
) -> Result<HttpResponse> {
    let alert = monitor.alerts().add(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(alert))
}

pub async fn update_alert(
    monitor: web::Data<Monitor>,
    id: web::Path<String>,
    body: web::Json<AlertPatch>,
) -> Result<HttpResponse> {
    let alert = monitor.alerts().update(&id, body.into_inner()).await.map_err(|e| {
        if let Error::AlertNotFound(id) = &e {
            info!(alert_id = %id, "update for unknown alert");
        }
        e
    })?;
    Ok(HttpResponse::Ok().json(alert))
}

pub async fn patient_data(
    monitor: web::Data<Monitor>,
    settings: web::Data<ApiSettings>,
    query: web::Query<PatientDataQuery>,
) -> HttpResponse {
    let result = match parse_time_range(present(&query.time_range)) {
        Ok(days) => monitor.patient_data(present(&query.patient_id), days, Utc::now()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(readings) => HttpResponse::Ok().json(readings),
        Err(e) => {
            if e.status_code().is_server_error() {
                error!("GET request failed: {}", e);
            }
            e.to_response(settings.expose_error_details)
        }
    }
}

pub async fn anomaly_results(
    monitor: web::Data<Monitor>,
    settings: web::Data<ApiSettings>,
    query: web::Query<PatientFilter>,
) -> HttpResponse {
    match monitor.anomaly_results(present(&query.patient_id)).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => {
            error!("Anomaly results request failed: {}", e);
            e.to_response(settings.expose_error_details)
        }
    }
}

pub async fn prediction(
    monitor: web::Data<Monitor>,
    patient_id: web::Path<String>,
) -> Result<HttpResponse> {
    let forecast = monitor.prediction(&patient_id).await?;
    Ok(HttpResponse::Ok().json(forecast))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(present(&Some("  ".into())), None);
        assert_eq!(present(&Some("P1".into())), Some("P1"));
        assert_eq!(present(&Some(" P1 ".into())), Some(" P1 "));
        assert_eq!(present(&None), None);
    }

    #[test]
    fn time_range_must_be_whole_days() {
        assert_eq!(parse_time_range(Some("7")).unwrap(), Some(7));
        assert_eq!(parse_time_range(None).unwrap(), None);
        assert!(matches!(parse_time_range(Some("week")), Err(Error::InvalidQuery(_))));
    }
}
