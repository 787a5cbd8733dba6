//! Error type shared by the service, stores and HTTP layer.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("upstream request failed: {0}")]
    UpstreamRequest(#[from] reqwest::Error),

    #[error("Failed to fetch CSV: {status} {reason}")]
    UpstreamStatus { status: u16, reason: String },

    #[error("Error parsing CSV data")]
    Csv(#[from] csv::Error),

    #[error("No data found in CSV")]
    EmptyDataset,

    #[error("Patient not found")]
    PatientNotFound(String),

    #[error("Alert not found")]
    AlertNotFound(String),

    #[error("invalid alert: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("invalid alert: {0}")]
    InvalidAlert(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("{message}")]
    Forecast { status: u16, message: String },
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl Error {
    /// Internal detail worth showing a developer, if any.
    fn details(&self) -> Option<String> {
        match self {
            Error::UpstreamRequest(e) => Some(e.to_string()),
            Error::Csv(e) => Some(e.to_string()),
            _ => None,
        }
    }

    /// Builds the JSON error response, attaching internal details when asked.
    pub fn to_response(&self, expose_details: bool) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            details: if expose_details { self.details() } else { None },
        })
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::PatientNotFound(_) | Error::AlertNotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) | Error::InvalidAlert(_) | Error::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Forecast { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Error::UpstreamRequest(_)
            | Error::UpstreamStatus { .. }
            | Error::Csv(_)
            | Error::EmptyDataset => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.to_response(false)
    }
}
