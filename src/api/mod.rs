//! HTTP surface: alert review, patient data, anomaly summaries and forecasts.
//!
//! [`configure`] mounts every route both at the root and under `/api`.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::configure;

/// Response behaviour shared by the handlers.
#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    pub expose_error_details: bool,
}
