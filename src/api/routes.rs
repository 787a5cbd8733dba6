use actix_web::web;

use super::handlers;

/// Mounts every route at the root and again under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .service(web::scope("/api").configure(resources));
    resources(cfg);
}

fn resources(cfg: &mut web::ServiceConfig) {
    cfg.route("/alerts", web::get().to(handlers::list_alerts))
        .route("/alerts", web::post().to(handlers::create_alert))
        .route("/alerts/{id}", web::put().to(handlers::update_alert))
        .route("/patient-data", web::get().to(handlers::patient_data))
        .route("/anomaly-results", web::get().to(handlers::anomaly_results))
        .route("/predictions/{patient_id}", web::get().to(handlers::prediction));
}
