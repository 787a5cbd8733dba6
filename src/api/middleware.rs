use actix_cors::Cors;
use tracing_actix_web::TracingLogger;

use crate::config::CorsConfig;

/// Any origin when none are configured, otherwise only the listed ones.
pub fn cors(config: &CorsConfig) -> Cors {
    if config.allowed_origins.is_empty() {
        return Cors::permissive();
    }

    config.allowed_origins.iter().fold(
        Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT"])
            .allow_any_header()
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}

/// Per-request tracing spans.
pub fn request_tracing() -> TracingLogger<tracing_actix_web::DefaultRootSpanBuilder> {
    TracingLogger::default()
}
