//! Vitalwatch
//!
//! Main entry point for the Vitalwatch monitoring service.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vitalwatch::api::{self, middleware, ApiSettings};
use vitalwatch::config;
use vitalwatch::core::forecast::ForecastClient;
use vitalwatch::dataset::HttpCsvSource;
use vitalwatch::Monitor;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = config::load_config().context("Failed to load configuration")?;
    init_tracing(config.logging.json);

    let source = Arc::new(HttpCsvSource::new(
        config.dataset.readings_url.clone(),
        config.dataset.anomaly_results_url.clone(),
    ));
    let forecast = ForecastClient::new(&config.forecast.base_url)
        .with_context(|| format!("Invalid forecast base URL {}", config.forecast.base_url))?;

    // Create app state
    let monitor = web::Data::new(
        Monitor::new(source, forecast)
            .with_ranges(config.ranges.clone())
            .with_simulation(config.simulation.clone()),
    );
    let settings = web::Data::new(ApiSettings {
        expose_error_details: config.server.expose_error_details,
    });
    let cors = config.cors.clone();

    info!("Starting vitalwatch on {}:{}", config.server.host, config.server.port);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(monitor.clone())
            .app_data(settings.clone())
            .wrap(middleware::cors(&cors))
            .wrap(middleware::request_tracing())
            .configure(api::configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
