//! Vitalwatch core library
//!
//! Patient vitals monitoring: range-based anomaly detection, simulated
//! realtime readings, and a reviewable alert list, served over HTTP.

pub mod api;
pub mod core;
pub mod dataset;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use error::{Error, Result};
pub use service::Monitor;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    use crate::core::SimulationSettings;
    use crate::models::VitalRangeTable;

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub struct Config {
        pub server: ServerConfig,
        pub dataset: DatasetConfig,
        pub forecast: ForecastConfig,
        pub simulation: SimulationSettings,
        pub ranges: VitalRangeTable,
        pub logging: LoggingConfig,
        pub cors: CorsConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
        /// Include internal error details in 500 responses.
        pub expose_error_details: bool,
    }

    impl Default for ServerConfig {
        fn default() -> Self {
            Self {
                host: "127.0.0.1".into(),
                port: 8080,
                expose_error_details: false,
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct DatasetConfig {
        pub readings_url: String,
        pub anomaly_results_url: String,
    }

    impl Default for DatasetConfig {
        fn default() -> Self {
            Self {
                readings_url: "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/data_sm_new_1_final-N5vhrezqo00Lmh7SFYMyn8wDlZoRDS.csv".into(),
                anomaly_results_url: "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/anomaly_results_final_2200-UVge1QiiokyzQ9NK6qgtXMRa2G20WZ.csv".into(),
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct ForecastConfig {
        pub base_url: String,
    }

    impl Default for ForecastConfig {
        fn default() -> Self {
            Self {
                base_url: "http://0.0.0.0:8000".into(),
            }
        }
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub struct LoggingConfig {
        pub json: bool,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub struct CorsConfig {
        /// Empty means any origin.
        pub allowed_origins: Vec<String>,
    }

    /// Load configuration from file
    pub fn load_config() -> Result<Config, ::config::ConfigError> {
        let env = std::env::var("VITALWATCH_ENV").unwrap_or_else(|_| "development".into());

        ::config::Config::builder()
            // Start with default settings
            .add_source(::config::File::with_name("config/default").required(false))
            // Override with environment-specific settings
            .add_source(::config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables, e.g. VITALWATCH_SERVER__PORT
            .add_source(
                ::config::Environment::with_prefix("VITALWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

}
