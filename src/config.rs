use serde::Deserialize;

/// Application configuration, sourced from the environment (and `.env` via
/// dotenvy in `main`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Expose Prometheus metrics when true.
    #[serde(default)]
    pub metrics_enabled: bool,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    /// Echo SQL statements at info level.
    #[serde(default)]
    pub sql_echo: bool,
}

fn default_database_url() -> String {
    "sqlite://stock_exchange.db".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            port: default_port(),
            metrics_enabled: false,
            metrics_path: default_metrics_path(),
            sql_echo: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
