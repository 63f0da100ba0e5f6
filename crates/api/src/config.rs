use domain::models::{IngestionMode, MAX_CITY_LENGTH};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub owner: OwnerConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Which entry store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Entries live only as long as the process.
    Memory,
    /// Entries are persisted to a SQLite database.
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,

    #[serde(default = "default_storage_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl StorageConfig {
    /// Pool settings for the persistence crate.
    pub fn database_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            connect_timeout_secs: self.connect_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerConfig {
    /// Owner used when a request carries no `X-Owner-Id` header.
    #[serde(default = "default_owner_id")]
    pub default_id: String,
}

impl Default for OwnerConfig {
    fn default() -> Self {
        Self {
            default_id: default_owner_id(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestionConfig {
    /// Whether a forecast fetch replaces or extends the owner's entries.
    #[serde(default)]
    pub mode: IngestionMode,
}

/// Forecast provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// OpenWeatherMap API base URL
    #[serde(default = "default_forecast_base_url")]
    pub base_url: String,

    /// Fallback API key when a request does not supply one
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_city")]
    pub default_city: String,

    #[serde(default = "default_units")]
    pub default_units: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_forecast_timeout")]
    pub timeout_secs: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_forecast_base_url(),
            api_key: String::new(),
            default_city: default_city(),
            default_units: default_units(),
            timeout_secs: default_forecast_timeout(),
        }
    }
}

/// How exported CSV files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportNaming {
    /// Every render overwrites `weather_forecast_data.csv`.
    #[default]
    Static,
    /// One file per owner and render time.
    Timestamped,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    #[serde(default)]
    pub export_naming: ExportNaming,

    #[serde(default = "default_canvas_width")]
    pub width: u32,

    #[serde(default = "default_canvas_height")]
    pub height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
            export_naming: ExportNaming::default(),
            width: default_canvas_width(),
            height: default_canvas_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    #[serde(default)]
    pub forecast_refresh_enabled: bool,

    #[serde(default = "default_refresh_interval_hours")]
    pub forecast_refresh_interval_hours: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            forecast_refresh_enabled: false,
            forecast_refresh_interval_hours: default_refresh_interval_hours(),
        }
    }
}

/// Smallest canvas that still leaves room for three panels.
pub const MIN_CANVAS_WIDTH: u32 = 200;
pub const MIN_CANVAS_HEIGHT: u32 = 300;

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_request_timeout() -> u64 {
    30
}
fn default_storage_backend() -> StorageBackend {
    StorageBackend::Sqlite
}
fn default_storage_url() -> String {
    "sqlite://weather_data.db".to_string()
}
fn default_max_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_owner_id() -> String {
    "default".to_string()
}
fn default_forecast_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}
fn default_city() -> String {
    "Bengaluru".to_string()
}
fn default_units() -> String {
    "metric".to_string()
}
fn default_forecast_timeout() -> u64 {
    10
}
fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}
fn default_canvas_width() -> u32 {
    1400
}
fn default_canvas_height() -> u32 {
    1000
}
fn default_refresh_interval_hours() -> u64 {
    6
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with WD__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("WD")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config from embedded defaults and overrides only, so tests
    /// do not depend on the working directory.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 5000
            request_timeout_secs = 30
            cors_origins = []

            [storage]
            backend = "memory"
            url = "sqlite::memory:"
            max_connections = 1
            connect_timeout_secs = 5

            [logging]
            level = "debug"
            format = "pretty"

            [owner]
            default_id = "default"

            [ingestion]
            mode = "append"

            [forecast]
            base_url = "http://127.0.0.1:9"
            api_key = ""
            default_city = "Bengaluru"
            default_units = "metric"
            timeout_secs = 5

            [dashboard]
            export_dir = "exports"
            export_naming = "static"
            width = 1400
            height = 1000

            [jobs]
            forecast_refresh_enabled = false
            forecast_refresh_interval_hours = 6
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::Sqlite && self.storage.url.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "WD__STORAGE__URL must be set when the sqlite backend is used".to_string(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "max_connections must be at least 1".to_string(),
            ));
        }

        if self.dashboard.width < MIN_CANVAS_WIDTH || self.dashboard.height < MIN_CANVAS_HEIGHT {
            return Err(ConfigValidationError::InvalidValue(format!(
                "Dashboard canvas must be at least {}x{}",
                MIN_CANVAS_WIDTH, MIN_CANVAS_HEIGHT
            )));
        }

        let city = &self.forecast.default_city;
        if city.trim().is_empty() || city.chars().count() > MAX_CITY_LENGTH {
            return Err(ConfigValidationError::InvalidValue(format!(
                "forecast.default_city must be 1 to {} characters",
                MAX_CITY_LENGTH
            )));
        }

        shared::validation::validate_units(&self.forecast.default_units).map_err(|_| {
            ConfigValidationError::InvalidValue(format!(
                "forecast.default_units must be one of: {}",
                shared::validation::SUPPORTED_UNITS.join(", ")
            ))
        })?;

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
