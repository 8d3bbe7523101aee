use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::formatter::CompensationFormat;
use crate::core::viewport::{self, ViewportConfig};
use crate::core::EngineConfig;
use crate::models::{BoundingBox, CameraView};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub map: MapSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Supabase,
    Seed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: String::new(),
            api_key: String::new(),
            timeout_secs: None,
        }
    }
}

impl StoreSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(30))
    }
}

fn default_backend() -> StoreBackend { StoreBackend::Supabase }

#[derive(Debug, Clone, Deserialize)]
pub struct MapSettings {
    #[serde(default = "default_center_lon")]
    pub default_center_lon: f64,
    #[serde(default = "default_center_lat")]
    pub default_center_lat: f64,
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,
    #[serde(default)]
    pub bounds: BoundsSettings,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: f64,
    #[serde(default = "default_focus_duration_ms")]
    pub focus_duration_ms: u64,
    #[serde(default = "default_currency_suffix")]
    pub currency_suffix: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_center_lon: default_center_lon(),
            default_center_lat: default_center_lat(),
            default_zoom: default_zoom(),
            bounds: BoundsSettings::default(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            focus_zoom: default_focus_zoom(),
            focus_duration_ms: default_focus_duration_ms(),
            currency_suffix: default_currency_suffix(),
        }
    }
}

fn default_center_lon() -> f64 { viewport::DEFAULT_CENTER_LON }
fn default_center_lat() -> f64 { viewport::DEFAULT_CENTER_LAT }
fn default_zoom() -> f64 { viewport::DEFAULT_ZOOM }
fn default_min_zoom() -> f64 { viewport::MIN_ZOOM }
fn default_max_zoom() -> f64 { viewport::MAX_ZOOM }
fn default_focus_zoom() -> f64 { viewport::FOCUS_ZOOM }
fn default_focus_duration_ms() -> u64 { viewport::FOCUS_DURATION_MS }
fn default_currency_suffix() -> String { "€".to_string() }

/// Navigation limits, south-west to north-east corner
#[derive(Debug, Clone, Deserialize)]
pub struct BoundsSettings {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Default for BoundsSettings {
    fn default() -> Self {
        let b = viewport::DEFAULT_BOUNDS;
        Self {
            west: b.min_lon,
            south: b.min_lat,
            east: b.max_lon,
            north: b.max_lat,
        }
    }
}

impl MapSettings {
    pub fn viewport_config(&self) -> ViewportConfig {
        ViewportConfig {
            default_view: CameraView {
                latitude: self.default_center_lat,
                longitude: self.default_center_lon,
                zoom: self.default_zoom,
            },
            bounds: BoundingBox::new(
                self.bounds.west,
                self.bounds.south,
                self.bounds.east,
                self.bounds.north,
            ),
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            focus_zoom: self.focus_zoom,
            focus_duration_ms: self.focus_duration_ms,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshSettings {
    /// Seconds between store fetches; 0 disables the periodic refresh
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_interval(),
        }
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }
}

fn default_refresh_interval() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CARTE__)
    /// 5. SUPABASE_URL / SUPABASE_ANON_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CARTE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CARTE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CARTE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject map limits the viewport could not honour, and incomplete store settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.map
            .viewport_config()
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid map settings: {}", e)))?;

        if self.store.backend == StoreBackend::Supabase
            && (self.store.url.is_empty() || self.store.api_key.is_empty())
        {
            return Err(ConfigError::Message(
                "store.url and store.api_key are required for the supabase backend".to_string(),
            ));
        }

        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            viewport: self.map.viewport_config(),
            compensation: CompensationFormat::with_currency(self.map.currency_suffix.clone()),
        }
    }
}

/// Apply the conventional Supabase variables on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("SUPABASE_URL") {
        builder = builder.set_override("store.url", url)?;
    }
    if let Ok(key) = env::var("SUPABASE_ANON_KEY") {
        builder = builder.set_override("store.api_key", key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    #[test]
    fn test_defaults_match_country_overview() {
        let map = MapSettings::default();
        let config = map.viewport_config();

        assert_eq!(config, ViewportConfig::default());
        assert_eq!(map.currency_suffix, "€");
    }

    #[test]
    fn test_seed_backend_needs_no_credentials() {
        let settings = from_toml("[store]\nbackend = \"seed\"").unwrap();

        assert_eq!(settings.store.backend, StoreBackend::Seed);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.refresh.interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_supabase_backend_requires_credentials() {
        assert!(from_toml("[store]\nbackend = \"supabase\"").is_err());

        let settings = from_toml(
            "[store]\nurl = \"https://project.supabase.co\"\napi_key = \"anon\"\ntimeout_secs = 10",
        )
        .unwrap();
        assert_eq!(settings.store.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_map_settings_rejected() {
        let err = from_toml("[store]\nbackend = \"seed\"\n[map]\nmin_zoom = 19.0").unwrap_err();
        assert!(err.to_string().contains("Invalid map settings"));
    }

    #[test]
    fn test_refresh_disabled() {
        let settings = from_toml("[store]\nbackend = \"seed\"\n[refresh]\ninterval_secs = 0").unwrap();
        assert_eq!(settings.refresh.interval(), None);
    }

    #[test]
    fn test_engine_config_uses_currency() {
        let settings = from_toml("[store]\nbackend = \"seed\"\n[map]\ncurrency_suffix = \"EUR\"").unwrap();
        let engine = settings.engine_config();
        assert_eq!(engine.compensation.format(Some(5000), None), "from 5,000 EUR");
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "compact");
    }
}
