//! Main settings module

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    /// Validated like production
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Slip upload directory
    #[serde(default)]
    pub storage: StorageConfig,

    /// Text-recognition sidecar
    #[serde(default)]
    pub ocr: OcrSettings,

    /// Ollama language model
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub locale: LocaleConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_endpoints()?;
        self.validate_locale()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_upload_bytes".to_string(),
                message: "Upload limit must be greater than 0".to_string(),
            });
        }

        if self.environment.is_production() && !self.server.cors_enabled {
            return Err(ConfigError::InvalidValue {
                field: "server.cors_enabled".to_string(),
                message: "CORS can only be disabled in development".to_string(),
            });
        }

        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".to_string(),
                message: "Database path cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    fn validate_endpoints(&self) -> Result<(), ConfigError> {
        validate_endpoint("ocr.endpoint", &self.ocr.endpoint)?;
        validate_endpoint("llm.endpoint", &self.llm.endpoint)?;

        if self.ocr.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ocr.timeout_seconds".to_string(),
                message: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_seconds".to_string(),
                message: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "llm.model".to_string(),
                message: "Model name cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    fn validate_locale(&self) -> Result<(), ConfigError> {
        if !(-12..=14).contains(&self.locale.utc_offset_hours) {
            return Err(ConfigError::InvalidValue {
                field: "locale.utc_offset_hours".to_string(),
                message: format!(
                    "Must be between -12 and 14, got {}",
                    self.locale.utc_offset_hours
                ),
            });
        }
        Ok(())
    }
}

fn validate_endpoint(field: &str, endpoint: &str) -> Result<(), ConfigError> {
    if endpoint.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: "Endpoint cannot be empty".to_string(),
        });
    }
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("Endpoint must start with http:// or https://, got {}", endpoint),
        });
    }
    Ok(())
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins. Empty means localhost only.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum slip upload size
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_true() -> bool {
    true
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path
    #[serde(default = "default_database_path")]
    pub path: String,
}

fn default_database_path() -> String {
    "./cash-track.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSettings {
    #[serde(default = "default_ocr_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_ocr_timeout")]
    pub timeout_seconds: u64,
}

fn default_ocr_endpoint() -> String {
    "http://localhost:8001".to_string()
}
fn default_ocr_timeout() -> u64 {
    30
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            endpoint: default_ocr_endpoint(),
            timeout_seconds: default_ocr_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Ollama base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub temperature: Option<f32>,

    /// Ollama keep_alive, e.g. "5m"
    #[serde(default)]
    pub keep_alive: Option<String>,
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_llm_model() -> String {
    "llama3.2".to_string()
}
fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            timeout_seconds: default_llm_timeout(),
            temperature: None,
            keep_alive: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Offset used to compute "today" (Asia/Bangkok by default)
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

fn default_utc_offset() -> i32 {
    7
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Flat variables kept for existing deployments, mapped onto settings keys
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("SERVER_PORT", "server.port"),
    ("DATABASE_URL", "database.path"),
    ("UPLOAD_DIR", "storage.upload_dir"),
    ("OCR_ENDPOINT", "ocr.endpoint"),
    ("OLLAMA_URL", "llm.endpoint"),
    ("OLLAMA_MODEL", "llm.model"),
];

fn apply_legacy_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in LEGACY_ENV_KEYS {
        let value = lookup(var).filter(|value| !value.trim().is_empty());
        builder = builder.set_override_option(*key, value)?;
    }
    Ok(builder)
}

/// Load settings from `config/` in the working directory and the process environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env, &|var| std::env::var(var).ok())
}

/// Load settings from a config directory with an explicit legacy-variable lookup
pub fn load_settings_from(
    dir: &Path,
    env: Option<&str>,
    legacy_lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        let env_path = dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("CASH_TRACK")
            .separator("__")
            .try_parsing(true),
    );

    builder = apply_legacy_overrides(builder, legacy_lookup)?;

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
