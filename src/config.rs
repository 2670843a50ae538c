use serde::{Deserialize, Deserializer};
use std::sync::{Mutex, OnceLock};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Custom deserializer for comma-separated strings
fn deserialize_comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(s.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

/// Application settings with environment variable support.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Server
    pub host: String,
    pub port: u16,

    // Scanner
    pub trivy_path: String,
    pub trivy_cache_dir: String,
    /// Wall-clock budget for the main scan subprocess. Must leave headroom
    /// under the caller's own deadline for response serialization.
    pub scan_timeout_seconds: u64,
    /// Independent short budget for the `--version` query.
    pub version_timeout_seconds: u64,
    /// Image scanned when a request does not name one.
    pub default_image: String,

    // Security
    #[serde(deserialize_with = "deserialize_comma_separated")]
    pub cors_allow_origins: Vec<String>,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl Settings {
    /// Create new settings instance from environment variables and .env file
    pub fn new() -> Result<Self, ConfigError> {
        Self::new_with_env_file(true)
    }

    /// Create new settings instance with optional .env file loading
    pub fn new_with_env_file(load_env_file: bool) -> Result<Self, ConfigError> {
        // Serialize settings construction to avoid cross-test environment races
        // Tests frequently mutate process env; locking ensures consistent reads
        static SETTINGS_BUILD_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        let build_mutex = SETTINGS_BUILD_MUTEX.get_or_init(|| Mutex::new(()));
        let _guard = build_mutex
            .lock()
            .expect("Failed to lock settings build mutex");

        // Load .env file if it exists and requested (skip during tests for determinism)
        #[cfg(not(test))]
        {
            if load_env_file {
                dotenvy::dotenv().ok();
            }
        }
        #[cfg(test)]
        let _ = load_env_file;

        let builder = config::Config::builder()
            // Server defaults
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            // Scanner defaults
            .set_default("trivy_path", "/usr/local/bin/trivy")?
            .set_default("trivy_cache_dir", "/tmp/trivy-cache")?
            .set_default("scan_timeout_seconds", 280)?
            .set_default("version_timeout_seconds", 10)?
            .set_default("default_image", "nginx:latest")?
            // Security defaults
            .set_default("cors_allow_origins", "*")?
            // Logging defaults
            .set_default("log_level", "INFO")?
            .set_default("log_format", "json")?
            // Environment variables override defaults
            .add_source(config::Environment::default());

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trivy_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "trivy_path must not be empty".to_string(),
            ));
        }
        if self.default_image.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_image must not be empty".to_string(),
            ));
        }
        if self.scan_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "scan_timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if self.version_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "version_timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if self.version_timeout_seconds >= self.scan_timeout_seconds {
            return Err(ConfigError::Validation(
                "version_timeout_seconds must be smaller than scan_timeout_seconds".to_string(),
            ));
        }
        Ok(())
    }
}
