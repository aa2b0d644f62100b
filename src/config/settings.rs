//! TOML-based configuration for jaql-model.
//!
//! Supports a config file (jaql.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [server]
//! url = "https://analytics.example.com"
//! token = "${JAQL_API_TOKEN}"
//! timeout_secs = 60
//!
//! [cache]
//! enabled = true
//! ttl_seconds = 600
//! max_entries = 256
//!
//! [narration]
//! verbosity = "High"
//! fallback = true
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Analytics server connection.
    pub server: ServerSettings,

    /// Data-load cache.
    pub cache: CacheSettings,

    /// Narration requests.
    pub narration: NarrationSettings,

    /// Log output.
    pub logging: LoggingSettings,
}

/// Analytics server connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the server.
    pub url: String,

    /// API token (supports ${ENV_VAR} expansion).
    pub token: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl ServerSettings {
    /// Get the token with environment variables expanded.
    pub fn resolved_token(&self) -> Result<Option<String>, SettingsError> {
        self.token.as_deref().map(expand_env_vars).transpose()
    }

    /// Get the base URL with environment variables expanded.
    pub fn resolved_url(&self) -> Result<String, SettingsError> {
        let url = expand_env_vars(&self.url)?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsError::InvalidConfig(format!(
                "server.url must be an http(s) URL, got \"{url}\""
            )));
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Data-load cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Enable result caching.
    pub enabled: bool,

    /// Cache TTL in seconds.
    pub ttl_seconds: u64,

    /// Maximum number of cached results.
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 600,
            max_entries: 256,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Narration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NarrationSettings {
    /// Narrative verbosity: "Low" or "High".
    pub verbosity: String,

    /// Retry against the legacy endpoint when the current one is missing.
    pub fallback: bool,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            verbosity: "High".to_string(),
            fallback: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `JAQL_LOG` is unset.
    pub level: String,

    /// Emit JSON lines instead of text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `JAQL_MODEL_CONFIG`
    /// 2. `./jaql.toml`
    /// 3. `~/.config/jaql-model/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("JAQL_MODEL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("jaql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("jaql-model").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(SettingsError::InvalidConfig(
                "cache.max_entries must be positive when the cache is enabled".to_string(),
            ));
        }
        match self.narration.verbosity.as_str() {
            "Low" | "High" => Ok(()),
            other => Err(SettingsError::InvalidConfig(format!(
                "narration.verbosity must be \"Low\" or \"High\", got \"{other}\""
            ))),
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' {
            // Check for ${VAR} or $VAR
            if chars.peek() == Some(&'{') {
                chars.next(); // consume '{'
                let mut var_name = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(ch);
                    chars.next();
                }
                let value = env::var(&var_name)
                    .map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
                result.push_str(&value);
            } else {
                // $VAR (ends at non-alphanumeric/underscore)
                let mut var_name = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        var_name.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if var_name.is_empty() {
                    // Just a lone $, keep it
                    result.push('$');
                } else {
                    let value = env::var(&var_name)
                        .map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
                    result.push_str(&value);
                }
            }
        } else {
            result.push(c);
        }
    }

    Ok(result)
}
