//! Configuration module for jaql-model.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, CacheSettings, LoggingSettings, NarrationSettings, ServerSettings, Settings,
    SettingsError,
};
