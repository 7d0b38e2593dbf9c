//! Configuration for the dental receptionist voice agent
//!
//! Settings are layered: `config/default.yaml` → `config/{env}.yaml` →
//! `RECEPTIONIST__*` environment variables. Loaded once at startup.

mod settings;

pub use settings::{
    load_settings, DialogueSettings, ObservabilityConfig, PersistenceConfig, ServerConfig,
    Settings, SpeechSettings, TelephonySettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
