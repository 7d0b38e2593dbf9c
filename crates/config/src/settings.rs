//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Dialogue model configuration
    #[serde(default)]
    pub dialogue: DialogueSettings,

    /// Speech synthesis configuration
    #[serde(default)]
    pub speech: SpeechSettings,

    /// Telephony (call-control) configuration
    #[serde(default)]
    pub telephony: TelephonySettings,

    /// Persistence configuration (ScyllaDB)
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dialogue.model_preferences.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.model_preferences".to_string(),
                message: "At least one model name is required".to_string(),
            });
        }
        if self.telephony.gather_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "telephony.gather_timeout_secs".to_string(),
                message: "Gather timeout must be non-zero".to_string(),
            });
        }
        if self.persistence.enabled && self.persistence.scylla_hosts.is_empty() {
            return Err(ConfigError::MissingField(
                "persistence.scylla_hosts".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP/WebSocket server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Dialogue model (Gemini) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSettings {
    /// API key; empty means the dialogue collaborator is unconfigured,
    /// which is fatal to sessions at start
    #[serde(default)]
    pub api_key: String,

    /// Ordered model-name preference list, resolved once at startup
    /// into a single bound backend
    #[serde(default = "default_model_preferences")]
    pub model_preferences: Vec<String>,

    /// API endpoint base
    #[serde(default = "default_dialogue_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_dialogue_timeout")]
    pub timeout_secs: u64,

    /// Maximum retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff in milliseconds (doubles each retry)
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_model_preferences() -> Vec<String> {
    vec![
        "gemini-pro".to_string(),
        "models/gemini-pro".to_string(),
        "gemini-1.0-pro".to_string(),
        "models/gemini-1.0-pro".to_string(),
    ]
}

fn default_dialogue_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_dialogue_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_backoff_ms() -> u64 {
    200
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model_preferences: default_model_preferences(),
            endpoint: default_dialogue_endpoint(),
            timeout_secs: default_dialogue_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Language code for synthesis ("bn" for Bengali)
    #[serde(default = "default_language")]
    pub language: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,
}

fn default_language() -> String {
    "bn".to_string()
}

fn default_speech_timeout() -> u64 {
    10
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            timeout_secs: default_speech_timeout(),
        }
    }
}

/// Call-control binding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelephonySettings {
    /// Spoken language code for call directives ("bn-BD")
    #[serde(default = "default_call_language")]
    pub language: String,

    /// Seconds of silence before a gather times out and the call is
    /// redirected to voicemail
    #[serde(default = "default_gather_timeout")]
    pub gather_timeout_secs: u32,
}

fn default_call_language() -> String {
    "bn-BD".to_string()
}

fn default_gather_timeout() -> u32 {
    5
}

impl Default for TelephonySettings {
    fn default() -> Self {
        Self {
            language: default_call_language(),
            gather_timeout_secs: default_gather_timeout(),
        }
    }
}

/// ScyllaDB persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// When disabled, the in-memory stores are used
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_scylla_hosts")]
    pub scylla_hosts: Vec<String>,

    #[serde(default = "default_keyspace")]
    pub keyspace: String,

    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,

    /// Doctor roster cache TTL in seconds (bounded staleness)
    #[serde(default = "default_roster_ttl")]
    pub roster_ttl_secs: u64,
}

fn default_scylla_hosts() -> Vec<String> {
    vec!["127.0.0.1:9042".to_string()]
}

fn default_keyspace() -> String {
    "receptionist".to_string()
}

fn default_replication_factor() -> u8 {
    1
}

fn default_roster_ttl() -> u64 {
    300
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scylla_hosts: default_scylla_hosts(),
            keyspace: default_keyspace(),
            replication_factor: default_replication_factor(),
            roster_ttl_secs: default_roster_ttl(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from config files and environment
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("RECEPTIONIST")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.speech.language, "bn");
        assert_eq!(settings.telephony.gather_timeout_secs, 5);
        assert!(!settings.persistence.enabled);
    }

    #[test]
    fn test_settings_validation() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());

        let mut bad = Settings::default();
        bad.dialogue.model_preferences.clear();
        assert!(bad.validate().is_err());

        let mut bad = Settings::default();
        bad.telephony.gather_timeout_secs = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_persistence_requires_hosts_when_enabled() {
        let mut settings = Settings::default();
        settings.persistence.enabled = true;
        settings.persistence.scylla_hosts.clear();
        assert!(settings.validate().is_err());
    }
}
