//! Startup model binding
//!
//! Resolves an ordered model-name preference list into a single bound
//! backend. Binding happens once at process start; failure to bind any
//! candidate is a configuration error, never a per-request concern.

use std::sync::Arc;
use std::time::Duration;

use receptionist_config::DialogueSettings;
use receptionist_core::DialogueModel;

use crate::gemini::{GeminiBackend, GeminiConfig};
use crate::LlmError;

/// Probe each candidate model in preference order and bind the first
/// one that answers.
pub async fn bind_model(
    settings: &DialogueSettings,
) -> Result<Arc<dyn DialogueModel>, LlmError> {
    if settings.api_key.is_empty() {
        return Err(LlmError::Configuration(
            "Dialogue API key not configured".to_string(),
        ));
    }

    let mut failures = Vec::new();

    for model_name in &settings.model_preferences {
        let config = GeminiConfig {
            api_key: settings.api_key.clone(),
            model: model_name.clone(),
            endpoint: settings.endpoint.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries,
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            ..Default::default()
        };

        let backend = match GeminiBackend::new(config) {
            Ok(backend) => backend,
            Err(e) => {
                failures.push(format!("{}: {}", model_name, e));
                continue;
            }
        };

        match backend.probe().await {
            Ok(()) => {
                tracing::info!(model = %model_name, "Dialogue model bound");
                return Ok(Arc::new(backend));
            }
            Err(e) => {
                tracing::warn!(model = %model_name, error = %e, "Model probe failed");
                failures.push(format!("{}: {}", model_name, e));
            }
        }
    }

    Err(LlmError::NoModelAvailable(failures.join("; ")))
}
