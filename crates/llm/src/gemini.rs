//! Gemini backend implementation
//!
//! Speaks the generateContent API. Conversation history maps onto the
//! user/model wire roles; there is no separate system role, so the
//! session seeds its context as the first user turn.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use receptionist_core::{DialogueModel, Result, Turn};

use crate::LlmError;

/// Gemini backend configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (from GEMINI_API_KEY or settings)
    pub api_key: String,
    /// Model name, e.g. "gemini-pro"
    pub model: String,
    /// API endpoint base
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_output_tokens: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: "gemini-pro".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
            temperature: 0.7,
            max_output_tokens: 512,
        }
    }
}

impl GeminiConfig {
    /// Create config with API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Gemini dialogue backend
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(config: GeminiConfig) -> std::result::Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Configuration(
                "GEMINI_API_KEY not set. Set it via environment or config.".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                LlmError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        // Preference lists may carry the "models/" prefix already
        let model = self.config.model.trim_start_matches("models/");
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint, model
        )
    }

    /// One-shot probe used at startup to verify the model answers
    pub async fn probe(&self) -> std::result::Result<(), LlmError> {
        let request = GenerateContentRequest {
            contents: vec![WireContent {
                role: "user".to_string(),
                parts: vec![WirePart {
                    text: "Hello, test".to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.0),
                max_output_tokens: Some(8),
            }),
        };
        self.execute_request(&request).await.map(|_| ())
    }

    async fn generate_inner(&self, history: &[Turn]) -> std::result::Result<String, LlmError> {
        let request = GenerateContentRequest {
            contents: history
                .iter()
                .map(|turn| WireContent {
                    role: turn.role.wire_role().to_string(),
                    parts: vec![WirePart {
                        text: turn.content.clone(),
                    }],
                })
                .collect(),
            generation_config: Some(GenerationConfig {
                temperature: Some(self.config.temperature),
                max_output_tokens: Some(self.config.max_output_tokens as u32),
            }),
        };

        // Retry loop with non-blocking exponential backoff
        let mut backoff = self.config.initial_backoff;
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    "Dialogue request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    self.config.max_retries
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(&request).await {
                Ok(text) => return Ok(text),
                Err(e) if Self::is_retryable(&e) => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Generation("Retries exhausted".to_string())))
    }

    async fn execute_request(
        &self,
        request: &GenerateContentRequest,
    ) -> std::result::Result<String, LlmError> {
        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| LlmError::InvalidResponse("Response carried no candidates".to_string()))
    }

    fn is_retryable(error: &LlmError) -> bool {
        match error {
            LlmError::Network(_) => true,
            LlmError::Api(msg) => {
                // Quota and server-side errors are worth a retry
                msg.contains("HTTP 429") || msg.contains("HTTP 5")
            }
            _ => false,
        }
    }
}

#[async_trait]
impl DialogueModel for GeminiBackend {
    async fn generate(&self, history: &[Turn]) -> Result<String> {
        let text = self.generate_inner(history).await?;
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Wire types for the generateContent API

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    role: String,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: WireContent,
}
