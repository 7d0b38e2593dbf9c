//! Speech synthesis backend
//!
//! Wraps the unofficial Google Translate TTS endpoint behind the
//! `SpeechSynthesizer` trait. The endpoint caps utterance length, so
//! long replies are chunked and the MP3 payloads concatenated.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use receptionist_core::{Result, SpeechSynthesizer};

/// TTS errors
#[derive(Error, Debug)]
pub enum TtsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for TtsError {
    fn from(err: reqwest::Error) -> Self {
        TtsError::Network(err.to_string())
    }
}

impl From<TtsError> for receptionist_core::Error {
    fn from(err: TtsError) -> Self {
        receptionist_core::Error::Speech(err.to_string())
    }
}

/// Maximum characters per synthesis request (endpoint limit)
const MAX_CHUNK_CHARS: usize = 180;

/// Translate-TTS speech backend
#[derive(Clone)]
pub struct TranslateTts {
    client: Client,
    endpoint: String,
}

impl TranslateTts {
    /// Create a new backend with the given request timeout
    pub fn new(timeout: Duration) -> std::result::Result<Self, TtsError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            TtsError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint: "https://translate.google.com/translate_tts".to_string(),
        })
    }

    /// Override the endpoint (for tests or a proxy)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch_chunk(
        &self,
        text: &str,
        language: &str,
    ) -> std::result::Result<Vec<u8>, TtsError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::Api(format!("HTTP {}", status)));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Split text into chunks the endpoint accepts, preferring
    /// whitespace boundaries.
    fn chunk_text(text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            if !current.is_empty()
                && current.chars().count() + 1 + word.chars().count() > MAX_CHUNK_CHARS
            {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

#[async_trait]
impl SpeechSynthesizer for TranslateTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let mut audio = Vec::new();
        for chunk in Self::chunk_text(text) {
            let bytes = self.fetch_chunk(&chunk, language).await?;
            audio.extend_from_slice(&bytes);
        }

        tracing::debug!(bytes = audio.len(), language, "Synthesized speech");
        Ok(audio)
    }

    fn backend_name(&self) -> &str {
        "translate-tts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_short_text() {
        let chunks = TranslateTts::chunk_text("হ্যালো, কেমন আছেন?");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_chunk_long_text_respects_limit() {
        let text = "word ".repeat(200);
        let chunks = TranslateTts::chunk_text(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= MAX_CHUNK_CHARS);
        }
    }

    #[test]
    fn test_chunk_empty_text() {
        assert!(TranslateTts::chunk_text("  ").is_empty());
    }
}
