//! Gemini dialogue backend
//!
//! Binds the `DialogueModel` trait to the Gemini generateContent API:
//! - Multi-turn history on the user/model wire format
//! - Retry with non-blocking exponential backoff
//! - Startup model binding from an ordered preference list

pub mod factory;
pub mod gemini;

pub use factory::bind_model;
pub use gemini::{GeminiBackend, GeminiConfig};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No usable model among candidates: {0}")]
    NoModelAvailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

impl From<LlmError> for receptionist_core::Error {
    fn from(err: LlmError) -> Self {
        receptionist_core::Error::Dialogue(err.to_string())
    }
}
