//! Shared error types

use thiserror::Error;

/// Top-level error for the receptionist core
#[derive(Error, Debug)]
pub enum Error {
    /// Dialogue model (generation) failure
    #[error("Dialogue model error: {0}")]
    Dialogue(String),

    /// Speech synthesis failure
    #[error("Speech synthesis error: {0}")]
    Speech(String),

    /// Persistence failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Channel (socket/call) failure
    #[error("Channel error: {0}")]
    Channel(String),

    /// Malformed data encountered
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, Error>;
