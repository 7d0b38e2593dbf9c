//! Collaborator traits
//!
//! The conversation core talks to its slow external collaborators
//! through these seams so they can be substituted in tests.

use async_trait::async_trait;

use crate::conversation::Turn;
use crate::Result;

/// Generative dialogue collaborator
///
/// Takes the full ordered conversation history and produces the next
/// assistant utterance. Calls are seconds-scale I/O and may fail
/// transiently; callers must treat failures as non-fatal.
#[async_trait]
pub trait DialogueModel: Send + Sync + 'static {
    /// Generate the next assistant utterance from the history
    async fn generate(&self, history: &[Turn]) -> Result<String>;

    /// Model name for logging
    fn model_name(&self) -> &str;
}

/// Speech collaborator
///
/// Turns text into an audio payload. A failure here degrades the
/// adapter to text-only delivery, never the whole session.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// Synthesize text to audio bytes
    ///
    /// `language` is a BCP-47-ish code ("bn" for Bengali).
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;

    /// Backend name for logging
    fn backend_name(&self) -> &str;
}
