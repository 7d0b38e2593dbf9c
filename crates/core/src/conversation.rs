//! Conversation types: turns, roles, and per-turn results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::appointment::AppointmentDraft;

/// Role of a speaker in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// The caller (patient side)
    Caller,
    /// The assistant (receptionist side)
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::Caller => "caller",
            TurnRole::Assistant => "assistant",
        }
    }

    /// Role name on the generative API wire (user/model convention)
    pub fn wire_role(&self) -> &'static str {
        match self {
            TurnRole::Caller => "user",
            TurnRole::Assistant => "model",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in the conversation history
///
/// Insertion order is meaningful: the history is the literal context
/// window sent to the dialogue model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Role of the speaker
    pub role: TurnRole,
    /// Content of the turn
    pub content: String,
    /// When the turn occurred
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new turn
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a caller turn
    pub fn caller(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Caller, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }
}

/// Outcome of one caller-utterance / assistant-utterance round trip
#[derive(Debug, Clone)]
pub struct DialogueTurnResult {
    /// Cleaned reply with structural markup removed; safe to speak
    pub spoken_text: String,
    /// Full model output, including any embedded structured block
    pub raw_text: String,
    /// Appointment draft extracted from the structured block, if any
    pub extracted_draft: Option<AppointmentDraft>,
    /// Whether to keep gathering caller input after this turn
    pub should_continue: bool,
}

impl DialogueTurnResult {
    /// A result carrying fixed text and no extraction (fallback paths)
    pub fn fallback(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            spoken_text: text.clone(),
            raw_text: text,
            extracted_draft: None,
            should_continue: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_creation() {
        let turn = Turn::caller("আমি একটা অ্যাপয়েন্টমেন্ট বুক করতে চাই");
        assert_eq!(turn.role, TurnRole::Caller);
        assert!(!turn.content.is_empty());

        let turn = Turn::assistant("অবশ্যই, আমি সাহায্য করছি।");
        assert_eq!(turn.role, TurnRole::Assistant);
    }

    #[test]
    fn test_wire_roles() {
        assert_eq!(TurnRole::Caller.wire_role(), "user");
        assert_eq!(TurnRole::Assistant.wire_role(), "model");
    }

    #[test]
    fn test_fallback_result() {
        let result = DialogueTurnResult::fallback("দুঃখিত, আবার বলুন।");
        assert!(result.should_continue);
        assert!(result.extracted_draft.is_none());
        assert_eq!(result.spoken_text, result.raw_text);
    }
}
