//! Dialogue turn processing
//!
//! One caller-utterance → assistant-utterance round trip. All
//! collaborator failures are caught here and converted to safe
//! fallback results; nothing below this layer surfaces raw errors to
//! a protocol adapter.

use std::sync::Arc;

use receptionist_core::{DialogueModel, DialogueTurnResult, Turn};

use crate::extract::{extract_json_block, strip_json_block, CallSummary};
use crate::messages;
use crate::session::ConversationSession;

/// Farewell markers that signal the exchange is over. Anything short
/// of a clear signal means keep gathering.
const FAREWELL_MARKERS: &[&str] = &["আবার কল করুন", "বিদায়", "ভালো থাকবেন", "goodbye"];

/// Processes turns against the bound dialogue model
#[derive(Clone)]
pub struct DialogueTurnProcessor {
    model: Arc<dyn DialogueModel>,
}

impl DialogueTurnProcessor {
    pub fn new(model: Arc<dyn DialogueModel>) -> Self {
        Self { model }
    }

    /// Run one round trip.
    ///
    /// On generation failure the caller turn is rolled back so the
    /// error never pollutes the context sent on later turns.
    pub async fn process(
        &self,
        session: &mut ConversationSession,
        caller_utterance: &str,
    ) -> DialogueTurnResult {
        if caller_utterance.trim().is_empty() {
            return DialogueTurnResult::fallback(messages::PLEASE_REPEAT);
        }

        session.push_turn(Turn::caller(caller_utterance));

        let raw_text = match self.model.generate(session.history()).await {
            Ok(text) => text,
            Err(e) => {
                session.pop_turn();
                tracing::error!(
                    session_id = %session.id(),
                    model = %self.model.model_name(),
                    error = %e,
                    "Dialogue generation failed"
                );
                return DialogueTurnResult::fallback(messages::GENERATION_APOLOGY);
            }
        };

        session.push_turn(Turn::assistant(raw_text.clone()));

        let extracted_draft = extract_json_block(&raw_text)
            .map(|value| CallSummary::from_value(&value))
            .and_then(|summary| summary.appointment_data);

        let stripped = strip_json_block(&raw_text);
        let spoken_text = match &extracted_draft {
            // A partial draft must never read as a confirmation; ask
            // for exactly what is still missing instead.
            Some(draft) if !draft.is_committable() => {
                let prompt = messages::missing_fields_prompt(&draft.missing_fields());
                if stripped.trim().is_empty() {
                    prompt
                } else {
                    format!("{} {}", stripped, prompt)
                }
            }
            Some(_) if stripped.trim().is_empty() => messages::APPOINTMENT_CONFIRMED.to_string(),
            None if stripped.trim().is_empty() => raw_text.clone(),
            _ => stripped,
        };

        let should_continue = !detects_farewell(&raw_text);

        tracing::debug!(
            session_id = %session.id(),
            history_len = session.history().len(),
            draft = extracted_draft.is_some(),
            should_continue,
            "Turn processed"
        );

        DialogueTurnResult {
            spoken_text,
            raw_text,
            extracted_draft,
            should_continue,
        }
    }
}

/// True only on an explicit end-of-call signal in the reply
fn detects_farewell(text: &str) -> bool {
    let lower = text.to_lowercase();
    FAREWELL_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use receptionist_core::{Error, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub model returning scripted replies and counting calls
    struct StubModel {
        replies: Vec<Result<String>>,
        calls: AtomicUsize,
    }

    impl StubModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                replies: vec![Ok(text.to_string())],
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                replies: vec![Err(Error::Dialogue("quota exceeded".to_string()))],
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DialogueModel for StubModel {
        async fn generate(&self, _history: &[Turn]) -> Result<String> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.replies.get(index.min(self.replies.len() - 1)) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(_)) => Err(Error::Dialogue("quota exceeded".to_string())),
                None => Ok(String::new()),
            }
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn test_empty_utterance_skips_model() {
        let model = StubModel::replying("hello");
        let processor = DialogueTurnProcessor::new(model.clone());
        let mut session = ConversationSession::start("s1", vec![]);

        let result = processor.process(&mut session, "   ").await;

        assert_eq!(result.spoken_text, messages::PLEASE_REPEAT);
        assert!(result.should_continue);
        assert_eq!(model.call_count(), 0);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_history_grows_by_pair_per_turn() {
        let model = StubModel::replying("জি, কবে আসতে চান?");
        let processor = DialogueTurnProcessor::new(model);
        let mut session = ConversationSession::start("s1", vec![]);

        for n in 1..=3usize {
            let result = processor
                .process(&mut session, "অ্যাপয়েন্টমেন্ট চাই")
                .await;
            assert!(result.should_continue);
            assert_eq!(session.history().len(), 2 * n + 2);
        }

        // Entries alternate caller/assistant starting at index 2
        for (i, turn) in session.history().iter().enumerate().skip(2) {
            let expected = if i % 2 == 0 {
                receptionist_core::TurnRole::Caller
            } else {
                receptionist_core::TurnRole::Assistant
            };
            assert_eq!(turn.role, expected);
        }
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_history_unchanged() {
        let model = StubModel::failing();
        let processor = DialogueTurnProcessor::new(model);
        let mut session = ConversationSession::start("s1", vec![]);
        let before = session.history().len();

        let result = processor.process(&mut session, "হ্যালো").await;

        assert_eq!(session.history().len(), before);
        assert_eq!(result.spoken_text, messages::GENERATION_APOLOGY);
        assert!(result.extracted_draft.is_none());
        assert!(result.should_continue);
    }

    #[tokio::test]
    async fn test_draft_extracted_and_reply_cleaned() {
        let reply = concat!(
            "আপনার অ্যাপয়েন্টমেন্ট বুক করা হয়েছে। ",
            r#"{"appointment_data": {"patient_name": "Jane Doe", "phone": "555-0101", "date": "2024-01-02", "time": "15:00", "purpose": "general checkup", "urgency_level": "low"}}"#
        );
        let processor = DialogueTurnProcessor::new(StubModel::replying(reply));
        let mut session = ConversationSession::start("s1", vec![]);

        let result = processor
            .process(&mut session, "Book for Jane Doe tomorrow at 3pm")
            .await;

        let draft = result.extracted_draft.expect("draft extracted");
        assert_eq!(draft.patient_name, "Jane Doe");
        assert_eq!(draft.date, "2024-01-02");
        assert_eq!(draft.time, "15:00");
        assert!(!result.spoken_text.contains('{'));
        assert!(!result.spoken_text.contains('}'));
        assert!(!result.spoken_text.contains('`'));
    }

    #[tokio::test]
    async fn test_block_only_reply_gets_confirmation_text() {
        let reply = r#"{"appointment_data": {"patient_name": "Jane", "date": "2024-01-02", "time": "15:00"}}"#;
        let processor = DialogueTurnProcessor::new(StubModel::replying(reply));
        let mut session = ConversationSession::start("s1", vec![]);

        let result = processor.process(&mut session, "book it").await;

        assert!(result.extracted_draft.is_some());
        assert_eq!(result.spoken_text, messages::APPOINTMENT_CONFIRMED);
    }

    #[tokio::test]
    async fn test_partial_block_only_reply_asks_for_missing_fields() {
        let reply = r#"{"appointment_data": {"patient_name": "Jane", "date": "2024-01-02", "time": ""}}"#;
        let processor = DialogueTurnProcessor::new(StubModel::replying(reply));
        let mut session = ConversationSession::start("s1", vec![]);

        let result = processor.process(&mut session, "book it").await;

        let draft = result.extracted_draft.expect("draft extracted");
        assert!(!draft.is_committable());
        assert_ne!(result.spoken_text, messages::APPOINTMENT_CONFIRMED);
        assert!(result.spoken_text.contains("সময়"));
        assert!(!result.spoken_text.contains("নাম"));
        assert!(!result.spoken_text.contains("তারিখ"));
    }

    #[tokio::test]
    async fn test_partial_draft_prompt_appended_to_prose() {
        let reply = concat!(
            "ঠিক আছে। ",
            r#"{"appointment_data": {"patient_name": "", "date": "2024-01-02", "time": "15:00"}}"#
        );
        let processor = DialogueTurnProcessor::new(StubModel::replying(reply));
        let mut session = ConversationSession::start("s1", vec![]);

        let result = processor.process(&mut session, "book it").await;

        assert!(result.spoken_text.contains("ঠিক আছে।"));
        assert!(result.spoken_text.contains("নাম"));
        assert!(!result.spoken_text.contains('{'));
    }

    #[tokio::test]
    async fn test_farewell_stops_gathering() {
        let processor =
            DialogueTurnProcessor::new(StubModel::replying("ধন্যবাদ! আবার কল করুন!"));
        let mut session = ConversationSession::start("s1", vec![]);

        let result = processor.process(&mut session, "ঠিক আছে, রাখছি").await;

        assert!(!result.should_continue);
    }

    #[tokio::test]
    async fn test_plain_reply_continues() {
        let processor = DialogueTurnProcessor::new(StubModel::replying("কোন তারিখে আসবেন?"));
        let mut session = ConversationSession::start("s1", vec![]);

        let result = processor.process(&mut session, "অ্যাপয়েন্টমেন্ট চাই").await;

        assert!(result.should_continue);
        assert!(result.extracted_draft.is_none());
        assert_eq!(result.spoken_text, result.raw_text);
    }
}
