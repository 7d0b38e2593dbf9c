//! Application state

use std::sync::Arc;

use dashmap::DashMap;

use receptionist_agent::{
    extract_json_block, AppointmentCommitPolicy, CallSummary, ConversationSession,
    DialogueTurnProcessor, SessionManager,
};
use receptionist_config::Settings;
use receptionist_core::{DialogueModel, DialogueTurnResult, Doctor, SpeechSynthesizer};
use receptionist_persistence::PersistenceLayer;

use crate::phone::CallState;

/// Shared application state
///
/// `model` is `None` when the dialogue collaborator could not be
/// configured; both protocol bindings answer with a fixed
/// service-unavailable message in that case.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub model: Option<Arc<dyn DialogueModel>>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub sessions: Arc<SessionManager>,
    pub persistence: PersistenceLayer,
    pub commit: Arc<AppointmentCommitPolicy>,
    /// Call-control state per call id
    pub calls: Arc<DashMap<String, CallState>>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        model: Option<Arc<dyn DialogueModel>>,
        speech: Arc<dyn SpeechSynthesizer>,
        persistence: PersistenceLayer,
    ) -> Self {
        let commit = Arc::new(AppointmentCommitPolicy::new(
            persistence.appointments.clone(),
            persistence.notes.clone(),
        ));

        Self {
            settings: Arc::new(settings),
            model,
            speech,
            sessions: Arc::new(SessionManager::new()),
            persistence,
            commit,
            calls: Arc::new(DashMap::new()),
        }
    }

    /// Turn processor for the bound model, when one is bound
    pub fn processor(&self) -> Option<DialogueTurnProcessor> {
        self.model.clone().map(DialogueTurnProcessor::new)
    }

    /// Snapshot of the doctor roster for a new session
    ///
    /// Directory failures degrade to an empty roster; sessions start
    /// regardless.
    pub async fn roster_snapshot(&self) -> Vec<Doctor> {
        match self.persistence.doctors.list_doctors().await {
            Ok(roster) => roster,
            Err(e) => {
                tracing::warn!(error = %e, "Doctor roster unavailable, starting without it");
                Vec::new()
            }
        }
    }

    /// Evaluate the commit policy when a turn produced a draft
    pub async fn evaluate_commit(
        &self,
        session: &mut ConversationSession,
        result: &DialogueTurnResult,
    ) {
        if let Some(draft) = &result.extracted_draft {
            let summary = extract_json_block(&result.raw_text)
                .map(|value| CallSummary::from_value(&value))
                .unwrap_or_default();
            self.commit.commit(session, draft, &summary).await;
        }
    }
}
