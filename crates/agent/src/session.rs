//! Conversation session state
//!
//! One session per call or socket connection. The session owns the
//! running history and the doctor-context snapshot; after `start` only
//! the turn processor appends to history.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use receptionist_core::{Doctor, Turn};

use crate::messages;
use crate::prompt;

/// Per-call conversation state
#[derive(Debug)]
pub struct ConversationSession {
    id: String,
    history: Vec<Turn>,
    doctor_context: Vec<Doctor>,
    committed: bool,
    ended: bool,
}

impl ConversationSession {
    /// Start a session: seed the history with the roster-augmented
    /// context turn and the fixed acknowledgment, and freeze the
    /// doctor snapshot.
    ///
    /// The roster may go stale during a long call; that is accepted.
    pub fn start(id: impl Into<String>, doctor_roster: Vec<Doctor>) -> Self {
        let id = id.into();
        let context = format!(
            "{}\n\n{}",
            prompt::build_context_prompt(&doctor_roster),
            messages::CALLER_SEED
        );

        let history = vec![
            Turn::caller(context),
            Turn::assistant(messages::GREETING),
        ];

        tracing::info!(session_id = %id, doctors = doctor_roster.len(), "Session started");

        Self {
            id,
            history,
            doctor_context: doctor_roster,
            committed: false,
            ended: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn doctor_context(&self) -> &[Doctor] {
        &self.doctor_context
    }

    /// Number of caller/assistant exchanges after the two seed entries
    pub fn turn_count(&self) -> usize {
        self.history.len().saturating_sub(2) / 2
    }

    /// Render the exchange after the seed entries as a raw transcript,
    /// one `role: content` line per turn.
    pub fn transcript(&self) -> String {
        self.history
            .iter()
            .skip(2)
            .map(|turn| format!("{}: {}", turn.role, turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether this session has already booked an appointment
    pub fn has_committed(&self) -> bool {
        self.committed
    }

    /// Record that an appointment was booked; one booking per call
    pub fn mark_committed(&mut self) {
        self.committed = true;
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Release the session; idempotent
    pub fn end(&mut self) {
        if !self.ended {
            self.ended = true;
            tracing::info!(session_id = %self.id, turns = self.turn_count(), "Session ended");
        }
    }

    pub(crate) fn push_turn(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    /// Roll back the most recent entry (failed-turn cleanup)
    pub(crate) fn pop_turn(&mut self) {
        self.history.pop();
    }
}

/// Live sessions, keyed by call/connection id
///
/// Each session sits behind a `tokio::sync::Mutex` so turns within one
/// session are strictly sequential (single-flight) while separate
/// sessions proceed independently.
#[derive(Default)]
pub struct SessionManager {
    sessions: DashMap<String, Arc<Mutex<ConversationSession>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a session
    pub fn create(
        &self,
        id: impl Into<String>,
        doctor_roster: Vec<Doctor>,
    ) -> Arc<Mutex<ConversationSession>> {
        let id = id.into();
        let session = Arc::new(Mutex::new(ConversationSession::start(
            id.clone(),
            doctor_roster,
        )));
        self.sessions.insert(id, session.clone());
        session
    }

    pub fn get(&self, id: &str) -> Option<Arc<Mutex<ConversationSession>>> {
        self.sessions.get(id).map(|entry| entry.clone())
    }

    /// Fetch an existing session or start a new one
    pub fn get_or_create(
        &self,
        id: &str,
        doctor_roster: Vec<Doctor>,
    ) -> Arc<Mutex<ConversationSession>> {
        match self.get(id) {
            Some(session) => session,
            None => self.create(id, doctor_roster),
        }
    }

    /// Drop a session from the registry, ending it first
    pub async fn remove(&self, id: &str) {
        if let Some((_, session)) = self.sessions.remove(id) {
            session.lock().await.end();
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
