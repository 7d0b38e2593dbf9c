//! Appointment commit policy
//!
//! Decides whether an extracted draft becomes a persisted appointment.
//! Partial drafts are held back, each session books at most once, and
//! storage failures never interrupt the conversation.

use std::sync::Arc;

use receptionist_core::AppointmentDraft;
use receptionist_persistence::{Appointment, AppointmentStore, CallNote, CallNoteStore};

use crate::extract::CallSummary;
use crate::session::ConversationSession;

pub struct AppointmentCommitPolicy {
    appointments: Arc<dyn AppointmentStore>,
    notes: Arc<dyn CallNoteStore>,
}

impl AppointmentCommitPolicy {
    pub fn new(appointments: Arc<dyn AppointmentStore>, notes: Arc<dyn CallNoteStore>) -> Self {
        Self {
            appointments,
            notes,
        }
    }

    /// Evaluate one extracted draft against the session.
    ///
    /// Returns true when an appointment was committed this call.
    pub async fn commit(
        &self,
        session: &mut ConversationSession,
        draft: &AppointmentDraft,
        summary: &CallSummary,
    ) -> bool {
        if !draft.is_committable() {
            tracing::debug!(
                session_id = %session.id(),
                missing = ?draft
                    .missing_fields()
                    .iter()
                    .map(|f| f.caller_label())
                    .collect::<Vec<_>>(),
                "Draft incomplete, holding back"
            );
            return false;
        }

        if session.has_committed() {
            tracing::debug!(
                session_id = %session.id(),
                "Appointment already booked this call, skipping"
            );
            return false;
        }

        if let Some(doctor_name) = draft.doctor_name.as_deref() {
            let known = session
                .doctor_context()
                .iter()
                .any(|doctor| doctor.name.eq_ignore_ascii_case(doctor_name));
            if !known {
                tracing::warn!(
                    session_id = %session.id(),
                    doctor = doctor_name,
                    "Draft names a doctor outside the roster snapshot"
                );
            }
        }

        let appointment = Appointment::from_draft(draft).with_session(session.id());

        if let Err(e) = self.appointments.save(&appointment).await {
            tracing::error!(
                session_id = %session.id(),
                error = %e,
                "Appointment save failed, conversation continues"
            );
            return false;
        }

        session.mark_committed();

        if summary.has_notes() {
            let note = CallNote::new(
                summary.bangla_notes.clone().unwrap_or_default(),
                summary.english_notes.clone().unwrap_or_default(),
            )
            .with_appointment(appointment.appointment_id)
            .with_transcript(session.transcript());

            // Notes are best-effort; the booking already stands
            if let Err(e) = self.notes.save(&note).await {
                tracing::warn!(session_id = %session.id(), error = %e, "Call note save failed");
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use receptionist_persistence::{InMemoryAppointmentStore, InMemoryCallNoteStore};

    fn policy_with_stores() -> (
        AppointmentCommitPolicy,
        Arc<InMemoryAppointmentStore>,
        Arc<InMemoryCallNoteStore>,
    ) {
        let appointments = Arc::new(InMemoryAppointmentStore::new());
        let notes = Arc::new(InMemoryCallNoteStore::new());
        let policy = AppointmentCommitPolicy::new(appointments.clone(), notes.clone());
        (policy, appointments, notes)
    }

    fn full_draft() -> AppointmentDraft {
        AppointmentDraft {
            patient_name: "Jane Doe".to_string(),
            phone: "555-0101".to_string(),
            date: "2024-01-02".to_string(),
            time: "15:00".to_string(),
            purpose: Some("general checkup".to_string()),
            urgency_level: Some("low".to_string()),
            doctor_name: None,
        }
    }

    #[tokio::test]
    async fn test_commits_complete_draft() {
        let (policy, appointments, _) = policy_with_stores();
        let mut session = ConversationSession::start("call-1", vec![]);

        let committed = policy
            .commit(&mut session, &full_draft(), &CallSummary::default())
            .await;

        assert!(committed);
        assert!(session.has_committed());
        let saved = appointments.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].patient_name, "Jane Doe");
        assert_eq!(saved[0].phone, "555-0101");
        assert_eq!(saved[0].date, "2024-01-02");
        assert_eq!(saved[0].time, "15:00");
        assert_eq!(saved[0].purpose.as_deref(), Some("general checkup"));
        assert_eq!(saved[0].session_id.as_deref(), Some("call-1"));
    }

    #[tokio::test]
    async fn test_partial_draft_is_held_back() {
        let (policy, appointments, _) = policy_with_stores();
        let mut session = ConversationSession::start("call-1", vec![]);

        let mut draft = full_draft();
        draft.time = "  ".to_string();

        let committed = policy
            .commit(&mut session, &draft, &CallSummary::default())
            .await;

        assert!(!committed);
        assert!(!session.has_committed());
        assert!(appointments.saved().is_empty());
    }

    #[tokio::test]
    async fn test_one_booking_per_session() {
        let (policy, appointments, _) = policy_with_stores();
        let mut session = ConversationSession::start("call-1", vec![]);

        assert!(
            policy
                .commit(&mut session, &full_draft(), &CallSummary::default())
                .await
        );
        assert!(
            !policy
                .commit(&mut session, &full_draft(), &CallSummary::default())
                .await
        );
        assert_eq!(appointments.saved().len(), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_urgency_defaults_low() {
        let (policy, appointments, _) = policy_with_stores();
        let mut session = ConversationSession::start("call-1", vec![]);

        let mut draft = full_draft();
        draft.urgency_level = Some("URGENT!!".to_string());

        policy
            .commit(&mut session, &draft, &CallSummary::default())
            .await;

        assert_eq!(
            appointments.saved()[0].urgency_level,
            receptionist_core::UrgencyLevel::Low
        );
    }

    #[tokio::test]
    async fn test_omitted_urgency_defaults_low() {
        let (policy, appointments, _) = policy_with_stores();
        let mut session = ConversationSession::start("call-1", vec![]);

        let mut draft = full_draft();
        draft.urgency_level = None;

        policy
            .commit(&mut session, &draft, &CallSummary::default())
            .await;

        let saved = appointments.saved();
        assert_eq!(saved[0].urgency_level.as_str(), "low");
    }

    #[tokio::test]
    async fn test_note_linked_to_booking() {
        let (policy, appointments, notes) = policy_with_stores();
        let mut session = ConversationSession::start("call-1", vec![]);

        let summary = CallSummary {
            bangla_notes: Some("রোগী অ্যাপয়েন্টমেন্ট বুক করেছেন।".to_string()),
            english_notes: Some("Patient booked an appointment.".to_string()),
            appointment_data: None,
        };

        policy.commit(&mut session, &full_draft(), &summary).await;

        let saved_notes = notes.saved();
        assert_eq!(saved_notes.len(), 1);
        assert_eq!(
            saved_notes[0].appointment_id,
            Some(appointments.saved()[0].appointment_id)
        );
    }

    #[tokio::test]
    async fn test_note_carries_raw_transcript() {
        let (policy, _, notes) = policy_with_stores();
        let mut session = ConversationSession::start("call-1", vec![]);
        session.push_turn(receptionist_core::Turn::caller("Jane Doe, আগামীকাল"));
        session.push_turn(receptionist_core::Turn::assistant("বুক করা হয়েছে।"));

        let summary = CallSummary {
            bangla_notes: Some("বুকিং সম্পন্ন।".to_string()),
            english_notes: Some("Booking done.".to_string()),
            appointment_data: None,
        };

        policy.commit(&mut session, &full_draft(), &summary).await;

        let transcript = notes.saved()[0].raw_transcript.clone().unwrap();
        assert!(transcript.contains("caller: Jane Doe, আগামীকাল"));
        assert!(transcript.contains("assistant: বুক করা হয়েছে।"));
    }
}
