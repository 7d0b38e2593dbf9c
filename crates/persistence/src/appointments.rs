//! Appointment persistence

use crate::{PersistenceError, ScyllaClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use receptionist_core::UrgencyLevel;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted appointment
///
/// Immutable once created; rescheduling is a separate concern handled
/// outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: Uuid,
    /// Session that booked this appointment, when known
    pub session_id: Option<String>,
    pub patient_name: String,
    pub phone: String,
    /// Calendar date, YYYY-MM-DD as confirmed with the caller
    pub date: String,
    /// Local time of day, HH:MM
    pub time: String,
    pub purpose: Option<String>,
    pub urgency_level: UrgencyLevel,
    pub doctor_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(patient_name: &str, phone: &str, date: &str, time: &str) -> Self {
        Self {
            appointment_id: Uuid::new_v4(),
            session_id: None,
            patient_name: patient_name.to_string(),
            phone: phone.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            purpose: None,
            urgency_level: UrgencyLevel::Low,
            doctor_name: None,
            created_at: Utc::now(),
        }
    }

    /// Build from a committable draft; urgency falls back to low and
    /// blank optional fields become `None`.
    pub fn from_draft(draft: &receptionist_core::AppointmentDraft) -> Self {
        let clean = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        let mut appointment = Self::new(
            draft.patient_name.trim(),
            draft.phone.trim(),
            draft.date.trim(),
            draft.time.trim(),
        );
        appointment.purpose = draft.purpose.as_deref().and_then(clean);
        appointment.urgency_level = draft.urgency();
        appointment.doctor_name = draft.doctor_name.as_deref().and_then(clean);
        appointment
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Appointment store trait
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn save(&self, appointment: &Appointment) -> Result<(), PersistenceError>;
    async fn list_recent(&self, limit: i32) -> Result<Vec<Appointment>, PersistenceError>;
}

/// ScyllaDB implementation of the appointment store
#[derive(Clone)]
pub struct ScyllaAppointmentStore {
    client: ScyllaClient,
}

impl ScyllaAppointmentStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn row_to_appointment(
        &self,
        row: scylla::frame::response::result::Row,
    ) -> Result<Appointment, PersistenceError> {
        let (
            appointment_id,
            session_id,
            patient_name,
            phone,
            date,
            time,
            purpose,
            urgency_level,
            doctor_name,
            created_at,
        ): (
            Uuid,
            Option<String>,
            String,
            String,
            String,
            String,
            Option<String>,
            String,
            Option<String>,
            i64,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        Ok(Appointment {
            appointment_id,
            session_id,
            patient_name,
            phone,
            date,
            time,
            purpose,
            urgency_level: UrgencyLevel::parse_or_default(&urgency_level),
            doctor_name,
            created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
        })
    }
}

#[async_trait]
impl AppointmentStore for ScyllaAppointmentStore {
    async fn save(&self, appointment: &Appointment) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.appointments (
                appointment_id, session_id, patient_name, phone,
                date, time, purpose, urgency_level, doctor_name, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    appointment.appointment_id,
                    &appointment.session_id,
                    &appointment.patient_name,
                    &appointment.phone,
                    &appointment.date,
                    &appointment.time,
                    &appointment.purpose,
                    appointment.urgency_level.as_str(),
                    &appointment.doctor_name,
                    appointment.created_at.timestamp_millis(),
                ),
            )
            .await?;

        tracing::info!(
            appointment_id = %appointment.appointment_id,
            patient = %appointment.patient_name,
            date = %appointment.date,
            time = %appointment.time,
            "Appointment saved"
        );

        Ok(())
    }

    async fn list_recent(&self, limit: i32) -> Result<Vec<Appointment>, PersistenceError> {
        let query = format!(
            "SELECT appointment_id, session_id, patient_name, phone,
                    date, time, purpose, urgency_level, doctor_name, created_at
             FROM {}.appointments LIMIT ?",
            self.client.keyspace()
        );

        let result = self.client.session().query_unpaged(query, (limit,)).await?;

        let mut appointments = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                appointments.push(self.row_to_appointment(row)?);
            }
        }

        Ok(appointments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appointment_new() {
        let apt = Appointment::new("Jane Doe", "555-0101", "2024-01-02", "15:00")
            .with_session("call-123");

        assert_eq!(apt.patient_name, "Jane Doe");
        assert_eq!(apt.urgency_level, UrgencyLevel::Low);
        assert_eq!(apt.session_id.as_deref(), Some("call-123"));
        assert!(apt.purpose.is_none());
    }

    #[test]
    fn test_from_draft_cleans_optionals() {
        let draft = receptionist_core::AppointmentDraft {
            patient_name: " Jane Doe ".to_string(),
            phone: "555-0101".to_string(),
            date: "2024-01-02".to_string(),
            time: "15:00".to_string(),
            purpose: Some("  ".to_string()),
            urgency_level: Some("high".to_string()),
            doctor_name: Some("Rahman".to_string()),
        };

        let apt = Appointment::from_draft(&draft);
        assert_eq!(apt.patient_name, "Jane Doe");
        assert!(apt.purpose.is_none());
        assert_eq!(apt.urgency_level, UrgencyLevel::High);
        assert_eq!(apt.doctor_name.as_deref(), Some("Rahman"));
    }
}
