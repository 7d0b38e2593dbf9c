//! Call note persistence
//!
//! The model summarizes each call in Bangla and English; both texts are
//! kept for the chamber staff, linked to the booked appointment when
//! one exists.

use crate::{PersistenceError, ScyllaClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted call note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallNote {
    pub note_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub bangla_text: String,
    pub english_text: String,
    pub raw_transcript: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CallNote {
    pub fn new(bangla_text: impl Into<String>, english_text: impl Into<String>) -> Self {
        Self {
            note_id: Uuid::new_v4(),
            appointment_id: None,
            bangla_text: bangla_text.into(),
            english_text: english_text.into(),
            raw_transcript: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_appointment(mut self, appointment_id: Uuid) -> Self {
        self.appointment_id = Some(appointment_id);
        self
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.raw_transcript = Some(transcript.into());
        self
    }
}

/// Call note store trait
#[async_trait]
pub trait CallNoteStore: Send + Sync {
    async fn save(&self, note: &CallNote) -> Result<(), PersistenceError>;
}

/// ScyllaDB implementation of the call note store
#[derive(Clone)]
pub struct ScyllaCallNoteStore {
    client: ScyllaClient,
}

impl ScyllaCallNoteStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CallNoteStore for ScyllaCallNoteStore {
    async fn save(&self, note: &CallNote) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.call_notes (
                note_id, appointment_id, bangla_text, english_text,
                raw_transcript, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    note.note_id,
                    note.appointment_id,
                    &note.bangla_text,
                    &note.english_text,
                    &note.raw_transcript,
                    note.created_at.timestamp_millis(),
                ),
            )
            .await?;

        tracing::info!(note_id = %note.note_id, "Call note saved");
        Ok(())
    }
}
