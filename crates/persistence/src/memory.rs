//! In-memory store implementations
//!
//! Used when persistence is disabled and as substitutes in tests.

use async_trait::async_trait;
use parking_lot::RwLock;

use receptionist_core::Doctor;

use crate::appointments::{Appointment, AppointmentStore};
use crate::doctors::DoctorDirectory;
use crate::notes::{CallNote, CallNoteStore};
use crate::PersistenceError;

/// In-memory appointment store
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far
    pub fn saved(&self) -> Vec<Appointment> {
        self.appointments.read().clone()
    }

    pub fn len(&self) -> usize {
        self.appointments.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.read().is_empty()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn save(&self, appointment: &Appointment) -> Result<(), PersistenceError> {
        self.appointments.write().push(appointment.clone());
        Ok(())
    }

    async fn list_recent(&self, limit: i32) -> Result<Vec<Appointment>, PersistenceError> {
        let appointments = self.appointments.read();
        Ok(appointments
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

/// In-memory doctor directory with a fixed roster
#[derive(Default)]
pub struct InMemoryDoctorDirectory {
    roster: Vec<Doctor>,
}

impl InMemoryDoctorDirectory {
    pub fn new(roster: Vec<Doctor>) -> Self {
        Self { roster }
    }
}

#[async_trait]
impl DoctorDirectory for InMemoryDoctorDirectory {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, PersistenceError> {
        Ok(self.roster.clone())
    }
}

/// In-memory call note store
#[derive(Default)]
pub struct InMemoryCallNoteStore {
    notes: RwLock<Vec<CallNote>>,
}

impl InMemoryCallNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<CallNote> {
        self.notes.read().clone()
    }
}

#[async_trait]
impl CallNoteStore for InMemoryCallNoteStore {
    async fn save(&self, note: &CallNote) -> Result<(), PersistenceError> {
        self.notes.write().push(note.clone());
        Ok(())
    }
}
