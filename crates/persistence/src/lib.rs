//! ScyllaDB persistence layer for the receptionist agent
//!
//! Provides persistent storage for:
//! - Appointments
//! - The doctor roster (with a TTL-bounded process-wide cache)
//! - Call notes
//!
//! In-memory implementations back the same traits for tests and for
//! running without a database.

pub mod appointments;
pub mod client;
pub mod doctors;
pub mod error;
pub mod memory;
pub mod notes;
pub mod schema;

pub use appointments::{Appointment, AppointmentStore, ScyllaAppointmentStore};
pub use client::{ScyllaClient, ScyllaConfig};
pub use doctors::{CachedDoctorDirectory, DoctorDirectory, ScyllaDoctorStore};
pub use error::PersistenceError;
pub use memory::{InMemoryAppointmentStore, InMemoryCallNoteStore, InMemoryDoctorDirectory};
pub use notes::{CallNote, CallNoteStore, ScyllaCallNoteStore};

use std::sync::Arc;
use std::time::Duration;

/// Combined persistence layer with all stores
#[derive(Clone)]
pub struct PersistenceLayer {
    pub appointments: Arc<dyn AppointmentStore>,
    pub doctors: Arc<dyn DoctorDirectory>,
    pub notes: Arc<dyn CallNoteStore>,
}

/// Initialize the persistence layer against ScyllaDB
///
/// The doctor directory is wrapped in a TTL cache so roster reads stay
/// cheap during calls; staleness is bounded by `roster_ttl`.
pub async fn init(
    config: ScyllaConfig,
    roster_ttl: Duration,
) -> Result<PersistenceLayer, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;

    let doctors: Arc<dyn DoctorDirectory> = Arc::new(ScyllaDoctorStore::new(client.clone()));

    Ok(PersistenceLayer {
        appointments: Arc::new(ScyllaAppointmentStore::new(client.clone())),
        doctors: Arc::new(CachedDoctorDirectory::new(doctors, roster_ttl)),
        notes: Arc::new(ScyllaCallNoteStore::new(client)),
    })
}

impl PersistenceLayer {
    /// In-memory layer used when persistence is disabled and in tests
    pub fn in_memory() -> Self {
        Self {
            appointments: Arc::new(InMemoryAppointmentStore::new()),
            doctors: Arc::new(InMemoryDoctorDirectory::default()),
            notes: Arc::new(InMemoryCallNoteStore::new()),
        }
    }
}
