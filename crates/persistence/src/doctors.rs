//! Doctor roster storage and caching

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use receptionist_core::Doctor;

use crate::{PersistenceError, ScyllaClient};

/// Doctor directory trait
///
/// Read-mostly; sessions snapshot the roster once at start.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, PersistenceError>;
}

/// ScyllaDB implementation of the doctor directory
#[derive(Clone)]
pub struct ScyllaDoctorStore {
    client: ScyllaClient,
}

impl ScyllaDoctorStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DoctorDirectory for ScyllaDoctorStore {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, PersistenceError> {
        let query = format!(
            "SELECT name, specialty FROM {}.doctors",
            self.client.keyspace()
        );

        let result = self.client.session().query_unpaged(query, &[]).await?;

        let mut doctors = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (name, specialty): (String, String) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                doctors.push(Doctor::new(name, specialty));
            }
        }

        Ok(doctors)
    }
}

/// TTL-bounded cache in front of a doctor directory
///
/// The roster changes rarely; a stale roster for the lifetime of one
/// cache entry is accepted. Invalidation is the fixed TTL.
pub struct CachedDoctorDirectory {
    inner: Arc<dyn DoctorDirectory>,
    ttl: Duration,
    cached: RwLock<Option<(Instant, Vec<Doctor>)>>,
}

impl CachedDoctorDirectory {
    pub fn new(inner: Arc<dyn DoctorDirectory>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: RwLock::new(None),
        }
    }
}

#[async_trait]
impl DoctorDirectory for CachedDoctorDirectory {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, PersistenceError> {
        if let Some((fetched_at, roster)) = self.cached.read().await.as_ref() {
            if fetched_at.elapsed() < self.ttl {
                return Ok(roster.clone());
            }
        }

        let roster = self.inner.list_doctors().await?;
        *self.cached.write().await = Some((Instant::now(), roster.clone()));
        tracing::debug!(doctors = roster.len(), "Doctor roster cache refreshed");
        Ok(roster)
    }
}
