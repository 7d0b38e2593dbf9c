//! ScyllaDB schema creation

use crate::error::PersistenceError;
use scylla::Session;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    // Appointments table
    let appointments_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.appointments (
            appointment_id UUID,
            session_id TEXT,
            patient_name TEXT,
            phone TEXT,
            date TEXT,
            time TEXT,
            purpose TEXT,
            urgency_level TEXT,
            doctor_name TEXT,
            created_at TIMESTAMP,
            PRIMARY KEY (appointment_id)
        )
    "#,
        keyspace
    );

    session.query_unpaged(appointments_table, &[]).await.map_err(|e| {
        PersistenceError::SchemaError(format!("Failed to create appointments table: {}", e))
    })?;

    // Doctors table
    let doctors_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.doctors (
            name TEXT,
            specialty TEXT,
            availability TEXT,
            created_at TIMESTAMP,
            PRIMARY KEY (name)
        )
    "#,
        keyspace
    );

    session.query_unpaged(doctors_table, &[]).await.map_err(|e| {
        PersistenceError::SchemaError(format!("Failed to create doctors table: {}", e))
    })?;

    // Call notes table
    let call_notes_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.call_notes (
            note_id UUID,
            appointment_id UUID,
            bangla_text TEXT,
            english_text TEXT,
            raw_transcript TEXT,
            created_at TIMESTAMP,
            PRIMARY KEY (note_id)
        )
    "#,
        keyspace
    );

    session.query_unpaged(call_notes_table, &[]).await.map_err(|e| {
        PersistenceError::SchemaError(format!("Failed to create call_notes table: {}", e))
    })?;

    tracing::info!("All tables created successfully");
    Ok(())
}
