//! Session data access object

use super::database::{with_locked, DatabaseError};
use super::models::SessionRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// Data access object for the `sessions` table
#[derive(Clone)]
pub struct SessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SessionStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Insert a new session and return the generated id.
    ///
    /// Commits immediately.
    pub fn insert_session(
        &self,
        timestamp: f64,
        name: Option<&str>,
        current_script: &str,
        serialized_initial_props: &[u8],
    ) -> Result<i64, DatabaseError> {
        with_locked(&self.conn, |conn| {
            conn.execute(
                "INSERT INTO sessions (timestamp, name, current_script, serialized_initial_props)
                 VALUES (?1, ?2, ?3, ?4)",
                params![timestamp, name, current_script, serialized_initial_props],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Get a session by id
    pub fn get(&self, id: i64) -> Result<Option<SessionRecord>, DatabaseError> {
        with_locked(&self.conn, |conn| {
            conn.query_row(
                "SELECT id, timestamp, name, current_script, serialized_initial_props
                 FROM sessions WHERE id = ?1",
                params![id],
                Self::row_to_session,
            )
            .optional()
        })
    }

    /// All sessions, oldest first
    pub fn list(&self) -> Result<Vec<SessionRecord>, DatabaseError> {
        with_locked(&self.conn, |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, name, current_script, serialized_initial_props
                 FROM sessions ORDER BY id",
            )?;
            let sessions = stmt
                .query_map([], Self::row_to_session)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sessions)
        })
    }

    /// Delete a session (cascades to its checkpoints). Returns whether a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        with_locked(&self.conn, |conn| {
            let removed = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
    }

    fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<SessionRecord> {
        Ok(SessionRecord {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            name: row.get(2)?,
            current_script: row.get(3)?,
            serialized_initial_props: row.get(4)?,
        })
    }
}
