//! Checkpoint data access object

use super::database::{with_locked, DatabaseError};
use super::models::CheckpointRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// Data access object for the `checkpoints` table
#[derive(Clone)]
pub struct CheckpointStore {
    conn: Arc<Mutex<Connection>>,
}

impl CheckpointStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Insert a checkpoint under `session_id` and return the generated id
    pub fn insert_checkpoint(
        &self,
        timestamp: f64,
        serialized_data: &[u8],
        session_id: i64,
    ) -> Result<i64, DatabaseError> {
        with_locked(&self.conn, |conn| {
            conn.execute(
                "INSERT INTO checkpoints (timestamp, serialized_data, session_id)
                 VALUES (?1, ?2, ?3)",
                params![timestamp, serialized_data, session_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Fetch a checkpoint's payload and parent session id
    pub fn get_checkpoint(&self, id: i64) -> Result<(Vec<u8>, i64), DatabaseError> {
        let found = with_locked(&self.conn, |conn| {
            conn.query_row(
                "SELECT serialized_data, session_id FROM checkpoints WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
        })?;
        found.ok_or(DatabaseError::CheckpointNotFound(id))
    }

    /// Checkpoints of one session, oldest first
    pub fn list_for_session(&self, session_id: i64) -> Result<Vec<CheckpointRecord>, DatabaseError> {
        with_locked(&self.conn, |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, serialized_data, session_id
                 FROM checkpoints WHERE session_id = ?1 ORDER BY id",
            )?;
            let checkpoints = stmt
                .query_map(params![session_id], Self::row_to_checkpoint)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(checkpoints)
        })
    }

    /// Total number of checkpoint rows
    pub fn count(&self) -> Result<i64, DatabaseError> {
        with_locked(&self.conn, |conn| {
            conn.query_row("SELECT COUNT(*) FROM checkpoints", [], |row| row.get(0))
        })
    }

    fn row_to_checkpoint(row: &rusqlite::Row) -> rusqlite::Result<CheckpointRecord> {
        Ok(CheckpointRecord {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            serialized_data: row.get(2)?,
            session_id: row.get(3)?,
        })
    }
}
