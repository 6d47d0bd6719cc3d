//! SQLite database management

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::schema;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to create data directory: {0}")]
    CreateDir(std::io::Error),
    #[error("Checkpoint {0} not found")]
    CheckpointNotFound(i64),
    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Database connection wrapper
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    /// Path to the database file
    pub path: PathBuf,
}

impl Database {
    /// Open or create a database at the specified path.
    ///
    /// The schema is only created when the file did not exist before this call.
    pub fn open(path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DatabaseError::CreateDir)?;
        }

        let existed = path.exists();
        let conn = Connection::open(&path)?;
        // Cascades from sessions to checkpoints depend on this.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        if !existed {
            schema::create_schema(&conn)?;
            tracing::info!(path = %path.display(), "Created session database");
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Get a reference to the connection (for DAOs)
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// Execute a closure with the connection
    pub fn with_connection<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        with_locked(&self.conn, f)
    }
}

/// Lock a shared connection and run `f` against it
pub(crate) fn with_locked<F, T>(conn: &Mutex<Connection>, f: F) -> Result<T, DatabaseError>
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
{
    let conn = conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
    f(&conn).map_err(DatabaseError::Sqlite)
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .finish()
    }
}
