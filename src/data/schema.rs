//! Session database schema.
//!
//! Timestamps are all in seconds since the UNIX epoch (UTC).

use rusqlite::Connection;

pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
    CREATE TABLE sessions (
        id INTEGER PRIMARY KEY NOT NULL,
        timestamp REAL NOT NULL,
        name TEXT,
        current_script TEXT NOT NULL,
        serialized_initial_props BLOB NOT NULL
    );
    CREATE TABLE checkpoints (
        id INTEGER PRIMARY KEY NOT NULL,
        timestamp REAL NOT NULL,
        serialized_data BLOB NOT NULL,
        session_id INTEGER NOT NULL,
        FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE ON UPDATE CASCADE
    );
    CREATE INDEX idx_checkpoints_session ON checkpoints(session_id);
"#;

/// Create both tables on a fresh database file
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
