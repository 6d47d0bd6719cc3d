//! Data models for sessions and checkpoints

use chrono::{DateTime, Utc};

/// Current time as fractional seconds since the UNIX epoch
pub fn now_timestamp() -> f64 {
    to_timestamp(Utc::now())
}

pub fn to_timestamp(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

fn from_timestamp(timestamp: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros((timestamp * 1_000_000.0).round() as i64)
}

/// A row of the `sessions` table
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: i64,
    /// Seconds since the UNIX epoch
    pub timestamp: f64,
    pub name: Option<String>,
    /// Script (argv[0]) that started the session
    pub current_script: String,
    /// Props as encoded by the session's codec
    pub serialized_initial_props: Vec<u8>,
}

impl SessionRecord {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        from_timestamp(self.timestamp)
    }
}

/// A row of the `checkpoints` table. Never mutated once written.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointRecord {
    pub id: i64,
    pub timestamp: f64,
    pub serialized_data: Vec<u8>,
    pub session_id: i64,
}

impl CheckpointRecord {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        from_timestamp(self.timestamp)
    }
}
