//! Data persistence layer for babar
//!
//! This module provides SQLite-based storage for sessions and their checkpoints.

mod checkpoint;
mod database;
mod models;
mod schema;
mod session;

pub use checkpoint::CheckpointStore;
pub use database::{Database, DatabaseError};
pub use models::{now_timestamp, to_timestamp, CheckpointRecord, SessionRecord};
pub use schema::SCHEMA_VERSION;
pub use session::SessionStore;
