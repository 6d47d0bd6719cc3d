use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::codec::CodecError;
use crate::config::SettingsError;
use crate::data::DatabaseError;
use crate::git::ArchiveError;
use crate::meta::MetaError;

/// An illegal call to `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `start` on a session that already began
    Restart,
    /// `start` on a session revived from a checkpoint
    StartAfterRevive,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Restart => write!(f, "you cannot re-start a session"),
            Transition::StartAfterRevive => write!(
                f,
                "you cannot start a session after reviving it from a checkpoint"
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(
        "Could not find a `{marker}` file in {} or any of its parents. \
         Set up babar before starting any sessions!",
        .start.display()
    )]
    ConfigurationNotFound {
        start: PathBuf,
        marker: &'static str,
    },
    #[error("Invalid transition: {0}")]
    InvalidTransition(Transition),
    #[error("The session must be started before it can checkpoint")]
    NotBegun,
    #[error("Props and state are only available after starting or reviving a session")]
    NotReady,
    #[error("Cannot assign to prop `{0}` after starting a session; use a state key instead")]
    PropImmutable(String),
    #[error("No prop or state named `{0}`; assign state keys before reading them")]
    KeyNotFound(String),
    #[error("Value of `{key}` does not have the requested type: {source}")]
    KeyType {
        key: String,
        source: serde_json::Error,
    },
    #[error("Checkpoint {0} not found")]
    CheckpointNotFound(i64),
    #[error("Session directory already exists: {}", .0.display())]
    DirectoryConflict(PathBuf),
    #[error("Database error: {0}")]
    Database(DatabaseError),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("Meta state error: {0}")]
    Meta(#[from] MetaError),
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DatabaseError> for SessionError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::CheckpointNotFound(id) => SessionError::CheckpointNotFound(id),
            other => SessionError::Database(other),
        }
    }
}
