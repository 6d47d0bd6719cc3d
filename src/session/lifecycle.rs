//! Session lifecycle.
//!
//! ```text
//!   INIT --start--> BEGUN
//!    |                |
//!    +----revive------+----> REVIVED --revive--> REVIVED
//! ```
//!
//! `start` is only legal from INIT. `revive` is legal from any status and
//! never leaves REVIVED. Props and state do not exist before the first
//! transition; afterwards props are read-only and state is freely writable.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::builder::SessionBuilder;
use super::codec::Codec;
use super::document::{encode_checkpoint, CheckpointData, Fields, Payload};
use super::error::{SessionError, Transition};
use crate::config::Settings;
use crate::data::{now_timestamp, CheckpointStore, Database, SessionStore};
use crate::git::{ProjectArchiver, VersionControl};
use crate::meta::MetaRegistry;
use crate::util::ProjectPaths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Init,
    Begun,
    Revived,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Init => "INIT",
            SessionStatus::Begun => "BEGUN",
            SessionStatus::Revived => "REVIVED",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
struct Stores {
    sessions: SessionStore,
    checkpoints: CheckpointStore,
}

impl Stores {
    fn open(paths: &ProjectPaths) -> Result<Self, SessionError> {
        let db = Database::open(paths.database_path())?;
        Ok(Self {
            sessions: SessionStore::new(db.connection()),
            checkpoints: CheckpointStore::new(db.connection()),
        })
    }
}

/// One tracked run of a computation
pub struct Session {
    name: Option<String>,
    current_script: Option<String>,
    paths: ProjectPaths,
    settings: Settings,
    meta: MetaRegistry,
    codec: Box<dyn Codec>,
    vcs: Box<dyn VersionControl>,
    stores: Option<Stores>,
    status: SessionStatus,
    session_id: Option<i64>,
    fields: Option<Payload>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// An unnamed session rooted at the project containing the current directory
    pub fn new() -> Result<Self, SessionError> {
        SessionBuilder::new().build()
    }

    pub fn named(name: impl Into<String>) -> Result<Self, SessionError> {
        SessionBuilder::new().name(name).build()
    }

    pub(super) fn from_parts(
        name: Option<String>,
        current_script: String,
        paths: ProjectPaths,
        settings: Settings,
        meta: MetaRegistry,
        codec: Box<dyn Codec>,
        vcs: Box<dyn VersionControl>,
    ) -> Self {
        Self {
            name,
            current_script: Some(current_script),
            paths,
            settings,
            meta,
            codec,
            vcs,
            stores: None,
            status: SessionStatus::Init,
            session_id: None,
            fields: None,
        }
    }

    /// Begin the session with its immutable props.
    ///
    /// Records the session row, provisions the session directory and, when
    /// the project is a git working tree, snapshots it into that directory.
    /// The status only advances to BEGUN once all of that succeeded.
    pub fn start(&mut self, props: Fields) -> Result<&mut Self, SessionError> {
        match self.status {
            SessionStatus::Init => {}
            SessionStatus::Begun => {
                return Err(SessionError::InvalidTransition(Transition::Restart))
            }
            SessionStatus::Revived => {
                return Err(SessionError::InvalidTransition(
                    Transition::StartAfterRevive,
                ))
            }
        }

        let serialized_props = self.codec.encode(&Value::Object(props.clone()))?;
        let stores = self.stores()?;
        let session_id = stores.sessions.insert_session(
            now_timestamp(),
            self.name.as_deref(),
            self.current_script.as_deref().unwrap_or_default(),
            &serialized_props,
        )?;

        let session_dir = self.paths.session_dir(session_id);
        fs::create_dir_all(self.paths.sessions_dir())?;
        fs::create_dir(&session_dir).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => SessionError::DirectoryConflict(session_dir.clone()),
            _ => SessionError::Io(e),
        })?;

        if self.settings.archive_project && self.vcs.is_repository(self.paths.root()) {
            let archive_path = self.paths.project_archive_path(session_id);
            let entries = ProjectArchiver::new(&*self.vcs)
                .compression(self.settings.archive_compression)
                .exclude_dir(self.paths.data_dir())
                .archive(self.paths.root(), &archive_path)?;
            tracing::info!(
                session_id,
                archive = %archive_path.display(),
                files = entries.len(),
                "Archived project snapshot"
            );
        }

        self.fields = Some(Payload {
            props,
            state: Fields::new(),
        });
        self.session_id = Some(session_id);
        self.status = SessionStatus::Begun;
        tracing::info!(session_id, name = ?self.name, "Session started");

        Ok(self)
    }

    /// Replace props and state with those of a checkpoint and replay its meta state.
    ///
    /// Legal from any status. The revived session adopts the checkpoint's
    /// parent session id and drops its own name and script identity.
    pub fn revive(&mut self, checkpoint_id: i64) -> Result<(), SessionError> {
        let stores = self.stores()?;
        let (blob, session_id) = stores.checkpoints.get_checkpoint(checkpoint_id)?;
        let data = CheckpointData::decode(&*self.codec, &blob)?;

        self.meta.restore_all(&data.meta)?;

        self.name = None;
        self.current_script = None;
        self.session_id = Some(session_id);
        self.fields = Some(data.payload);
        self.status = SessionStatus::Revived;

        tracing::info!(checkpoint_id, session_id, "Session revived");
        Ok(())
    }

    /// Persist meta state plus props and state under the active session.
    ///
    /// Returns the new checkpoint id, or `None` (with a warning) for a
    /// revived session, which is a read-only replay.
    pub fn checkpoint(&mut self) -> Result<Option<i64>, SessionError> {
        let session_id = match (self.status, self.session_id) {
            (SessionStatus::Init, _) | (SessionStatus::Begun, None) => {
                return Err(SessionError::NotBegun)
            }
            (SessionStatus::Revived, _) => {
                tracing::warn!(
                    session_id = ?self.session_id,
                    "Checkpointing after reviving a session has no effect"
                );
                return Ok(None);
            }
            (SessionStatus::Begun, Some(id)) => id,
        };

        let payload = self.fields.as_ref().ok_or(SessionError::NotBegun)?;
        let meta = self.meta.freeze_all()?;
        let serialized = encode_checkpoint(&*self.codec, &meta, payload)?;

        let checkpoint_id =
            self.stores()?
                .checkpoints
                .insert_checkpoint(now_timestamp(), &serialized, session_id)?;
        tracing::info!(session_id, checkpoint_id, "Checkpoint saved");

        Ok(Some(checkpoint_id))
    }

    /// Read a prop, or a state key when no prop has that name
    pub fn get(&self, key: &str) -> Result<&Value, SessionError> {
        let fields = self.fields.as_ref().ok_or(SessionError::NotReady)?;
        fields
            .props
            .get(key)
            .or_else(|| fields.state.get(key))
            .ok_or_else(|| SessionError::KeyNotFound(key.to_string()))
    }

    /// [`get`](Session::get) and deserialize into `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, SessionError> {
        let value = self.get(key)?.clone();
        serde_json::from_value(value).map_err(|source| SessionError::KeyType {
            key: key.to_string(),
            source,
        })
    }

    /// Insert or overwrite a state key. Prop names are rejected.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), SessionError> {
        let fields = self.fields.as_mut().ok_or(SessionError::NotReady)?;
        let key = key.into();
        if fields.props.contains_key(&key) {
            return Err(SessionError::PropImmutable(key));
        }
        fields.state.insert(key, value.into());
        Ok(())
    }

    /// Prop keys followed by state keys; empty before the session starts
    pub fn keys(&self) -> Vec<&str> {
        match &self.fields {
            Some(fields) => fields
                .props
                .keys()
                .chain(fields.state.keys())
                .map(String::as_str)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields
            .as_ref()
            .is_some_and(|f| f.props.contains_key(key) || f.state.contains_key(key))
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Id of the session row that checkpoints are written under
    pub fn id(&self) -> Option<i64> {
        self.session_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn current_script(&self) -> Option<&str> {
        self.current_script.as_deref()
    }

    pub fn props(&self) -> Option<&Fields> {
        self.fields.as_ref().map(|f| &f.props)
    }

    pub fn state(&self) -> Option<&Fields> {
        self.fields.as_ref().map(|f| &f.state)
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn root(&self) -> &std::path::Path {
        self.paths.root()
    }

    pub fn session_dir(&self) -> Option<PathBuf> {
        self.session_id.map(|id| self.paths.session_dir(id))
    }

    pub fn meta_registry(&self) -> &MetaRegistry {
        &self.meta
    }

    pub fn meta_registry_mut(&mut self) -> &mut MetaRegistry {
        &mut self.meta
    }

    /// Open the database on first use
    fn stores(&mut self) -> Result<Stores, SessionError> {
        if let Some(stores) = &self.stores {
            return Ok(stores.clone());
        }
        let stores = Stores::open(&self.paths)?;
        self.stores = Some(stores.clone());
        Ok(stores)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.session_id)
            .field("name", &self.name)
            .field("status", &self.status)
            .field("root", &self.paths.root())
            .field("meta", &self.meta)
            .finish()
    }
}
