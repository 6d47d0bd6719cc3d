//! Temporary babar projects
//!
//! `TestProject` owns a temp directory holding the `.babar.json` marker.
//! Sessions built from it never snapshot the tree and carry no RNG
//! handlers, so tests stay independent of the process-wide generator.

use std::path::{Path, PathBuf};

use babar::git::{ArchiveError, IgnoreStatus};
use babar::{
    AmbientCapabilities, Database, Fields, MetaRegistry, ProjectPaths, Session, SessionBuilder,
    Settings, VersionControl,
};
use tempfile::TempDir;

pub struct TestProject {
    _dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)] // Used in integration tests via #[path] includes
impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().to_path_buf();
        std::fs::write(path.join(babar::util::MARKER_FILENAME), "{}\n").unwrap();
        Self { _dir: dir, path }
    }

    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::new(&self.path)
    }

    /// Builder rooted here with archiving off and no ambient RNG handlers
    pub fn builder(&self) -> SessionBuilder {
        builder_at(&self.path)
    }

    pub fn session(&self) -> Session {
        self.builder().build().expect("Failed to build session")
    }

    /// Session that has already been started with `props`
    pub fn started(&self, props: serde_json::Value) -> Session {
        let mut session = self.session();
        session.start(fields(props)).expect("Failed to start session");
        session
    }

    pub fn database(&self) -> Database {
        Database::open(self.paths().database_path()).expect("Failed to open database")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
pub fn builder_at(root: &Path) -> SessionBuilder {
    Session::builder()
        .start_dir(root)
        .current_script("train.py")
        .settings(Settings {
            archive_project: false,
            ..Settings::default()
        })
        .meta_registry(MetaRegistry::from_capabilities(&AmbientCapabilities::none()))
}

/// Convert a JSON object literal into [`Fields`]
pub fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A repository whose every query fails
#[allow(dead_code)]
pub struct BrokenVcs;

impl VersionControl for BrokenVcs {
    fn is_repository(&self, _root: &Path) -> bool {
        true
    }

    fn tracked_files(&self, _root: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
        Err(ArchiveError::CommandFailed("fatal: index file corrupt".to_string()))
    }

    fn is_ignored(&self, _root: &Path, path: &Path) -> Result<IgnoreStatus, ArchiveError> {
        Err(ArchiveError::UnexpectedIgnoreStatus {
            path: path.to_path_buf(),
            code: Some(128),
        })
    }
}
