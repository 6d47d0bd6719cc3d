//! Path utilities for babar project directories

use std::path::{Path, PathBuf};

/// Marker file that identifies a project root
pub const MARKER_FILENAME: &str = ".babar.json";

/// Directory under the project root holding all babar artifacts
pub const DATA_DIRNAME: &str = ".babar";

const DATABASE_FILENAME: &str = "db.sqlite";
const SESSIONS_DIRNAME: &str = "sessions";
const SETTINGS_FILENAME: &str = "config.toml";
const PROJECT_ARCHIVE_FILENAME: &str = "project_archived.zip";

/// Walk upward from `start` looking for a directory containing the marker file.
///
/// Returns the first match (`start` itself included), or `None` when no
/// ancestor carries a marker.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(MARKER_FILENAME).is_file())
        .map(Path::to_path_buf)
}

/// Resolved on-disk layout of a babar project.
///
/// `root` is `/.../my_project/`, not `/.../my_project/.babar/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discover the project root starting from `start`
    pub fn discover(start: &Path) -> Option<Self> {
        find_project_root(start).map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the marker file (`<root>/.babar.json`)
    pub fn marker_path(&self) -> PathBuf {
        self.root.join(MARKER_FILENAME)
    }

    /// `<root>/.babar`
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIRNAME)
    }

    /// `<root>/.babar/db.sqlite`
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(DATABASE_FILENAME)
    }

    /// `<root>/.babar/config.toml`
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir().join(SETTINGS_FILENAME)
    }

    /// `<root>/.babar/sessions`
    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir().join(SESSIONS_DIRNAME)
    }

    /// `<root>/.babar/sessions/<session_id>`
    pub fn session_dir(&self, session_id: i64) -> PathBuf {
        self.sessions_dir().join(session_id.to_string())
    }

    /// `<root>/.babar/sessions/<session_id>/project_archived.zip`
    pub fn project_archive_path(&self, session_id: i64) -> PathBuf {
        self.session_dir(session_id).join(PROJECT_ARCHIVE_FILENAME)
    }
}
