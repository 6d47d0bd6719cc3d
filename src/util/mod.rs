//! Utility modules

pub mod paths;

pub use paths::{find_project_root, ProjectPaths, DATA_DIRNAME, MARKER_FILENAME};
