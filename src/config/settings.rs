use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::util::ProjectPaths;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Compression used for entries of the project snapshot archive
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveCompression {
    Stored,
    #[default]
    Deflated,
}

impl ArchiveCompression {
    pub fn as_zip_method(self) -> zip::CompressionMethod {
        match self {
            ArchiveCompression::Stored => zip::CompressionMethod::Stored,
            ArchiveCompression::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Per-project settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Snapshot the project into the session directory on start
    pub archive_project: bool,
    /// Compression for the snapshot archive entries
    pub archive_compression: ArchiveCompression,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            archive_project: true,
            archive_compression: ArchiveCompression::Deflated,
        }
    }
}

/// TOML representation of `.babar/config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlSettings {
    pub archive_project: Option<bool>,
    pub archive_compression: Option<ArchiveCompression>,
}

impl Settings {
    /// Load the project's settings, falling back to defaults when the file is absent
    pub fn load(paths: &ProjectPaths) -> Result<Self, SettingsError> {
        Self::load_from(&paths.settings_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let toml_settings =
            toml::from_str::<TomlSettings>(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let settings = Self::default().merge(toml_settings);
        tracing::debug!(path = %path.display(), ?settings, "Loaded project settings");
        Ok(settings)
    }

    fn merge(mut self, toml_settings: TomlSettings) -> Self {
        if let Some(archive_project) = toml_settings.archive_project {
            self.archive_project = archive_project;
        }
        if let Some(compression) = toml_settings.archive_compression {
            self.archive_compression = compression;
        }
        self
    }
}
