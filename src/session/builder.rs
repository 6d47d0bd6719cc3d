use std::path::PathBuf;

use super::codec::{Codec, JsonCodec};
use super::error::SessionError;
use super::lifecycle::Session;
use crate::config::Settings;
use crate::git::{GitCli, VersionControl};
use crate::meta::{AmbientCapabilities, MetaRegistry};
use crate::util::{ProjectPaths, MARKER_FILENAME};

/// Configures and constructs a [`Session`]
#[derive(Default)]
pub struct SessionBuilder {
    name: Option<String>,
    start_dir: Option<PathBuf>,
    current_script: Option<String>,
    settings: Option<Settings>,
    meta: Option<MetaRegistry>,
    codec: Option<Box<dyn Codec>>,
    vcs: Option<Box<dyn VersionControl>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Human-readable session name stored with the session row
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Start project-root discovery here instead of the current directory
    pub fn start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_dir = Some(dir.into());
        self
    }

    /// Override the recorded script path (defaults to argv[0])
    pub fn current_script(mut self, script: impl Into<String>) -> Self {
        self.current_script = Some(script.into());
        self
    }

    /// Use these settings instead of `<root>/.babar/config.toml`
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn meta_registry(mut self, registry: MetaRegistry) -> Self {
        self.meta = Some(registry);
        self
    }

    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Some(Box::new(codec));
        self
    }

    pub fn version_control(mut self, vcs: impl VersionControl + 'static) -> Self {
        self.vcs = Some(Box::new(vcs));
        self
    }

    /// Discover the project root and build an `INIT` session.
    ///
    /// Fails with [`SessionError::ConfigurationNotFound`] when no ancestor of
    /// the start directory holds the marker file. The database is not opened
    /// until the session first needs it.
    pub fn build(self) -> Result<Session, SessionError> {
        let start = match self.start_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let paths =
            ProjectPaths::discover(&start).ok_or_else(|| SessionError::ConfigurationNotFound {
                start: start.clone(),
                marker: MARKER_FILENAME,
            })?;

        let settings = match self.settings {
            Some(settings) => settings,
            None => Settings::load(&paths)?,
        };
        let meta = self
            .meta
            .unwrap_or_else(|| MetaRegistry::from_capabilities(&AmbientCapabilities::default()));
        let codec = self.codec.unwrap_or_else(|| Box::new(JsonCodec));
        let vcs = self.vcs.unwrap_or_else(|| Box::new(GitCli::new()));
        let current_script = self.current_script.unwrap_or_else(default_script);

        tracing::debug!(root = %paths.root().display(), "Discovered project root");

        Ok(Session::from_parts(
            self.name,
            current_script,
            paths,
            settings,
            meta,
            codec,
            vcs,
        ))
    }
}

fn default_script() -> String {
    std::env::args_os()
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_default()
}
