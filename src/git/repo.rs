//! Git queries needed to classify project files

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::archive::ArchiveError;

/// Outcome of an ignore-rule check for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreStatus {
    Ignored,
    NotIgnored,
}

/// The version-control operations the archiver depends on
pub trait VersionControl {
    /// Whether `root` is inside a working tree
    fn is_repository(&self, root: &Path) -> bool;

    /// Tracked file paths, relative to `root`
    fn tracked_files(&self, root: &Path) -> Result<Vec<PathBuf>, ArchiveError>;

    /// Check `path` (absolute or relative to `root`) against the ignore rules
    fn is_ignored(&self, root: &Path, path: &Path) -> Result<IgnoreStatus, ArchiveError>;
}

/// [`VersionControl`] backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git binary instead of the one on `PATH`
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command<I, S>(&self, root: &Path, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).current_dir(root);
        cmd
    }
}

impl VersionControl for GitCli {
    fn is_repository(&self, root: &Path) -> bool {
        self.command(root, ["rev-parse", "--is-inside-work-tree"])
            .output()
            .map(|o| o.status.success() && o.stdout.starts_with(b"true"))
            .unwrap_or(false)
    }

    fn tracked_files(&self, root: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
        // -z keeps paths with spaces or non-ASCII characters verbatim
        let output = self.command(root, ["ls-files", "-z"]).output()?;

        if !output.status.success() {
            return Err(ArchiveError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(parse_nul_separated(&output.stdout))
    }

    fn is_ignored(&self, root: &Path, path: &Path) -> Result<IgnoreStatus, ArchiveError> {
        let status = self
            .command(root, [OsStr::new("check-ignore"), OsStr::new("--quiet")])
            .arg(path)
            .status()?;

        match status.code() {
            Some(0) => Ok(IgnoreStatus::Ignored),
            Some(1) => Ok(IgnoreStatus::NotIgnored),
            code => Err(ArchiveError::UnexpectedIgnoreStatus {
                path: path.to_path_buf(),
                code,
            }),
        }
    }
}

fn parse_nul_separated(stdout: &[u8]) -> Vec<PathBuf> {
    stdout
        .split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(path_from_bytes)
        .collect()
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

// git emits UTF-8 paths on Windows
#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
