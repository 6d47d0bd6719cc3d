//! Project snapshot archives.
//!
//! A snapshot holds every file needed to reproduce the project as it was when a
//! session started: the union of the files git tracks and the files a walk of
//! the working tree finds that no ignore rule matches. A file can be tracked
//! and still match an ignore rule added later, so the ignore check only
//! filters files git does not already know about.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;
use zip::write::FileOptions;

use super::repo::{IgnoreStatus, VersionControl};
use crate::config::ArchiveCompression;

const GIT_DIRNAME: &str = ".git";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Failed to walk project tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Git command failed: {0}")]
    CommandFailed(String),
    #[error("git check-ignore exited with {code:?} for {path}")]
    UnexpectedIgnoreStatus { path: PathBuf, code: Option<i32> },
    #[error("Path is outside the project root: {0}")]
    OutsideRoot(PathBuf),
}

/// Builds the zip snapshot of a project
pub struct ProjectArchiver<'a> {
    vcs: &'a dyn VersionControl,
    compression: ArchiveCompression,
    excluded_dirs: Vec<PathBuf>,
}

impl<'a> ProjectArchiver<'a> {
    pub fn new(vcs: &'a dyn VersionControl) -> Self {
        Self {
            vcs,
            compression: ArchiveCompression::default(),
            excluded_dirs: Vec::new(),
        }
    }

    pub fn compression(mut self, compression: ArchiveCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Never walk into or archive anything below `dir`
    pub fn exclude_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.excluded_dirs.push(dir.into());
        self
    }

    /// Tracked files as absolute paths under `root`
    pub fn tracked_paths(&self, root: &Path) -> Result<BTreeSet<PathBuf>, ArchiveError> {
        let root = root.canonicalize()?;
        let excluded = self.resolved_exclusions();

        let paths = self
            .vcs
            .tracked_files(&root)?
            .into_iter()
            .map(|rel| root.join(rel))
            .filter(|path| !is_excluded(path, &excluded))
            .filter(|path| {
                // Deleted files and submodule gitlinks stay in the index
                let keep = path.is_file();
                if !keep {
                    tracing::debug!(path = %path.display(), "Skipping tracked path that is not a file");
                }
                keep
            })
            .collect();
        Ok(paths)
    }

    /// Files found by walking `root` that no ignore rule matches.
    ///
    /// Ignored directories, `.git` and excluded directories are pruned
    /// without being descended into.
    pub fn unignored_paths(&self, root: &Path) -> Result<BTreeSet<PathBuf>, ArchiveError> {
        let root = root.canonicalize()?;
        let excluded = self.resolved_exclusions();

        let mut failure: Option<ArchiveError> = None;
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if failure.is_some() {
                    return false;
                }
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                if entry.file_name() == GIT_DIRNAME || is_excluded(entry.path(), &excluded) {
                    return false;
                }
                match self.vcs.is_ignored(&root, entry.path()) {
                    Ok(status) => status == IgnoreStatus::NotIgnored,
                    Err(err) => {
                        failure = Some(err);
                        false
                    }
                }
            });

        let mut paths = BTreeSet::new();
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }
            if self.vcs.is_ignored(&root, entry.path())? == IgnoreStatus::NotIgnored {
                paths.insert(entry.into_path());
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(paths),
        }
    }

    /// Union of tracked and unignored files, as absolute paths
    pub fn collect(&self, root: &Path) -> Result<BTreeSet<PathBuf>, ArchiveError> {
        let mut paths = self.tracked_paths(root)?;
        paths.extend(self.unignored_paths(root)?);
        Ok(paths)
    }

    /// Write the snapshot of `root` to `out_path`.
    ///
    /// Entry names are paths relative to `root` with `/` separators. Returns
    /// the entry names in the order they were written.
    pub fn archive(&self, root: &Path, out_path: &Path) -> Result<Vec<String>, ArchiveError> {
        let files = self.collect(root)?;
        let root = root.canonicalize()?;

        let zip_file = File::create(out_path)?;
        let mut zip = zip::ZipWriter::new(zip_file);

        let mut names = Vec::with_capacity(files.len());
        for path in &files {
            let name = entry_name(&root, path)?;
            let size = path.metadata()?.len();
            let options = FileOptions::default()
                .compression_method(self.compression.as_zip_method())
                .large_file(size > u64::from(u32::MAX));

            zip.start_file(name.as_str(), options)?;
            let mut src = File::open(path)?;
            io::copy(&mut src, &mut zip)?;
            names.push(name);
        }

        let mut zip_file = zip.finish()?;
        zip_file.flush()?;

        tracing::debug!(
            root = %root.display(),
            out = %out_path.display(),
            entries = names.len(),
            "Wrote project archive"
        );
        Ok(names)
    }

    fn resolved_exclusions(&self) -> Vec<PathBuf> {
        self.excluded_dirs
            .iter()
            .map(|dir| dir.canonicalize().unwrap_or_else(|_| dir.clone()))
            .collect()
    }
}

fn is_excluded(path: &Path, excluded: &[PathBuf]) -> bool {
    excluded.iter().any(|dir| path.starts_with(dir))
}

fn entry_name(root: &Path, path: &Path) -> Result<String, ArchiveError> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| ArchiveError::OutsideRoot(path.to_path_buf()))?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
