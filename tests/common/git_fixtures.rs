//! Git repository test fixtures
//!
//! Provides temporary git repositories that double as babar projects,
//! for exercising the project snapshot against a real `git`.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A temporary git repository for testing
///
/// The repository is removed when the `TestRepo` is dropped.
///
/// # Example
/// ```
/// let repo = TestRepo::new();
/// assert!(repo.path.join(".git").exists());
/// ```
pub struct TestRepo {
    /// TempDir handle (keeps directory alive until dropped)
    _dir: TempDir,
    /// Path to the repository root
    pub path: PathBuf,
}

impl TestRepo {
    /// Create an empty repository
    ///
    /// The repository will have:
    /// - Git initialized
    /// - User configured (test@example.com)
    /// - GPG signing disabled (for CI compatibility)
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().to_path_buf();

        Self::git(&path, &["init"]);
        Self::git(&path, &["config", "user.email", "test@example.com"]);
        Self::git(&path, &["config", "user.name", "Test User"]);
        // Disable GPG signing to ensure tests work on machines with global signing enabled
        Self::git(&path, &["config", "commit.gpgsign", "false"]);

        Self { _dir: dir, path }
    }

    /// Create a repository that is also a babar project root
    #[allow(dead_code)] // Used in integration tests via #[path] includes
    pub fn with_marker() -> Self {
        let repo = Self::new();
        repo.create_file(babar::util::MARKER_FILENAME, "{}\n");
        repo
    }

    /// Add a file and commit it
    #[allow(dead_code)]
    pub fn commit_file(&self, filename: &str, content: &str, message: &str) {
        self.create_file(filename, content);
        Self::git(&self.path, &["add", filename]);
        Self::git(&self.path, &["commit", "-m", message]);
    }

    /// Create a file without staging or committing
    /// Creates parent directories if they don't exist.
    pub fn create_file(&self, filename: &str, content: &str) {
        let file_path = self.path.join(filename);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(file_path, content).unwrap();
    }

    /// Ignore `pattern` through `.git/info/exclude`, leaving the tree untouched
    #[allow(dead_code)]
    pub fn exclude_locally(&self, pattern: &str) {
        let exclude = self.path.join(".git").join("info").join("exclude");
        std::fs::create_dir_all(exclude.parent().unwrap()).unwrap();
        let mut rules = std::fs::read_to_string(&exclude).unwrap_or_default();
        rules.push_str(pattern);
        rules.push('\n');
        std::fs::write(exclude, rules).unwrap();
    }

    /// Execute a git command in the repository
    fn git(path: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(path)
            .output()
            .unwrap_or_else(|e| panic!("Git command failed to execute: {}", e));

        if !output.status.success() {
            panic!(
                "Git command failed: git {}\nstderr: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }

    /// Execute a git command and return output (for queries)
    #[allow(dead_code)]
    pub fn git_output(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()
            .expect("Git command failed");

        if !output.status.success() {
            panic!(
                "Git command failed: git {}\nstderr: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            );
        }

        String::from_utf8_lossy(&output.stdout).to_string()
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
