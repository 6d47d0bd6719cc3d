//! Integration tests for project snapshots against a real git repository

use super::common::git_fixtures::TestRepo;
use super::common::project::{builder_at, fields};
use babar::{ArchiveCompression, GitCli, ProjectArchiver, ProjectPaths, Settings, VersionControl};
use serde_json::json;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

fn zip_names(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// Tracked and untracked files are kept, ignored ones are not
#[test]
fn test_snapshot_contents() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "tracked", "Add a.txt");
    repo.create_file("b.txt", "untracked");
    repo.create_file("c.txt", "ignored");
    repo.exclude_locally("c.txt");

    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("project_archived.zip");
    let written = ProjectArchiver::new(&GitCli::new())
        .archive(&repo.path, &out)
        .unwrap();

    assert_eq!(written, vec!["a.txt", "b.txt"]);
    assert_eq!(zip_names(&out), vec!["a.txt", "b.txt"]);
}

#[test]
fn test_ignored_directories_are_pruned() {
    let repo = TestRepo::new();
    repo.commit_file("src/model.py", "class Model: ...", "Add model");
    repo.create_file("build/cache/blob.bin", "junk");
    repo.create_file("notes/todo.md", "- tune lr");
    repo.exclude_locally("build");

    let files = ProjectArchiver::new(&GitCli::new())
        .collect(&repo.path)
        .unwrap();
    let root = repo.path.canonicalize().unwrap();
    let mut names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    names.sort();

    assert_eq!(names, vec!["notes/todo.md", "src/model.py"]);
}

#[test]
fn test_tracked_file_matching_ignore_rule_is_kept() {
    let repo = TestRepo::new();
    repo.commit_file("weights.bin", "0101", "Add weights");
    repo.exclude_locally("*.bin");

    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("snapshot.zip");
    ProjectArchiver::new(&GitCli::new())
        .archive(&repo.path, &out)
        .unwrap();

    assert_eq!(zip_names(&out), vec!["weights.bin"]);
}

#[test]
fn test_deleted_tracked_file_is_skipped() {
    let repo = TestRepo::new();
    repo.commit_file("keep.txt", "keep", "Add keep");
    repo.commit_file("gone.txt", "gone", "Add gone");
    std::fs::remove_file(repo.path.join("gone.txt")).unwrap();

    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("snapshot.zip");
    let written = ProjectArchiver::new(&GitCli::new())
        .archive(&repo.path, &out)
        .unwrap();

    assert_eq!(written, vec!["keep.txt"]);
}

#[test]
fn test_paths_with_spaces() {
    let repo = TestRepo::new();
    repo.commit_file("run notes.txt", "lr sweep", "Add notes");

    let tracked = GitCli::new().tracked_files(&repo.path).unwrap();
    assert_eq!(tracked, vec![Path::new("run notes.txt").to_path_buf()]);
}

#[test]
fn test_git_detection() {
    let repo = TestRepo::new();
    let plain = TempDir::new().unwrap();
    let git = GitCli::new();

    assert!(git.is_repository(&repo.path));
    assert!(!git.is_repository(plain.path()));
}

/// Starting a session inside a git project snapshots it into the session directory
#[test]
fn test_session_start_writes_snapshot() {
    let repo = TestRepo::with_marker();
    repo.commit_file("train.py", "print('hi')", "Add training script");
    repo.create_file("data/params.json", "{}");

    let mut session = builder_at(&repo.path)
        .settings(Settings::default())
        .build()
        .unwrap();
    session.start(fields(json!({"lr": 0.1}))).unwrap();
    let session_id = session.id().unwrap();

    let archive_path = ProjectPaths::new(&repo.path).project_archive_path(session_id);
    assert!(archive_path.is_file());

    let names = zip_names(&archive_path);
    assert_eq!(names, vec![".babar.json", "data/params.json", "train.py"]);
    assert!(!names.iter().any(|n| n.starts_with(".babar/")));
}

#[test]
fn test_session_snapshot_compression() {
    let repo = TestRepo::with_marker();
    repo.commit_file("train.py", "print('hi')\n".repeat(64).as_str(), "Add script");

    let mut session = builder_at(&repo.path)
        .settings(Settings {
            archive_project: true,
            archive_compression: ArchiveCompression::Stored,
        })
        .build()
        .unwrap();
    session.start(fields(json!({}))).unwrap();

    let archive_path = ProjectPaths::new(&repo.path).project_archive_path(session.id().unwrap());
    let mut archive = zip::ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
    let entry = archive.by_name("train.py").unwrap();
    assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
}

#[test]
fn test_session_outside_git_has_no_snapshot() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(babar::util::MARKER_FILENAME), "{}\n").unwrap();

    let mut session = builder_at(dir.path())
        .settings(Settings::default())
        .build()
        .unwrap();
    session.start(fields(json!({}))).unwrap();

    let paths = ProjectPaths::new(dir.path());
    assert!(paths.session_dir(1).is_dir());
    assert!(!paths.project_archive_path(1).exists());
}
