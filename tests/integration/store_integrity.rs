//! Integration tests for the SQLite store shared by sessions

use super::common::project::{fields, TestProject};
use babar::{CheckpointStore, Database, SessionStore};
use serde_json::json;

#[test]
fn test_deleting_session_removes_its_checkpoints() {
    let project = TestProject::new();
    let mut first = project.started(json!({"run": 1}));
    first.checkpoint().unwrap();
    first.checkpoint().unwrap();
    let mut second = project.started(json!({"run": 2}));
    second.checkpoint().unwrap();

    let db = project.database();
    let sessions = SessionStore::new(db.connection());
    let checkpoints = CheckpointStore::new(db.connection());
    assert_eq!(checkpoints.count().unwrap(), 3);

    assert!(sessions.delete(1).unwrap());
    assert_eq!(checkpoints.count().unwrap(), 1);
    assert!(checkpoints.list_for_session(1).unwrap().is_empty());
    assert_eq!(checkpoints.list_for_session(2).unwrap().len(), 1);
}

#[test]
fn test_checkpoint_rows_are_append_only() {
    let project = TestProject::new();
    let mut session = project.started(json!({}));
    session.set("step", 1).unwrap();
    let first = session.checkpoint().unwrap().unwrap();
    let before = CheckpointStore::new(project.database().connection())
        .get_checkpoint(first)
        .unwrap();

    session.set("step", 2).unwrap();
    session.checkpoint().unwrap();

    let after = CheckpointStore::new(project.database().connection())
        .get_checkpoint(first)
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_sessions_share_one_database_file() {
    let project = TestProject::new();
    let mut a = project.session();
    let mut b = project.session();
    a.start(fields(json!({"who": "a"}))).unwrap();
    b.start(fields(json!({"who": "b"}))).unwrap();
    a.checkpoint().unwrap();
    b.checkpoint().unwrap();

    let db = Database::open(project.paths().database_path()).unwrap();
    let records = CheckpointStore::new(db.connection());
    assert_eq!(records.list_for_session(1).unwrap().len(), 1);
    assert_eq!(records.list_for_session(2).unwrap().len(), 1);
}
