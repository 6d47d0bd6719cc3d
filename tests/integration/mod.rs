//! Integration tests for babar
//!
//! These tests drive sessions end to end against a real SQLite file,
//! real session directories and, where noted, a real `git`.

#[path = "../common/mod.rs"]
pub mod common;

pub mod project_archive;
pub mod store_integrity;
