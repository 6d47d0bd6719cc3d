//! Shared test utilities for babar
//!
//! This module provides common helpers for integration tests:
//! - Git repository fixtures
//! - Temporary babar projects and session builders

pub mod git_fixtures;
pub mod project;
