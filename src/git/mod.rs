//! Git awareness: file classification and project snapshots

mod archive;
mod repo;

pub use archive::{ArchiveError, ProjectArchiver};
pub use repo::{GitCli, IgnoreStatus, VersionControl};
