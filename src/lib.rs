pub mod config;
pub mod data;
pub mod git;
pub mod meta;
pub mod session;
pub mod util;

pub use config::{ArchiveCompression, Settings};
pub use data::{CheckpointRecord, CheckpointStore, Database, SessionRecord, SessionStore};
pub use git::{GitCli, ProjectArchiver, VersionControl};
pub use meta::{AmbientCapabilities, MetaHandler, MetaRegistry};
pub use session::{
    Codec, Fields, JsonCodec, Session, SessionBuilder, SessionError, SessionStatus, Transition,
};
pub use util::{find_project_root, ProjectPaths};
