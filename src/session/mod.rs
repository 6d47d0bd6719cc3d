//! Sessions: lifecycle, props/state access and checkpoint orchestration

mod builder;
mod codec;
mod document;
mod error;
mod lifecycle;

pub use builder::SessionBuilder;
pub use codec::{Codec, CodecError, JsonCodec};
pub use document::{encode_checkpoint, CheckpointData, Fields, Payload};
pub use error::{SessionError, Transition};
pub use lifecycle::{Session, SessionStatus};
