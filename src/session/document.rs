//! The checkpoint document: `{meta, payload: {props, state}}`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::codec::{Codec, CodecError};

/// Key/value mapping used for props and state
pub type Fields = Map<String, Value>;

/// Props and state of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub props: Fields,
    pub state: Fields,
}

/// Everything a checkpoint row stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointData {
    pub meta: BTreeMap<String, Value>,
    pub payload: Payload,
}

#[derive(Serialize)]
struct CheckpointDataRef<'a> {
    meta: &'a BTreeMap<String, Value>,
    payload: &'a Payload,
}

impl CheckpointData {
    pub fn decode(codec: &dyn Codec, bytes: &[u8]) -> Result<Self, CodecError> {
        let value = codec.decode(bytes)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Encode a checkpoint without cloning the payload
pub fn encode_checkpoint(
    codec: &dyn Codec,
    meta: &BTreeMap<String, Value>,
    payload: &Payload,
) -> Result<Vec<u8>, CodecError> {
    let value = serde_json::to_value(CheckpointDataRef { meta, payload })?;
    codec.encode(&value)
}
