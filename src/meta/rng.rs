//! RNG state capture.
//!
//! ChaCha generators are fully described by their seed, stream and word
//! position, so a captured state replays the exact same sequence of draws.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::{ChaCha12Rng, ChaCha20Rng, ChaCha8Rng};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{MetaError, MetaHandler};

/// Handle to a generator shared between the host and a meta handler
pub type SharedRng<R> = Arc<Mutex<R>>;

pub fn shared_rng<R>(rng: R) -> SharedRng<R> {
    Arc::new(Mutex::new(rng))
}

/// The process-wide general-purpose generator, seeded once from the thread RNG
pub fn global_rng() -> SharedRng<ChaCha8Rng> {
    static CELL: OnceLock<SharedRng<ChaCha8Rng>> = OnceLock::new();
    CELL.get_or_init(|| shared_rng(ChaCha8Rng::from_rng(&mut rand::rng())))
        .clone()
}

/// Complete internal state of a ChaCha generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: [u8; 32],
    pub stream: u64,
    /// `u128` as a decimal string; JSON numbers cannot hold it
    pub word_pos: String,
}

/// A generator whose state can be captured and replayed
pub trait RestorableRng: Send + 'static {
    fn capture(&self) -> RngState;
    fn replay(&mut self, state: &RngState) -> Result<(), MetaError>;
}

macro_rules! impl_restorable_chacha {
    ($($rng:ty),* $(,)?) => {
        $(
            impl RestorableRng for $rng {
                fn capture(&self) -> RngState {
                    RngState {
                        seed: self.get_seed(),
                        stream: self.get_stream(),
                        word_pos: self.get_word_pos().to_string(),
                    }
                }

                fn replay(&mut self, state: &RngState) -> Result<(), MetaError> {
                    let word_pos: u128 = state.word_pos.parse().map_err(|_| {
                        MetaError::Invalid(format!("bad word position `{}`", state.word_pos))
                    })?;
                    let mut rng = <$rng>::from_seed(state.seed);
                    rng.set_stream(state.stream);
                    rng.set_word_pos(word_pos);
                    *self = rng;
                    Ok(())
                }
            }
        )*
    };
}

impl_restorable_chacha!(ChaCha8Rng, ChaCha12Rng, ChaCha20Rng);

/// Meta handler governing one shared generator
pub struct RngStateHandler<R> {
    rng: SharedRng<R>,
}

impl<R: RestorableRng> RngStateHandler<R> {
    pub fn new(rng: SharedRng<R>) -> Self {
        Self { rng }
    }
}

impl<R: RestorableRng> MetaHandler for RngStateHandler<R> {
    fn freeze(&self) -> Result<Option<Value>, MetaError> {
        let state = self.rng.lock().capture();
        Ok(Some(serde_json::to_value(state)?))
    }

    fn restore(&self, value: &Value) -> Result<(), MetaError> {
        let state: RngState = serde_json::from_value(value.clone())?;
        self.rng.lock().replay(&state)
    }
}
