//! Ambient reproducibility state.
//!
//! A [`MetaHandler`] captures some piece of process-wide state that affects
//! reproducibility (RNG internals, the runtime version, argv) when a
//! checkpoint is taken, and replays it when a checkpoint is revived. The
//! [`MetaRegistry`] holds the handlers of one session in registration order.

mod process;
mod rng;

use std::collections::BTreeMap;

use rand_chacha::{ChaCha20Rng, ChaCha8Rng};
use serde_json::Value;
use thiserror::Error;

pub use process::{ArgvHandler, RuntimeVersionHandler};
pub use rng::{global_rng, shared_rng, RestorableRng, RngState, RngStateHandler, SharedRng};

pub const RNG_SEED: &str = "rand_seed";
pub const NUMERIC_SEED: &str = "numeric_seed";
pub const RUNTIME_VERSION: &str = "runtime.version";
pub const PROCESS_ARGV: &str = "process.argv";

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("malformed state: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid state: {0}")]
    Invalid(String),
    #[error("meta handler `{name}` failed: {source}")]
    Handler {
        name: String,
        #[source]
        source: Box<MetaError>,
    },
}

impl MetaError {
    fn in_handler(self, name: &str) -> Self {
        MetaError::Handler {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

/// Capture/replay of one piece of ambient state
pub trait MetaHandler: Send {
    /// Snapshot the state, or `None` when the observed subsystem was never engaged
    fn freeze(&self) -> Result<Option<Value>, MetaError>;

    /// Replay a value previously returned by [`freeze`](MetaHandler::freeze).
    ///
    /// Never called for an absent value. Must be idempotent.
    fn restore(&self, value: &Value) -> Result<(), MetaError> {
        let _ = value;
        Ok(())
    }
}

/// Ambient resources the host declares as present.
///
/// Only declared resources get a handler in [`MetaRegistry::from_capabilities`],
/// so an optional subsystem is never touched unless the host opted in.
#[derive(Clone)]
pub struct AmbientCapabilities {
    rng: Option<SharedRng<ChaCha8Rng>>,
    numeric_rng: Option<SharedRng<ChaCha20Rng>>,
}

impl Default for AmbientCapabilities {
    fn default() -> Self {
        Self {
            rng: Some(global_rng()),
            numeric_rng: None,
        }
    }
}

impl AmbientCapabilities {
    /// No RNG resources at all
    pub fn none() -> Self {
        Self {
            rng: None,
            numeric_rng: None,
        }
    }

    /// Govern `rng` instead of the process-wide generator
    pub fn with_rng(mut self, rng: SharedRng<ChaCha8Rng>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn with_numeric_rng(mut self, rng: SharedRng<ChaCha20Rng>) -> Self {
        self.numeric_rng = Some(rng);
        self
    }
}

/// Ordered mapping from handler name to handler
#[derive(Default)]
pub struct MetaRegistry {
    handlers: Vec<(String, Box<dyn MetaHandler>)>,
}

impl MetaRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The stock handlers for the declared capabilities
    pub fn from_capabilities(capabilities: &AmbientCapabilities) -> Self {
        let mut registry = Self::empty();
        if let Some(rng) = &capabilities.rng {
            registry.register(RNG_SEED, RngStateHandler::new(rng.clone()));
        }
        if let Some(rng) = &capabilities.numeric_rng {
            registry.register(NUMERIC_SEED, RngStateHandler::new(rng.clone()));
        }
        registry.register(RUNTIME_VERSION, RuntimeVersionHandler);
        registry.register(PROCESS_ARGV, ArgvHandler);
        registry
    }

    /// Add a handler, replacing (in place) any handler already registered under `name`
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl MetaHandler + 'static,
    ) -> &mut Self {
        let name = name.into();
        let handler: Box<dyn MetaHandler> = Box::new(handler);
        match self.handlers.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((name, handler)),
        }
        self
    }

    pub fn with(mut self, name: impl Into<String>, handler: impl MetaHandler + 'static) -> Self {
        self.register(name, handler);
        self
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| existing != name);
        self.handlers.len() != before
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Freeze every handler. Absent values are recorded as `null`.
    pub fn freeze_all(&self) -> Result<BTreeMap<String, Value>, MetaError> {
        self.handlers
            .iter()
            .map(|(name, handler)| -> Result<(String, Value), MetaError> {
                let value = handler.freeze().map_err(|e| e.in_handler(name))?;
                Ok((name.clone(), value.unwrap_or(Value::Null)))
            })
            .collect()
    }

    /// Restore every handler from a frozen map.
    ///
    /// Names that are missing from `meta` or frozen as `null` are skipped.
    pub fn restore_all(&self, meta: &BTreeMap<String, Value>) -> Result<(), MetaError> {
        for (name, handler) in &self.handlers {
            match meta.get(name) {
                Some(Value::Null) => {}
                Some(value) => handler.restore(value).map_err(|e| e.in_handler(name))?,
                None => {
                    tracing::debug!(handler = %name, "Checkpoint has no state for meta handler");
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for MetaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
