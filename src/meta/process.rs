//! Capture-only handlers describing the running process

use serde_json::{json, Value};

use super::{MetaError, MetaHandler};

/// Records the crate version and target the process was built for
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeVersionHandler;

impl RuntimeVersionHandler {
    pub fn version_string() -> String {
        format!(
            "{} {} ({}-{})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            std::env::consts::ARCH,
            std::env::consts::OS,
        )
    }
}

impl MetaHandler for RuntimeVersionHandler {
    fn freeze(&self) -> Result<Option<Value>, MetaError> {
        Ok(Some(Value::String(Self::version_string())))
    }
}

/// Records the process invocation arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgvHandler;

impl MetaHandler for ArgvHandler {
    fn freeze(&self) -> Result<Option<Value>, MetaError> {
        let args: Vec<String> = std::env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        Ok(Some(json!(args)))
    }
}
