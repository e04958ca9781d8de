//! Error types for pinwire operations.
//!
//! All layout errors are fatal to the current layout call: no partial
//! results are returned, and there is no retry logic anywhere in the
//! library. Layout is a pure function of its inputs, so the only recovery
//! path is fixing the input diagram and calling again.

use std::io;

use thiserror::Error;

/// The main error type for pinwire operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Connection {connection} references unknown endpoint: {endpoint}")]
    UnresolvedEndpoint { connection: usize, endpoint: String },

    #[error(
        "Device-to-device connections form a loop with no board anchor: {}",
        devices.join(", ")
    )]
    CycleDetected { devices: Vec<String> },

    /// Internal consistency guard: a device survived tier propagation
    /// without a tier assignment. Unreachable given correct tiering.
    #[error("Device '{device}' has no tier assignment")]
    InvalidTierPlacement { device: String },

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for Error {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}
