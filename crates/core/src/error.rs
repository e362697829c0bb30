//! Downwash sampler errors

use std::path::PathBuf;

use thiserror::Error;

/// Sampler result type
pub type Result<T> = std::result::Result<T, DownwashError>;

/// Errors raised while loading grid data or sampling forces
#[derive(Debug, Error)]
pub enum DownwashError {
    /// Static data-integrity fault detected while building fields or the sampler.
    #[error("configuration error: {0}")]
    Config(String),

    /// The payload does not belong to the recognized set of geometry variants.
    #[error("unsupported payload geometry: {0}")]
    UnsupportedPayload(String),

    /// A payload surface returned inconsistent patch data.
    #[error("malformed patch batch for {surface}: {reason}")]
    MalformedPatches { surface: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: not a number: {token:?}")]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },
}

impl DownwashError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
