//! Error types for trace simulation.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationError;

/// Result alias used across the crate.
pub type SimResult<T> = Result<T, SimError>;

/// Errors that abort a simulation run.
///
/// A run is never resumed after any of these; callers must discard
/// partially built logs.
#[derive(Debug, Error)]
pub enum SimError {
    /// A trace record is missing a field, malformed, or out of order.
    #[error("input validation failed: {0}")]
    InputValidation(#[from] ValidationError),

    /// Workload parameters are missing or invalid.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The simulator reached a state its own bookkeeping rules out.
    #[error("internal invariant violated: {message}")]
    InternalInvariant { message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariant {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
