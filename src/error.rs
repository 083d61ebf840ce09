//! Error types.
//!
//! Failures only surface while building the simulation (bad parameters, an
//! unreadable config file, a zero population request). Nothing in the
//! per-frame path returns errors: every step is all-or-nothing over finite
//! inputs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A parameter, or a requested population size, outside the usable range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
