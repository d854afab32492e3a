//! Errors surfaced by the `epp` binary.

use std::path::PathBuf;

use epp_core::EppError;
use thiserror::Error;

/// Failures the CLI reports before exiting non-zero.
#[derive(Debug, Error)]
pub enum CliError {
    /// File could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// File content did not deserialize.
    #[error("invalid {path}: {reason}")]
    Format {
        /// File that failed.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Configuration, session or registry failure.
    #[error(transparent)]
    Epp(#[from] EppError),

    /// Result could not be written to stdout.
    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),

    /// Result could not be rendered as JSON.
    #[error("cannot render output: {0}")]
    Render(#[from] serde_json::Error),
}
