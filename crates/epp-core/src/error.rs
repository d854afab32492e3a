//! Session error types.

use epp_proto::{FrameError, ParseError};
use thiserror::Error;

/// Errors from session and registry operations.
///
/// Every failure a caller can see maps to exactly one variant, and the
/// `Display` text is the single message string shown to the end user.
#[derive(Debug, Error)]
pub enum EppError {
    /// Socket, TLS or framing failure. The session is unusable afterwards.
    #[error("connection error: {0}")]
    Connection(#[from] FrameError),

    /// The registry answered with at least one result code >= 2000.
    ///
    /// Displays as the registry's own messages joined with `"; "`.
    #[error("{message}")]
    Protocol {
        /// Operation that failed.
        label: String,
        /// Every failing result code, in document order.
        codes: Vec<u16>,
        /// Failing messages joined with `"; "`.
        message: String,
    },

    /// The registry's reply could not be interpreted as an EPP document.
    #[error("{label}: {source}")]
    Parse {
        /// Operation whose response was malformed.
        label: String,
        /// Underlying parse failure.
        source: ParseError,
    },

    /// Caller-supplied data failed a local precondition. Nothing was sent.
    #[error("{reason}")]
    Validation {
        /// What was wrong.
        reason: String,
    },

    /// A command other than login was attempted before login succeeded.
    #[error("not authenticated: login must succeed before any command")]
    NotAuthenticated,

    /// The session was closed, or poisoned by an earlier connection error.
    #[error("session closed")]
    SessionClosed,

    /// The registry sent a value the client refuses to guess at.
    #[error("{reason}")]
    Interpretation {
        /// What could not be interpreted.
        reason: String,
    },

    /// Endpoint configuration is invalid or its files cannot be loaded.
    #[error("configuration error: {reason}")]
    Config {
        /// What was wrong.
        reason: String,
    },
}

impl EppError {
    /// Returns true if the session that produced this error must be dropped.
    pub fn is_fatal(&self) -> bool {
        match self {
            // Stream state unknown: a partial frame may be in flight
            Self::Connection(_) | Self::SessionClosed | Self::Parse { .. } => true,

            Self::Protocol { .. }
            | Self::Validation { .. }
            | Self::NotAuthenticated
            | Self::Interpretation { .. }
            | Self::Config { .. } => false,
        }
    }

    /// Shorthand for [`EppError::Validation`].
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }

    /// Shorthand for [`EppError::Interpretation`].
    pub fn interpretation(reason: impl Into<String>) -> Self {
        Self::Interpretation { reason: reason.into() }
    }

    /// Shorthand for [`EppError::Config`].
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }

    /// Attach an operation label to a parse failure.
    pub fn parse(label: impl Into<String>, source: ParseError) -> Self {
        Self::Parse { label: label.into(), source }
    }
}
