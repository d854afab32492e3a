//! Protocol error types.

use thiserror::Error;

/// Errors from the length-prefixed framing layer.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Stream ended before a complete header or payload arrived.
    ///
    /// Fatal to the session. A short header is never retried.
    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed {
        /// Bytes read before the stream ended.
        received: usize,
        /// Bytes the frame required.
        expected: usize,
    },

    /// Header announced a total length smaller than the header itself.
    #[error("invalid frame length {length}: shorter than the 4-byte header")]
    InvalidLength {
        /// Total length carried in the header.
        length: u32,
    },

    /// Payload exceeds the configured limit (or cannot be expressed in u32).
    #[error("frame payload of {length} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge {
        /// Payload length.
        length: usize,
        /// Configured maximum payload length.
        limit: usize,
    },

    /// Underlying stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from interpreting an XML document returned by the registry.
///
/// Distinct from a registry-reported failure: a `ParseError` means the
/// document itself could not be understood.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Payload is not well-formed XML (or not UTF-8).
    #[error("malformed XML: {reason}")]
    Xml {
        /// Parser diagnostic.
        reason: String,
    },

    /// Document is well-formed but is not an `<epp><response>`.
    #[error("document is not an EPP {expected}")]
    UnexpectedDocument {
        /// Root content that was expected (`response` or `greeting`).
        expected: &'static str,
    },

    /// Required child element is absent.
    #[error("missing element <{element}> in <{parent}>")]
    MissingElement {
        /// Element that was searched.
        parent: String,
        /// Local name of the missing child.
        element: &'static str,
    },

    /// Required attribute is absent.
    #[error("missing attribute {attribute} on <{element}>")]
    MissingAttribute {
        /// Element that was searched.
        element: String,
        /// Missing attribute name.
        attribute: &'static str,
    },

    /// Field is present but its value is outside the accepted set.
    #[error("invalid value {value:?} for {field}")]
    InvalidValue {
        /// Field being decoded.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// Response carries no payload of the requested shape.
    #[error("response carries no {expected} payload")]
    UnexpectedPayload {
        /// Payload shape the caller asked for.
        expected: &'static str,
    },
}

impl ParseError {
    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml { reason: err.to_string() }
    }
}
