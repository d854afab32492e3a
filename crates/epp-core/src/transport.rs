//! Framed Transport abstraction.
//!
//! A transport moves whole EPP payloads and knows nothing about XML. The
//! [`Connector`] half opens one; the session owns it exclusively from then
//! on.

use std::io::{Read, Write};

use bytes::Bytes;
use epp_proto::{FrameCodec, FrameError};

use crate::{config::EndpointConfig, error::EppError};

/// One live, framed connection to a registry.
///
/// # Invariants
///
/// - `send` writes exactly one frame and flushes before returning
/// - `receive` blocks until one complete frame is read or the stream fails
/// - After any error the transport must not be used again
pub trait Transport: Send {
    /// Send one payload.
    fn send(&mut self, payload: &[u8]) -> Result<(), FrameError>;

    /// Receive one payload.
    fn receive(&mut self) -> Result<Bytes, FrameError>;

    /// Release the connection. Errors are reported, never retried.
    fn close(&mut self) -> Result<(), FrameError>;
}

/// Opens transports for an endpoint.
pub trait Connector {
    /// Transport produced by this connector.
    type Transport: Transport;

    /// Establish a connection. TLS (if any) is fully negotiated on return.
    fn connect(&self, config: &EndpointConfig) -> Result<Self::Transport, EppError>;
}

/// Length-prefixed framing over any byte stream.
#[derive(Debug)]
pub struct FramedStream<S> {
    stream: S,
    codec: FrameCodec,
}

impl<S: Read + Write> FramedStream<S> {
    /// Wrap `stream` with the default 16 MiB payload limit.
    pub fn new(stream: S) -> Self {
        Self { stream, codec: FrameCodec::default() }
    }

    /// Wrap `stream` with a custom codec.
    pub fn with_codec(stream: S, codec: FrameCodec) -> Self {
        Self { stream, codec }
    }

    /// Underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Unwrap the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write + Send> Transport for FramedStream<S> {
    fn send(&mut self, payload: &[u8]) -> Result<(), FrameError> {
        self.codec.write_to(&mut self.stream, payload)
    }

    fn receive(&mut self) -> Result<Bytes, FrameError> {
        self.codec.read_from(&mut self.stream)
    }

    fn close(&mut self) -> Result<(), FrameError> {
        self.stream.flush()?;
        Ok(())
    }
}
