//! In-process transport to a [`MockRegistry`].
//!
//! Every payload crosses the real [`FrameCodec`] in both directions, so a
//! flow test also exercises framing. Nothing touches a socket.

use bytes::{Buf, Bytes, BytesMut};
use epp_core::{Connector, EndpointConfig, EppError, Transport};
use epp_proto::{FrameCodec, FrameError};

use crate::mock_registry::MockRegistry;

/// Opens [`LoopbackTransport`]s to one registry.
#[derive(Debug, Clone)]
pub struct LoopbackConnector {
    registry: MockRegistry,
    refuse: bool,
}

impl LoopbackConnector {
    /// Connector for `registry`.
    pub fn new(registry: MockRegistry) -> Self {
        Self { registry, refuse: false }
    }

    /// Connector whose every attempt fails as an unreachable host would.
    pub fn unreachable(registry: MockRegistry) -> Self {
        Self { registry, refuse: true }
    }
}

impl Connector for LoopbackConnector {
    type Transport = LoopbackTransport;

    fn connect(&self, config: &EndpointConfig) -> Result<LoopbackTransport, EppError> {
        if self.refuse {
            let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
            return Err(EppError::Connection(FrameError::Io(refused)));
        }

        let codec = FrameCodec::with_max_payload(config.max_frame);
        let mut inbound = BytesMut::new();
        codec.encode(&self.registry.accept(), &mut inbound)?;
        Ok(LoopbackTransport { registry: self.registry.clone(), codec, inbound, open: true, severed: false })
    }
}

/// One connection to a [`MockRegistry`].
#[derive(Debug)]
pub struct LoopbackTransport {
    registry: MockRegistry,
    codec: FrameCodec,
    inbound: BytesMut,
    open: bool,
    severed: bool,
}

impl LoopbackTransport {
    fn closed() -> FrameError {
        FrameError::ConnectionClosed { received: 0, expected: epp_proto::HEADER_SIZE }
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, payload: &[u8]) -> Result<(), FrameError> {
        if !self.open || self.severed {
            return Err(Self::closed());
        }

        let mut wire = BytesMut::new();
        self.codec.encode(payload, &mut wire)?;
        let (request, _) = self.codec.decode(&wire)?;

        match self.registry.handle(&request) {
            Some(reply) => self.codec.encode(&reply, &mut self.inbound),
            None => {
                self.severed = true;
                Ok(())
            },
        }
    }

    fn receive(&mut self) -> Result<Bytes, FrameError> {
        let (payload, consumed) = self.codec.decode(&self.inbound)?;
        self.inbound.advance(consumed);
        Ok(payload)
    }

    fn close(&mut self) -> Result<(), FrameError> {
        if self.open {
            self.open = false;
            self.registry.release();
        }
        Ok(())
    }
}
