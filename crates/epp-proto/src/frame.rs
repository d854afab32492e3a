//! EPP over TCP framing (RFC 5734 §4).
//!
//! Every message is a 4-byte big-endian unsigned integer giving the total
//! length of the message (header included), followed by the XML payload.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ total: u32be │ payload (total - 4 bytes)    │
//! └──────────────┴──────────────────────────────┘
//! ```

use std::io::{ErrorKind, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameError;

/// Size of the length header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Default upper bound for an inbound payload (16 MiB).
pub const DEFAULT_MAX_FRAME: usize = 16 * 1024 * 1024;

/// Stateless encoder/decoder for EPP frames.
///
/// Holds only the inbound payload limit, which is checked before any
/// allocation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    max_payload: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self { max_payload: DEFAULT_MAX_FRAME }
    }
}

impl FrameCodec {
    /// Create a codec with a custom payload limit.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self { max_payload }
    }

    /// Payload limit enforced on decode.
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Append one framed message to `dst`.
    pub fn encode(&self, payload: &[u8], dst: &mut BytesMut) -> Result<(), FrameError> {
        let total = header_value(payload.len())?;
        dst.reserve(HEADER_SIZE + payload.len());
        dst.put_u32(total);
        dst.put_slice(payload);
        Ok(())
    }

    /// Decode one frame from the front of `src`.
    ///
    /// Returns the payload and the number of bytes consumed. A buffer that
    /// ends early yields `ConnectionClosed`, matching what a stream that
    /// closed at the same point would produce.
    pub fn decode(&self, src: &[u8]) -> Result<(Bytes, usize), FrameError> {
        let Some(header) = src.get(..HEADER_SIZE) else {
            return Err(FrameError::ConnectionClosed { received: src.len(), expected: HEADER_SIZE });
        };
        let payload_len = self.payload_len(header)?;
        let end = HEADER_SIZE + payload_len;

        let Some(payload) = src.get(HEADER_SIZE..end) else {
            return Err(FrameError::ConnectionClosed {
                received: src.len() - HEADER_SIZE,
                expected: payload_len,
            });
        };

        Ok((Bytes::copy_from_slice(payload), end))
    }

    /// Write one framed message and flush.
    pub fn write_to<W: Write>(&self, writer: &mut W, payload: &[u8]) -> Result<(), FrameError> {
        let total = header_value(payload.len())?;
        writer.write_all(&total.to_be_bytes())?;
        writer.write_all(payload)?;
        writer.flush()?;
        Ok(())
    }

    /// Read exactly one framed message, blocking until it is complete.
    pub fn read_from<R: Read>(&self, reader: &mut R) -> Result<Bytes, FrameError> {
        let mut header = [0u8; HEADER_SIZE];
        read_full(reader, &mut header)?;

        let payload_len = self.payload_len(&header)?;
        let mut payload = vec![0u8; payload_len];
        read_full(reader, &mut payload)?;

        Ok(Bytes::from(payload))
    }

    fn payload_len(&self, header: &[u8]) -> Result<usize, FrameError> {
        let mut raw = [0u8; HEADER_SIZE];
        raw.copy_from_slice(header);
        let total = u32::from_be_bytes(raw);

        let payload_len = (total as usize)
            .checked_sub(HEADER_SIZE)
            .ok_or(FrameError::InvalidLength { length: total })?;

        if payload_len > self.max_payload {
            return Err(FrameError::FrameTooLarge { length: payload_len, limit: self.max_payload });
        }

        Ok(payload_len)
    }
}

fn header_value(payload_len: usize) -> Result<u32, FrameError> {
    payload_len
        .checked_add(HEADER_SIZE)
        .and_then(|total| u32::try_from(total).ok())
        .ok_or(FrameError::FrameTooLarge { length: payload_len, limit: u32::MAX as usize })
}

/// Fill `buf` completely or report how far the stream got.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), FrameError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(FrameError::ConnectionClosed { received: filled, expected: buf.len() });
            },
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {},
            // rustls reports a peer that vanished without close_notify this way
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(FrameError::ConnectionClosed { received: filled, expected: buf.len() });
            },
            Err(e) => return Err(FrameError::Io(e)),
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn header_counts_itself() {
        let codec = FrameCodec::default();
        let mut buf = BytesMut::new();
        codec.encode(b"<epp/>", &mut buf).unwrap();

        assert_eq!(&buf[..4], &10u32.to_be_bytes());
        assert_eq!(&buf[4..], b"<epp/>");
    }

    #[test]
    fn short_header_is_connection_closed() {
        let codec = FrameCodec::default();
        let mut reader = Cursor::new(vec![0u8, 0]);

        let err = codec.read_from(&mut reader).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed { received: 2, expected: 4 }));
    }

    #[test]
    fn empty_stream_is_connection_closed() {
        let codec = FrameCodec::default();
        let mut reader = Cursor::new(Vec::new());

        let err = codec.read_from(&mut reader).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed { received: 0, expected: 4 }));
    }

    #[test]
    fn truncated_payload_is_connection_closed() {
        let codec = FrameCodec::default();
        let mut wire = 20u32.to_be_bytes().to_vec();
        wire.extend_from_slice(b"<epp>");
        let mut reader = Cursor::new(wire);

        let err = codec.read_from(&mut reader).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed { received: 5, expected: 16 }));
    }

    #[test]
    fn length_below_header_rejected() {
        let codec = FrameCodec::default();
        let mut reader = Cursor::new(3u32.to_be_bytes().to_vec());

        let err = codec.read_from(&mut reader).unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength { length: 3 }));
    }

    #[test]
    fn oversized_frame_rejected_before_allocation() {
        let codec = FrameCodec::with_max_payload(8);
        let mut reader = Cursor::new(u32::MAX.to_be_bytes().to_vec());

        let err = codec.read_from(&mut reader).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { limit: 8, .. }));
    }

    #[test]
    fn empty_payload_frame() {
        let codec = FrameCodec::default();
        let mut reader = Cursor::new(4u32.to_be_bytes().to_vec());

        let payload = codec.read_from(&mut reader).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn consecutive_frames_read_in_order() {
        let codec = FrameCodec::default();
        let mut wire = Vec::new();
        codec.write_to(&mut wire, b"first").unwrap();
        codec.write_to(&mut wire, b"second").unwrap();
        let mut reader = Cursor::new(wire);

        assert_eq!(codec.read_from(&mut reader).unwrap().as_ref(), b"first");
        assert_eq!(codec.read_from(&mut reader).unwrap().as_ref(), b"second");
    }

    proptest! {
        #[test]
        fn stream_round_trip(payload in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let codec = FrameCodec::default();
            let mut wire = Vec::new();
            codec.write_to(&mut wire, &payload).unwrap();

            let decoded = codec.read_from(&mut Cursor::new(wire)).unwrap();
            prop_assert_eq!(decoded.as_ref(), payload.as_slice());
        }

        #[test]
        fn buffer_decode_matches_stream_encode(payload in proptest::collection::vec(any::<u8>(), 0..1024)) {
            let codec = FrameCodec::default();
            let mut buf = BytesMut::new();
            codec.encode(&payload, &mut buf).unwrap();

            let (decoded, consumed) = codec.decode(&buf).unwrap();
            prop_assert_eq!(consumed, buf.len());
            prop_assert_eq!(decoded.as_ref(), payload.as_slice());
        }
    }
}
