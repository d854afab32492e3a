//! Fuzz target for [`FrameCodec`]
//!
//! The length header comes from the registry and sizes an allocation.
//!
//! # Strategy
//!
//! - Arbitrary byte streams decoded under a fuzzed payload limit
//! - The same bytes read through the blocking `read_from` path
//!
//! # Invariants
//!
//! - NEVER panic, NEVER allocate beyond the limit
//! - A decoded frame consumes header plus payload, never more than given
//! - Re-encoding a decoded payload reproduces the consumed bytes
//! - `decode` and `read_from` agree on success and payload

#![no_main]

use arbitrary::Arbitrary;
use bytes::BytesMut;
use epp_proto::{FrameCodec, HEADER_SIZE};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    max_payload: u16,
    stream: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let codec = FrameCodec::with_max_payload(usize::from(input.max_payload));
    let decoded = codec.decode(&input.stream);

    if let Ok((payload, consumed)) = &decoded {
        assert_eq!(*consumed, HEADER_SIZE + payload.len());
        assert!(*consumed <= input.stream.len());
        assert!(payload.len() <= codec.max_payload());

        let mut wire = BytesMut::new();
        codec.encode(payload, &mut wire).unwrap_or_else(|e| panic!("re-encode failed: {e}"));
        assert_eq!(&wire[..], &input.stream[..*consumed]);
    }

    let read = codec.read_from(&mut input.stream.as_slice());
    match (&decoded, &read) {
        (Ok((a, _)), Ok(b)) => assert_eq!(a, b),
        (Err(_), Err(_)) => {},
        _ => panic!("decode and read_from disagree: {decoded:?} vs {read:?}"),
    }
});
