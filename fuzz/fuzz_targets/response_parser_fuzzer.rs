//! Fuzz target for the response and greeting parsers
//!
//! Registry replies are untrusted input read straight off the wire.
//!
//! # Strategy
//!
//! - Raw bytes: arbitrary input, mostly rejected by the XML reader
//! - Templated documents: a well-formed `<epp><response>` envelope around
//!   fuzzed result codes, messages and resData bodies, so the payload
//!   dispatch and typed extraction are reached
//!
//! # Invariants
//!
//! - NEVER panic, whatever the input
//! - A parsed response has at least one result
//! - Every parsed result code lies in 1000..=2599
//! - `is_success` agrees with the individual codes

#![no_main]

use arbitrary::Arbitrary;
use epp_proto::{Greeting, Response};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Input {
    Raw(Vec<u8>),
    Templated { codes: Vec<u16>, message: String, res_data: String },
}

const ENVELOPE_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8"?><epp xmlns="urn:ietf:params:xml:ns:epp-1.0" xmlns:domain="urn:ietf:params:xml:ns:domain-1.0" xmlns:contact="urn:ietf:params:xml:ns:contact-1.0" xmlns:host="urn:ietf:params:xml:ns:host-1.0"><response>"#;

fn templated(codes: &[u16], message: &str, res_data: &str) -> Vec<u8> {
    let mut doc = String::from(ENVELOPE_OPEN);
    for code in codes.iter().take(8) {
        doc.push_str(&format!(r#"<result code="{code}"><msg>{message}</msg></result>"#));
    }
    doc.push_str(&format!("<resData>{res_data}</resData>"));
    doc.push_str("<trID><clTRID>FUZZ-1</clTRID><svTRID>SV-1</svTRID></trID></response></epp>");
    doc.into_bytes()
}

fuzz_target!(|input: Input| {
    let bytes = match input {
        Input::Raw(bytes) => bytes,
        Input::Templated { codes, message, res_data } => templated(&codes, &message, &res_data),
    };

    if let Ok(response) = Response::parse(&bytes) {
        assert!(!response.results.is_empty(), "parsed response without results");
        for result in &response.results {
            assert!((1000..=2599).contains(&result.code), "code out of range: {}", result.code);
        }
        let all_ok = response.results.iter().all(|r| r.code < 2000);
        assert_eq!(response.is_success(), all_ok, "success disagrees with codes");
    }

    let _ = Greeting::parse(&bytes);
});
