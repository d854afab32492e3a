//! EPP runtime layer
//!
//! Sessions, transports and the collaborators a session needs. Protocol
//! encoding lives in `epp-proto`; this crate moves bytes and enforces the
//! session rules around them.
//!
//! # Components
//!
//! - [`Session`]: login-before-command, strict request/response, idempotent logout
//! - [`TlsConnector`]: rustls client with optional relaxed peer verification
//! - [`FramedStream`]: EPP framing over any `Read + Write`
//! - [`Environment`]: clock and randomness, swappable for deterministic tests
//! - [`AuditSink`]: caller-owned receiver of sanitized exchanges

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod audit;
pub mod config;
pub mod env;
pub mod error;
pub mod session;
pub mod system_env;
pub mod tls;
pub mod transport;

pub use audit::{AuditRecord, AuditSink, NoopAudit, TracingAudit};
pub use config::{
    ContactPolicy, Credential, DEFAULT_CONTACT_SENTINEL, EndpointConfig, RoleFallback, ServiceUris,
    TlsOptions, TlsVersion,
};
pub use env::Environment;
pub use error::EppError;
pub use session::{Session, SessionState};
pub use system_env::SystemEnv;
pub use tls::{AcceptAnyCertificate, TlsConnector, TlsTransport};
pub use transport::{Connector, FramedStream, Transport};
