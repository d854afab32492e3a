//! Deterministic test harness for EPP sessions and registrar flows.
//!
//! A seeded [`SimEnv`], an in-memory [`MockRegistry`] and a
//! [`LoopbackConnector`] that joins the two through the real frame codec.
//! Flow tests run end to end without a network and can be replayed
//! exactly from a seed.
//!
//! # Model-Based Testing
//!
//! The registry is the oracle: after a flow runs, its stored domains,
//! contacts and hosts and its command log show what the client did.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod loopback;
pub mod mock_registry;
pub mod recording;
pub mod sim_env;

pub use loopback::{LoopbackConnector, LoopbackTransport};
pub use mock_registry::{MockContact, MockDomain, MockHost, MockRegistry, code};
pub use recording::{RecordedExchange, RecordingAudit};
pub use sim_env::SimEnv;
