//! EPP operation set
//!
//! Lifecycle commands for the three EPP object families and the registrar
//! flows a hosting application calls. Every flow follows the same shape:
//! build a command, send it through the session, interpret the structured
//! result, apply the business rule.
//!
//! # Components
//!
//! - [`Registrar`]: one method per flow, each with its own scoped session
//! - [`domain`], [`contact`], [`host`]: single commands over a [`Session`](epp_core::Session)
//! - [`reconcile`]: nameserver and registrar-lock diffing
//! - [`StatusStore`]: receiver of domain status snapshots

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod contact;
pub mod credentials;
pub mod domain;
mod exec;
pub mod host;
pub mod outcome;
pub mod reconcile;
mod registrar;
pub mod request;
pub mod status_store;

pub use outcome::{
    Changes, DomainContacts, ExpiryState, NameserverChanges, Registered, Renewed, StatusChanges, SyncReport,
    TransferProgress, TransferRequested,
};
pub use reconcile::{LockState, NameserverDiff, StatusDiff, lock_diff, reconcile_nameservers};
pub use registrar::Registrar;
pub use request::{ContactDetails, Registrant, RegistrationRequest, RoleLabel};
pub use status_store::{MemoryStatusStore, NoopStatusStore, StatusStore};
