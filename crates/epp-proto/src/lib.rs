//! EPP protocol layer
//!
//! Pure building blocks for the Extensible Provisioning Protocol
//! (RFC 5730-5734). Nothing in this crate opens a socket: it turns typed
//! commands into XML documents, XML documents into typed responses, and
//! payloads into length-prefixed frames over any `Read`/`Write` pair.
//!
//! # Components
//!
//! - [`FrameCodec`]: 4-byte big-endian, header-inclusive length framing
//! - [`Command`]: typed command set with a structured XML builder
//! - [`Response`]: result codes plus a typed [`ResData`] payload
//! - [`Greeting`]: the server hello sent on connect
//!
//! # Escaping
//!
//! Every caller-supplied value passes through [`xml::Element`], which
//! escapes text and attribute content on serialization. Callers never
//! splice raw XML into a command.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
pub mod date;
pub mod error;
pub mod frame;
pub mod ns;
pub mod response;
pub mod types;
pub mod xml;

pub use command::{
    ClTrid, Command, ContactChange, ContactCreate, ContactExtension, ContactUpdate, DomainChange,
    DomainCreate, DomainRenew, DomainTransfer, DomainUpdate, HostCreate, HostUpdate, Login,
    Services, UpdateBlock,
};
pub use date::EppDate;
pub use error::{FrameError, ParseError};
pub use frame::{DEFAULT_MAX_FRAME, FrameCodec, HEADER_SIZE};
pub use response::{
    CheckItem, ContactCreated, ContactInfo, DomainCreated, DomainInfo, DomainRenewed, EppResult,
    Greeting, HostCreated, HostInfo, ResData, Response, TransferData,
};
pub use types::{
    ContactRole, DomainContact, DomainStatus, PostalInfo, TransferOp, TransferStatus,
};
