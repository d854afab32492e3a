//! Structured results of registrar flows.
//!
//! Dates are rendered `YYYY-MM-DD`, the form hosting panels store.

use std::collections::BTreeMap;

use epp_proto::{DomainStatus, EppDate, TransferStatus};
use serde::Serialize;

use crate::request::{ContactDetails, RoleLabel};

/// Domain created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registered {
    /// Domain name as acknowledged by the registry.
    pub domain: String,
    /// Created registrant contact id.
    pub registrant: String,
    /// Created administrative contact id, organisations only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<String>,
    /// Expiry date, when the registry reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

/// Domain renewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Renewed {
    /// Domain name.
    pub domain: String,
    /// New expiry date, when the registry reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

/// Transfer request accepted by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRequested {
    /// Domain name.
    pub domain: String,
    /// Transfer status right after the request, normally `pending`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Adds and removes sent by an update flow. Both empty means no update
/// command was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Changes<T> {
    /// Values added.
    pub added: Vec<T>,
    /// Values removed.
    pub removed: Vec<T>,
}

impl<T> Changes<T> {
    /// True when nothing was sent.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Nameserver delegation changes.
pub type NameserverChanges = Changes<String>;

/// Status flag changes, by wire name.
pub type StatusChanges = Changes<String>;

impl StatusChanges {
    pub(crate) fn from_statuses(added: &[DomainStatus], removed: &[DomainStatus]) -> Self {
        let names = |list: &[DomainStatus]| list.iter().map(|s| s.as_str().to_string()).collect();
        Self { added: names(added), removed: names(removed) }
    }
}

/// Contacts of a domain by role. A contact referenced in several roles
/// appears under each of them.
pub type DomainContacts = BTreeMap<RoleLabel, ContactDetails>;

/// Progress of a pending transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransferProgress {
    /// Registry has not acted yet.
    Pending,
    /// Approved by the losing registrar or the registry.
    Completed {
        /// Expiry date after transfer, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        expiry_date: Option<String>,
    },
    /// Rejected or cancelled.
    Failed {
        /// Final transfer status, by wire name.
        reason: String,
    },
}

impl TransferProgress {
    /// Map a registry transfer status. `expires` is only kept on approval.
    pub fn from_status(status: TransferStatus, expires: Option<&EppDate>) -> Self {
        match status {
            TransferStatus::Pending => Self::Pending,
            TransferStatus::ClientApproved | TransferStatus::ServerApproved => {
                Self::Completed { expiry_date: day(expires) }
            },
            TransferStatus::ClientRejected | TransferStatus::ClientCancelled | TransferStatus::ServerCancelled => {
                Self::Failed { reason: status.as_str().to_string() }
            },
        }
    }

    /// True once the domain is ours.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// True once the transfer can no longer complete.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Expiry date of a completed transfer.
    pub fn expiry_date(&self) -> Option<&str> {
        match self {
            Self::Completed { expiry_date } => expiry_date.as_deref(),
            _ => None,
        }
    }
}

/// Whether a registration has lapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryState {
    /// Expiry in the future.
    Active,
    /// Expiry in the past.
    Expired,
}

/// Result of the expiry synchronization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Registry expiry date.
    pub expiry_date: String,
    /// Active or expired relative to the clock.
    pub state: ExpiryState,
}

pub(crate) fn day(date: Option<&EppDate>) -> Option<String> {
    date.map(EppDate::date_string)
}
