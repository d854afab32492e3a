//! Status store collaborator.
//!
//! After a domain info query the registrar pushes the full status set for
//! the domain (replace, not merge). After a transfer query it pushes the
//! latest transfer status. Persisting either is the host application's
//! concern; [`MemoryStatusStore`] keeps them in process.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use epp_proto::DomainStatus;

/// Receiver of registry-side status snapshots.
pub trait StatusStore: Send + Sync {
    /// Replace every stored status of `domain`.
    fn replace_statuses(&self, domain: &str, statuses: &[DomainStatus]);

    /// Record the latest transfer status of `domain`, verbatim.
    fn record_transfer_status(&self, domain: &str, status: &str);
}

/// Store that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStatusStore;

impl StatusStore for NoopStatusStore {
    fn replace_statuses(&self, _domain: &str, _statuses: &[DomainStatus]) {}

    fn record_transfer_status(&self, _domain: &str, _status: &str) {}
}

#[derive(Debug, Clone, Default)]
struct DomainRecord {
    statuses: Vec<DomainStatus>,
    transfer_status: Option<String>,
}

/// In-memory store keyed by lower-cased domain name.
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    domains: RwLock<HashMap<String, DomainRecord>>,
}

impl MemoryStatusStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last status set pushed for `domain`.
    pub fn statuses(&self, domain: &str) -> Option<Vec<DomainStatus>> {
        let domains = self.domains.read().unwrap_or_else(PoisonError::into_inner);
        domains.get(&key(domain)).map(|r| r.statuses.clone())
    }

    /// Last transfer status pushed for `domain`.
    pub fn transfer_status(&self, domain: &str) -> Option<String> {
        let domains = self.domains.read().unwrap_or_else(PoisonError::into_inner);
        domains.get(&key(domain)).and_then(|r| r.transfer_status.clone())
    }

    /// True when the last status set contains `pendingDelete`.
    pub fn is_pending_delete(&self, domain: &str) -> bool {
        self.statuses(domain).is_some_and(|s| s.contains(&DomainStatus::PendingDelete))
    }
}

impl StatusStore for MemoryStatusStore {
    fn replace_statuses(&self, domain: &str, statuses: &[DomainStatus]) {
        let mut domains = self.domains.write().unwrap_or_else(PoisonError::into_inner);
        domains.entry(key(domain)).or_default().statuses = statuses.to_vec();
    }

    fn record_transfer_status(&self, domain: &str, status: &str) {
        let mut domains = self.domains.write().unwrap_or_else(PoisonError::into_inner);
        domains.entry(key(domain)).or_default().transfer_status = Some(status.to_string());
    }
}

fn key(domain: &str) -> String {
    domain.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_are_replaced_not_merged() {
        let store = MemoryStatusStore::new();
        store.replace_statuses("example.lv", &[DomainStatus::Ok, DomainStatus::ClientHold]);
        store.replace_statuses("EXAMPLE.lv", &[DomainStatus::PendingDelete]);

        assert_eq!(store.statuses("example.lv"), Some(vec![DomainStatus::PendingDelete]));
        assert!(store.is_pending_delete("example.lv"));
    }

    #[test]
    fn transfer_status_kept_alongside_statuses() {
        let store = MemoryStatusStore::new();
        store.replace_statuses("example.lv", &[DomainStatus::Ok]);
        store.record_transfer_status("example.lv", "pending");

        assert_eq!(store.transfer_status("example.lv").as_deref(), Some("pending"));
        assert_eq!(store.statuses("example.lv"), Some(vec![DomainStatus::Ok]));
    }

    #[test]
    fn unknown_domain() {
        let store = MemoryStatusStore::new();
        assert_eq!(store.statuses("nowhere.lv"), None);
        assert!(!store.is_pending_delete("nowhere.lv"));
    }
}
