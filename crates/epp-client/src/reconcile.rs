//! Diffing of registry state against a requested target.
//!
//! Both composite update flows read the current object, compute the
//! smallest add/remove pair that reaches the target and send nothing when
//! the pair is empty. The functions here are pure so the diffing rules can
//! be tested without a registry.

use epp_proto::DomainStatus;
use serde::Serialize;

/// Statuses toggled together by the registrar lock.
pub const LOCK_STATUSES: [DomainStatus; 2] =
    [DomainStatus::ClientDeleteProhibited, DomainStatus::ClientTransferProhibited];

/// Nameservers to add and remove, in request and registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameserverDiff {
    /// Requested but not currently delegated.
    pub add: Vec<String>,
    /// Currently delegated but not requested.
    pub rem: Vec<String>,
}

impl NameserverDiff {
    /// True when the registry already matches the request.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.rem.is_empty()
    }
}

/// Reconcile the current delegation with the requested one.
///
/// Host names compare case-insensitively. Blank entries and repeats in
/// `requested` are ignored.
pub fn reconcile_nameservers(current: &[String], requested: &[String]) -> NameserverDiff {
    let mut wanted: Vec<&str> = Vec::with_capacity(requested.len());
    for name in requested.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !wanted.iter().any(|w| w.eq_ignore_ascii_case(name)) {
            wanted.push(name);
        }
    }

    let add = wanted
        .iter()
        .filter(|name| !current.iter().any(|c| c.eq_ignore_ascii_case(name)))
        .map(|name| (*name).to_string())
        .collect();

    let rem = current
        .iter()
        .filter(|c| !c.trim().is_empty())
        .filter(|c| !wanted.iter().any(|w| w.eq_ignore_ascii_case(c)))
        .cloned()
        .collect();

    NameserverDiff { add, rem }
}

/// Registrar lock as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    /// Transfer (and normally delete) prohibited by the registrar.
    Locked,
    /// No client transfer prohibition.
    Unlocked,
}

impl LockState {
    /// Locked exactly when `clientTransferProhibited` is present.
    pub fn from_statuses(statuses: &[DomainStatus]) -> Self {
        if statuses.contains(&DomainStatus::ClientTransferProhibited) { Self::Locked } else { Self::Unlocked }
    }
}

/// Statuses to add and remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusDiff {
    /// Statuses to set.
    pub add: Vec<DomainStatus>,
    /// Statuses to clear.
    pub rem: Vec<DomainStatus>,
}

impl StatusDiff {
    /// True when the domain is already at the target.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.rem.is_empty()
    }
}

/// Statuses needed to move the lock pair from `current` to `target`.
///
/// Statuses outside [`LOCK_STATUSES`] are never touched.
pub fn lock_diff(current: &[DomainStatus], target: LockState) -> StatusDiff {
    let mut diff = StatusDiff::default();
    for status in LOCK_STATUSES {
        let present = current.contains(&status);
        match target {
            LockState::Locked if !present => diff.add.push(status),
            LockState::Unlocked if present => diff.rem.push(status),
            _ => {},
        }
    }
    diff
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn nameserver_swap() {
        let diff = reconcile_nameservers(
            &names(&["ns1.example.com", "ns2.example.com"]),
            &names(&["ns2.example.com", "ns3.example.com"]),
        );
        assert_eq!(diff.add, names(&["ns3.example.com"]));
        assert_eq!(diff.rem, names(&["ns1.example.com"]));
    }

    #[test]
    fn unchanged_delegation_is_empty() {
        let current = names(&["ns1.example.com", "ns2.example.com"]);
        assert!(reconcile_nameservers(&current, &names(&["NS2.example.com", "ns1.EXAMPLE.com"])).is_empty());
    }

    #[test]
    fn blank_and_repeated_requests_ignored() {
        let diff = reconcile_nameservers(&[], &names(&["ns1.example.com", "", "  ", "NS1.example.com"]));
        assert_eq!(diff.add, names(&["ns1.example.com"]));
        assert!(diff.rem.is_empty());
    }

    #[test]
    fn lock_from_ok() {
        let diff = lock_diff(&[DomainStatus::Ok], LockState::Locked);
        assert_eq!(diff.add, LOCK_STATUSES.to_vec());
        assert!(diff.rem.is_empty());
    }

    #[test]
    fn unlock_from_locked() {
        let diff = lock_diff(&LOCK_STATUSES, LockState::Unlocked);
        assert!(diff.add.is_empty());
        assert_eq!(diff.rem, LOCK_STATUSES.to_vec());
    }

    #[test]
    fn lock_already_at_target() {
        assert!(lock_diff(&LOCK_STATUSES, LockState::Locked).is_empty());
        assert!(lock_diff(&[DomainStatus::Ok], LockState::Unlocked).is_empty());
    }

    #[test]
    fn half_locked_gets_completed() {
        let diff = lock_diff(&[DomainStatus::ClientDeleteProhibited], LockState::Locked);
        assert_eq!(diff.add, vec![DomainStatus::ClientTransferProhibited]);
    }

    #[test]
    fn lock_state_reads_transfer_prohibition() {
        assert_eq!(LockState::from_statuses(&[DomainStatus::ClientTransferProhibited]), LockState::Locked);
        assert_eq!(LockState::from_statuses(&[DomainStatus::ClientDeleteProhibited]), LockState::Unlocked);
    }

    fn host_set() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("ns[0-9]\\.example\\.(com|lv)", 0..6)
    }

    proptest! {
        #[test]
        fn applying_diff_reaches_request(current in host_set(), requested in host_set()) {
            let diff = reconcile_nameservers(&current, &requested);

            let mut result: Vec<String> = current.iter().filter(|c| !diff.rem.contains(c)).cloned().collect();
            result.extend(diff.add.iter().cloned());
            result.sort();
            result.dedup();

            let mut expected = requested.clone();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(result, expected);
        }

        #[test]
        fn add_and_rem_disjoint(current in host_set(), requested in host_set()) {
            let diff = reconcile_nameservers(&current, &requested);
            for name in &diff.add {
                prop_assert!(!diff.rem.contains(name));
                prop_assert!(!current.contains(name));
            }
        }
    }
}
