//! Registrar flows.
//!
//! Each public method is one unit of work for the hosting application:
//! it opens a session, logs in, runs its command sequence and always logs
//! out and closes before returning, whether the work succeeded or not.
//! A failed logout is logged and never replaces the flow's own result.
//!
//! Every domain info a flow performs pushes the full status set of that
//! domain to the [`StatusStore`].

use std::{collections::BTreeMap, net::IpAddr, sync::Arc};

use epp_core::{AuditSink, Connector, EndpointConfig, Environment, EppError, Session, TracingAudit};
use epp_proto::{
    ContactRole, DomainContact, DomainCreate, DomainInfo, DomainTransfer, DomainUpdate, HostUpdate, Services,
    TransferOp, TransferStatus, UpdateBlock,
};
use tracing::{debug, info, info_span, warn};

use crate::{
    contact, credentials, domain, host,
    outcome::{
        DomainContacts, ExpiryState, NameserverChanges, Registered, Renewed, StatusChanges, SyncReport,
        TransferProgress, TransferRequested, day,
    },
    reconcile::{LockState, lock_diff, reconcile_nameservers},
    request::{ContactDetails, ProvisionedRole, RegistrationRequest, RoleLabel},
    status_store::{NoopStatusStore, StatusStore},
};

/// Reason used when a check reports a name unavailable without saying why.
const UNAVAILABLE: &str = "Domain is not available";

/// Entry point for the hosting application.
pub struct Registrar<C: Connector, E: Environment> {
    connector: C,
    config: EndpointConfig,
    env: E,
    audit: Arc<dyn AuditSink>,
    store: Arc<dyn StatusStore>,
}

impl<C: Connector, E: Environment> Registrar<C, E> {
    /// Registrar auditing through `tracing` and discarding status updates.
    pub fn new(connector: C, config: EndpointConfig, env: E) -> Self {
        Self { connector, config, env, audit: Arc::new(TracingAudit), store: Arc::new(NoopStatusStore) }
    }

    /// Replace the audit sink.
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replace the status store.
    pub fn with_status_store(mut self, store: Arc<dyn StatusStore>) -> Self {
        self.store = store;
        self
    }

    /// Endpoint this registrar talks to.
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Run `work` inside a fresh authenticated session.
    ///
    /// The session is logged out and closed on every path.
    pub fn with_session<R>(
        &self,
        flow: &str,
        work: impl FnOnce(&mut Session<C::Transport, E>) -> Result<R, EppError>,
    ) -> Result<R, EppError> {
        let span = info_span!("flow", flow);
        let _guard = span.enter();

        let mut session = Session::connect(&self.connector, &self.config, self.env.clone(), Arc::clone(&self.audit))?;
        let services = Services::from(&self.config.services);
        let result = session.login(&self.config.credential, &services).and_then(|()| work(&mut session));

        if let Err(e) = &result {
            warn!(error = %e, "flow failed");
        }
        session.close();
        result
    }

    /// Availability-gated registration with contact provisioning.
    ///
    /// An unavailable name fails with the registry's reason before any
    /// contact is created.
    pub fn register_domain(&self, request: &RegistrationRequest) -> Result<Registered, EppError> {
        let name = required("domain name", &request.domain)?;
        if request.period == 0 {
            return Err(EppError::validation("registration period must be at least one year"));
        }

        self.with_session("register_domain", |s| {
            let item = domain::check_one(s, name)?;
            if !item.available {
                let reason = item.reason.as_deref().filter(|r| !r.is_empty()).unwrap_or(UNAVAILABLE);
                return Err(EppError::validation(format!("{} {reason}", item.name)));
            }

            let holder = &request.registrant;
            let registrant = self.provision_contact(s, ProvisionedRole::Registrant, request)?;
            let admin = if holder.is_organisation() {
                Some(self.provision_contact(s, ProvisionedRole::Admin, request)?)
            } else {
                None
            };

            let admin_id = admin.as_deref().unwrap_or(registrant.as_str());
            let mut contacts = vec![DomainContact::new(ContactRole::Admin, admin_id)];
            let policy = &self.config.contacts;
            let tech = request.tech_contact.as_deref().or_else(|| policy.tech.contact_id());
            let billing = request.billing_contact.as_deref().or_else(|| policy.billing.contact_id());
            contacts.extend(tech.map(|id| DomainContact::new(ContactRole::Tech, id)));
            contacts.extend(billing.map(|id| DomainContact::new(ContactRole::Billing, id)));

            let created = domain::create(
                s,
                DomainCreate {
                    name: name.to_string(),
                    period: request.period,
                    nameservers: reconcile_nameservers(&[], &request.nameservers).add,
                    registrant: registrant.clone(),
                    contacts,
                    auth_info: credentials::auth_info(&self.env),
                },
            )?;
            info!(domain = %created.name, %registrant, "domain registered");

            Ok(Registered {
                domain: created.name,
                registrant,
                admin,
                expiry_date: day(created.expires.as_ref()),
            })
        })
    }

    fn provision_contact(
        &self,
        session: &mut Session<C::Transport, E>,
        role: ProvisionedRole,
        request: &RegistrationRequest,
    ) -> Result<String, EppError> {
        let create = request.registrant.contact_create(
            role,
            credentials::contact_id(&self.env),
            credentials::auth_info(&self.env),
        );
        let created = contact::create(session, create)?;
        debug!(id = %created.id, ?role, "contact created");
        Ok(created.id)
    }

    /// Renew from the registry's current expiry date.
    pub fn renew_domain(&self, name: &str, period: u8) -> Result<Renewed, EppError> {
        let name = required("domain name", name)?;
        if period == 0 {
            return Err(EppError::validation("renewal period must be at least one year"));
        }

        self.with_session("renew_domain", |s| {
            let current = self.domain_info(s, name)?;
            let expires = current
                .expires
                .ok_or_else(|| EppError::interpretation(format!("no expiry date for domain: {name}")))?;

            let renewed = domain::renew(s, name, expires.date(), period)?;
            info!(domain = %name, period, "domain renewed");
            Ok(Renewed { domain: name.to_string(), expiry_date: day(renewed.expires.as_ref()) })
        })
    }

    /// Request an incoming transfer.
    pub fn transfer_domain(
        &self,
        name: &str,
        auth_info: &str,
        period: Option<u8>,
    ) -> Result<TransferRequested, EppError> {
        let name = required("domain name", name)?;
        let auth_info = required("transfer secret", auth_info)?;

        self.with_session("transfer_domain", |s| {
            let data = domain::transfer(
                s,
                DomainTransfer {
                    name: name.to_string(),
                    op: TransferOp::Request,
                    period,
                    auth_info: Some(auth_info.to_string()),
                },
            )?;
            if let Some(data) = &data {
                self.store.record_transfer_status(name, &data.status);
            }
            Ok(TransferRequested { domain: name.to_string(), status: data.map(|d| d.status) })
        })
    }

    /// Delegated nameservers in registry order.
    pub fn nameservers(&self, name: &str) -> Result<Vec<String>, EppError> {
        let name = required("domain name", name)?;
        self.with_session("nameservers", |s| Ok(self.domain_info(s, name)?.nameservers))
    }

    /// Bring the delegation to exactly `requested`.
    pub fn save_nameservers(&self, name: &str, requested: &[String]) -> Result<NameserverChanges, EppError> {
        let name = required("domain name", name)?;
        let wanted = reconcile_nameservers(&[], requested).add;
        if wanted.len() > domain::MAX_NAMESERVERS {
            return Err(EppError::validation(format!(
                "{} nameservers given, at most {} allowed",
                wanted.len(),
                domain::MAX_NAMESERVERS
            )));
        }

        self.with_session("save_nameservers", |s| {
            let current = self.domain_info(s, name)?;
            let diff = reconcile_nameservers(&current.nameservers, &wanted);
            if diff.is_empty() {
                debug!(domain = %name, "delegation already up to date");
                return Ok(NameserverChanges::default());
            }

            domain::update(
                s,
                DomainUpdate {
                    name: name.to_string(),
                    add: UpdateBlock { nameservers: diff.add.clone(), statuses: Vec::new() },
                    rem: UpdateBlock { nameservers: diff.rem.clone(), statuses: Vec::new() },
                    ..DomainUpdate::default()
                },
            )?;
            info!(domain = %name, added = ?diff.add, removed = ?diff.rem, "nameservers updated");
            Ok(NameserverChanges { added: diff.add, removed: diff.rem })
        })
    }

    /// Current registrar lock.
    pub fn registrar_lock(&self, name: &str) -> Result<LockState, EppError> {
        let name = required("domain name", name)?;
        self.with_session("registrar_lock", |s| Ok(LockState::from_statuses(&self.domain_info(s, name)?.statuses)))
    }

    /// Set or clear both client delete and transfer prohibitions.
    pub fn set_registrar_lock(&self, name: &str, target: LockState) -> Result<StatusChanges, EppError> {
        let name = required("domain name", name)?;

        self.with_session("set_registrar_lock", |s| {
            let current = self.domain_info(s, name)?;
            let diff = lock_diff(&current.statuses, target);
            if diff.is_empty() {
                debug!(domain = %name, ?target, "lock already at target");
                return Ok(StatusChanges::default());
            }

            domain::update(
                s,
                DomainUpdate {
                    name: name.to_string(),
                    add: UpdateBlock { nameservers: Vec::new(), statuses: diff.add.clone() },
                    rem: UpdateBlock { nameservers: Vec::new(), statuses: diff.rem.clone() },
                    ..DomainUpdate::default()
                },
            )?;
            info!(domain = %name, ?target, "registrar lock updated");
            Ok(StatusChanges::from_statuses(&diff.add, &diff.rem))
        })
    }

    /// Details of every contact on the domain, by role.
    ///
    /// Each distinct contact is queried once. Roles filled with a
    /// configured sentinel id are left out.
    pub fn contact_details(&self, name: &str) -> Result<DomainContacts, EppError> {
        let name = required("domain name", name)?;

        self.with_session("contact_details", |s| {
            let current = self.domain_info(s, name)?;

            let mut fetched: BTreeMap<&str, ContactDetails> = BTreeMap::new();
            for id in current.distinct_contact_ids() {
                if self.is_sentinel(id) {
                    continue;
                }
                fetched.insert(id, ContactDetails::from(contact::info(s, id)?));
            }

            let mut details = DomainContacts::new();
            for (role, id) in roles(&current) {
                if let Some(found) = fetched.get(id) {
                    details.insert(role, found.clone());
                }
            }
            Ok(details)
        })
    }

    /// Update each role the caller supplied details for.
    ///
    /// A contact shared between roles is updated once, from the first
    /// supplied role in registrant, admin, tech, billing order. Returns the
    /// updated contact ids.
    pub fn save_contact_details(
        &self,
        name: &str,
        details: &BTreeMap<RoleLabel, ContactDetails>,
    ) -> Result<Vec<String>, EppError> {
        let name = required("domain name", name)?;

        self.with_session("save_contact_details", |s| {
            let current = self.domain_info(s, name)?;

            let mut updated: Vec<String> = Vec::new();
            for (role, id) in roles(&current) {
                let Some(supplied) = details.get(&role) else { continue };
                if self.is_sentinel(id) || updated.iter().any(|u| u == id) {
                    continue;
                }
                contact::update(s, id, supplied.to_change())?;
                updated.push(id.to_string());
            }
            info!(domain = %name, contacts = ?updated, "contact details saved");
            Ok(updated)
        })
    }

    /// Hide (`protect = true`) or publish contact data in WHOIS.
    ///
    /// Every distinct contact on the domain is updated once. Returns the
    /// updated contact ids.
    pub fn set_id_protection(&self, name: &str, protect: bool) -> Result<Vec<String>, EppError> {
        let name = required("domain name", name)?;

        self.with_session("set_id_protection", |s| {
            let current = self.domain_info(s, name)?;

            let mut updated = Vec::new();
            for id in current.distinct_contact_ids() {
                if self.is_sentinel(id) {
                    continue;
                }
                contact::set_disclose(s, id, !protect)?;
                updated.push(id.to_string());
            }
            info!(domain = %name, protect, contacts = ?updated, "ID protection updated");
            Ok(updated)
        })
    }

    /// Domain auth-info password.
    pub fn auth_code(&self, name: &str) -> Result<String, EppError> {
        let name = required("domain name", name)?;
        self.with_session("auth_code", |s| {
            self.domain_info(s, name)?
                .auth_info
                .filter(|pw| !pw.is_empty())
                .ok_or_else(|| EppError::interpretation(format!("registry returned no auth code for {name}")))
        })
    }

    /// Create a glue host after checking it is free.
    pub fn register_nameserver(&self, name: &str, address: IpAddr) -> Result<(), EppError> {
        let name = required("nameserver", name)?;

        self.with_session("register_nameserver", |s| {
            let item = host::check_one(s, name)?;
            if !item.available {
                let reason = item.reason.as_deref().unwrap_or_default();
                return Err(EppError::validation(format!("{} {reason}", item.name).trim_end().to_string()));
            }
            host::create(s, name, vec![address])?;
            info!(host = %name, %address, "nameserver registered");
            Ok(())
        })
    }

    /// Replace one host address with another.
    pub fn modify_nameserver(&self, name: &str, current: IpAddr, new: IpAddr) -> Result<(), EppError> {
        let name = required("nameserver", name)?;
        if current == new {
            return Err(EppError::validation(format!("{name} already has address {new}")));
        }

        self.with_session("modify_nameserver", |s| {
            host::update(s, HostUpdate { name: name.to_string(), add: vec![new], rem: vec![current] })?;
            info!(host = %name, %current, %new, "nameserver address changed");
            Ok(())
        })
    }

    /// Delete a glue host.
    pub fn delete_nameserver(&self, name: &str) -> Result<(), EppError> {
        let name = required("nameserver", name)?;
        self.with_session("delete_nameserver", |s| host::delete(s, name))
    }

    /// Delete a domain.
    pub fn request_delete(&self, name: &str) -> Result<(), EppError> {
        let name = required("domain name", name)?;
        self.with_session("request_delete", |s| domain::delete(s, name))
    }

    /// Poll an incoming transfer.
    ///
    /// Unknown transfer statuses are an error rather than a guess.
    pub fn transfer_sync(&self, name: &str) -> Result<TransferProgress, EppError> {
        let name = required("domain name", name)?;

        self.with_session("transfer_sync", |s| {
            let data = domain::transfer_query(s, name)?;
            self.store.record_transfer_status(name, &data.status);

            let status: TransferStatus = data
                .status
                .parse()
                .map_err(|_| EppError::interpretation(format!("invalid transfer status: {}", data.status)))?;
            Ok(TransferProgress::from_status(status, data.expires.as_ref()))
        })
    }

    /// Expiry synchronization check.
    ///
    /// A domain whose creation and expiry fall on the same day is reported
    /// as inconsistent registry data.
    pub fn sync(&self, name: &str) -> Result<SyncReport, EppError> {
        let name = required("domain name", name)?;

        self.with_session("sync", |s| {
            let current = self.domain_info(s, name)?;
            let expires = current
                .expires
                .ok_or_else(|| EppError::interpretation(format!("empty expiry date for domain: {name}")))?;
            if current.created.is_some_and(|created| created.date() == expires.date()) {
                return Err(EppError::interpretation(format!("creation date = expiry date: {name}")));
            }

            let state = if expires.to_utc() < self.env.now() { ExpiryState::Expired } else { ExpiryState::Active };
            Ok(SyncReport { expiry_date: expires.date_string(), state })
        })
    }

    /// Domain info that also refreshes the status store.
    fn domain_info(&self, session: &mut Session<C::Transport, E>, name: &str) -> Result<DomainInfo, EppError> {
        let current = domain::info(session, name)?;
        self.store.replace_statuses(name, &current.statuses);
        Ok(current)
    }

    fn is_sentinel(&self, id: &str) -> bool {
        let policy = &self.config.contacts;
        [policy.tech.contact_id(), policy.billing.contact_id()].into_iter().flatten().any(|s| s == id)
    }
}

impl<C: Connector, E: Environment> std::fmt::Debug for Registrar<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("prefix", &self.config.registrar_prefix)
            .finish_non_exhaustive()
    }
}

/// Role slots of a domain: registrant, then admin, tech and billing contacts.
fn roles(info: &DomainInfo) -> Vec<(RoleLabel, &str)> {
    let contacts = ContactRole::ALL.iter().flat_map(|role| {
        info.contacts.iter().filter(move |c| c.role == *role).map(|c| (RoleLabel::from(c.role), c.id.as_str()))
    });
    info.registrant.as_deref().map(|id| (RoleLabel::Registrant, id)).into_iter().chain(contacts).collect()
}

fn required<'a>(what: &str, value: &'a str) -> Result<&'a str, EppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EppError::validation(format!("{what} is required")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use epp_proto::DomainStatus;

    use super::*;

    #[test]
    fn roles_list_registrant_first() {
        let info = DomainInfo {
            registrant: Some("R1".into()),
            contacts: vec![DomainContact::new(ContactRole::Tech, "T1"), DomainContact::new(ContactRole::Admin, "R1")],
            statuses: vec![DomainStatus::Ok],
            ..DomainInfo::default()
        };
        assert_eq!(
            roles(&info),
            vec![(RoleLabel::Registrant, "R1"), (RoleLabel::Administrator, "R1"), (RoleLabel::Technical, "T1")]
        );
    }

    #[test]
    fn blank_names_rejected() {
        assert!(matches!(required("domain name", "  "), Err(EppError::Validation { .. })));
        assert_eq!(required("domain name", " example.lv ").ok(), Some("example.lv"));
    }
}
