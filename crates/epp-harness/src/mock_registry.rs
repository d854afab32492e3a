//! In-memory registry model.
//!
//! [`MockRegistry`] answers EPP command documents from a small model of
//! domains, contacts and hosts. It is the oracle for flow tests: seed the
//! model, drive a flow through the loopback transport, then compare the
//! model and the command log against what the flow should have done.
//!
//! The model enforces the rules a real registry would catch client bugs
//! with: login before anything else, unknown objects, duplicate
//! nameservers or statuses, deletion of referenced objects.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Duration, Months, Utc};
use epp_proto::{
    PostalInfo, ns,
    xml::{Element, XmlNode},
};

/// Result codes the model answers with.
pub mod code {
    /// Command completed successfully.
    pub const OK: u16 = 1000;
    /// Command completed successfully; action pending.
    pub const ACTION_PENDING: u16 = 1001;
    /// Command completed successfully; ending session.
    pub const ENDING_SESSION: u16 = 1500;
    /// Command syntax error.
    pub const SYNTAX_ERROR: u16 = 2001;
    /// Command use error.
    pub const COMMAND_USE_ERROR: u16 = 2002;
    /// Unimplemented command.
    pub const UNIMPLEMENTED_COMMAND: u16 = 2101;
    /// Unimplemented option.
    pub const UNIMPLEMENTED_OPTION: u16 = 2102;
    /// Authentication error.
    pub const AUTHENTICATION_ERROR: u16 = 2200;
    /// Invalid authorization information.
    pub const INVALID_AUTH_INFO: u16 = 2202;
    /// Object pending transfer.
    pub const PENDING_TRANSFER: u16 = 2300;
    /// Object not pending transfer.
    pub const NOT_PENDING_TRANSFER: u16 = 2301;
    /// Object exists.
    pub const OBJECT_EXISTS: u16 = 2302;
    /// Object does not exist.
    pub const OBJECT_MISSING: u16 = 2303;
    /// Object status prohibits operation.
    pub const STATUS_PROHIBITS: u16 = 2304;
    /// Object association prohibits operation.
    pub const ASSOCIATION_PROHIBITS: u16 = 2305;
    /// Parameter value policy error.
    pub const POLICY_ERROR: u16 = 2306;
}

const SERVER_ID: &str = "Mock Registry";

/// Sponsoring registrar reported as the other side of a transfer.
const LOSING_REGISTRAR: &str = "LOSING-REG";

/// Domain as the model stores it. Statuses are kept by wire name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockDomain {
    /// Domain name.
    pub name: String,
    /// Registrant contact id.
    pub registrant: String,
    /// `(type, id)` role contacts in document order.
    pub contacts: Vec<(String, String)>,
    /// Delegated nameservers.
    pub nameservers: Vec<String>,
    /// Status flags.
    pub statuses: Vec<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Expiry time.
    pub expires: Option<DateTime<Utc>>,
    /// Auth-info password.
    pub auth_info: String,
    /// Transfer state by wire name, once a transfer exists.
    pub transfer_status: Option<String>,
}

impl MockDomain {
    /// Domain with status `ok`, no contacts, no dates.
    pub fn new(name: impl Into<String>, registrant: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registrant: registrant.into(),
            contacts: Vec::new(),
            nameservers: Vec::new(),
            statuses: vec!["ok".to_string()],
            created: None,
            expires: None,
            auth_info: String::new(),
            transfer_status: None,
        }
    }

    /// Add a role contact.
    #[must_use]
    pub fn contact(mut self, role: &str, id: impl Into<String>) -> Self {
        self.contacts.push((role.to_string(), id.into()));
        self
    }

    /// Replace the delegation.
    #[must_use]
    pub fn nameservers<S: Into<String>>(mut self, hosts: impl IntoIterator<Item = S>) -> Self {
        self.nameservers = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the status set.
    #[must_use]
    pub fn statuses<S: Into<String>>(mut self, statuses: impl IntoIterator<Item = S>) -> Self {
        self.statuses = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// Set creation and expiry.
    #[must_use]
    pub fn dates(mut self, created: Option<DateTime<Utc>>, expires: Option<DateTime<Utc>>) -> Self {
        self.created = created;
        self.expires = expires;
        self
    }

    /// Set the auth-info password.
    #[must_use]
    pub fn auth_info(mut self, password: impl Into<String>) -> Self {
        self.auth_info = password.into();
        self
    }

    /// Set the transfer status.
    #[must_use]
    pub fn transfer_status(mut self, status: impl Into<String>) -> Self {
        self.transfer_status = Some(status.into());
        self
    }

    fn references_contact(&self, id: &str) -> bool {
        self.registrant == id || self.contacts.iter().any(|(_, c)| c == id)
    }
}

/// Contact as the model stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockContact {
    /// Contact id.
    pub id: String,
    /// Postal information.
    pub postal: PostalInfo,
    /// Phone.
    pub voice: String,
    /// Fax.
    pub fax: String,
    /// Email.
    pub email: String,
    /// Auth-info password.
    pub auth_info: String,
    /// Registry extension registration number.
    pub reg_nr: String,
    /// Registry extension VAT number.
    pub vat_nr: String,
    /// Last disclose flag set through an update.
    pub disclose: Option<bool>,
}

impl MockContact {
    /// Contact with only an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            postal: PostalInfo { name: name.into(), ..PostalInfo::default() },
            ..Self::default()
        }
    }
}

/// Host as the model stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockHost {
    /// Host name.
    pub name: String,
    /// Address literals.
    pub addresses: Vec<String>,
}

enum Fault {
    Fail(Vec<(u16, String)>),
    Drop,
}

struct State {
    client_id: String,
    password: String,
    now: DateTime<Utc>,
    authenticated: bool,

    domains: BTreeMap<String, MockDomain>,
    contacts: BTreeMap<String, MockContact>,
    hosts: BTreeMap<String, MockHost>,
    reserved: BTreeMap<String, String>,
    faults: Vec<(String, Fault)>,

    requests: Vec<String>,
    commands: Vec<String>,
    connections: usize,
    closes: usize,
    logins: usize,
    logouts: usize,
    sv_counter: u64,
}

/// Shared handle to one in-memory registry.
#[derive(Clone)]
pub struct MockRegistry {
    state: Arc<Mutex<State>>,
}

impl MockRegistry {
    /// Registry accepting exactly this login, clock at 2025-01-01.
    pub fn new(client_id: impl Into<String>, password: impl Into<String>) -> Self {
        let state = State {
            client_id: client_id.into(),
            password: password.into(),
            now: DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default(),
            authenticated: false,
            domains: BTreeMap::new(),
            contacts: BTreeMap::new(),
            hosts: BTreeMap::new(),
            reserved: BTreeMap::new(),
            faults: Vec::new(),
            requests: Vec::new(),
            commands: Vec::new(),
            connections: 0,
            closes: 0,
            logins: 0,
            logouts: 0,
            sv_counter: 0,
        };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registry clock, used for creation dates and new expiry dates.
    pub fn set_now(&self, now: DateTime<Utc>) {
        self.lock().now = now;
    }

    /// Seed a domain.
    pub fn add_domain(&self, domain: MockDomain) {
        self.lock().domains.insert(key(&domain.name), domain);
    }

    /// Seed a contact.
    pub fn add_contact(&self, contact: MockContact) {
        self.lock().contacts.insert(contact.id.clone(), contact);
    }

    /// Seed a host.
    pub fn add_host(&self, host: MockHost) {
        self.lock().hosts.insert(key(&host.name), host);
    }

    /// Make a free name unavailable with `reason`.
    pub fn reserve(&self, name: &str, reason: impl Into<String>) {
        self.lock().reserved.insert(key(name), reason.into());
    }

    /// Answer the next command of `category` with a single failing result.
    pub fn fail_next(&self, category: &str, code: u16, message: impl Into<String>) {
        self.fail_next_with(category, vec![(code, message.into())]);
    }

    /// Answer the next command of `category` with these results.
    pub fn fail_next_with(&self, category: &str, results: Vec<(u16, String)>) {
        self.lock().faults.push((category.to_string(), Fault::Fail(results)));
    }

    /// Drop the connection instead of answering the next command of `category`.
    pub fn drop_next(&self, category: &str) {
        self.lock().faults.push((category.to_string(), Fault::Drop));
    }

    /// Greeting sent to a new connection. Counts the connection.
    pub fn accept(&self) -> Vec<u8> {
        let mut state = self.lock();
        state.connections += 1;
        state.authenticated = false;
        greeting(state.now).to_document().into_bytes()
    }

    /// The client released its connection.
    pub fn release(&self) {
        let mut state = self.lock();
        state.closes += 1;
        state.authenticated = false;
    }

    /// Answer one command document. `None` means the connection was dropped.
    pub fn handle(&self, request: &[u8]) -> Option<Vec<u8>> {
        let mut state = self.lock();
        state.requests.push(String::from_utf8_lossy(request).into_owned());

        let root = XmlNode::parse(request).ok().filter(|root| root.is(ns::EPP, "epp"));
        let Some(command) = root.as_ref().and_then(|root| root.child("command")) else {
            let reply = Reply::error(code::SYNTAX_ERROR, "Command syntax error");
            return Some(state.render(reply, None));
        };
        let cl_trid = command.child_text("clTRID");
        let Some(verb) = command.first_child() else {
            return Some(state.render(Reply::error(code::SYNTAX_ERROR, "Command syntax error"), cl_trid));
        };

        let category = category_of(verb);
        state.commands.push(category.clone());

        let reply = match state.take_fault(&category) {
            Some(Fault::Drop) => {
                state.authenticated = false;
                return None;
            },
            Some(Fault::Fail(results)) => Reply { results, data: None },
            None => state.dispatch(&category, verb, command),
        };
        Some(state.render(reply, cl_trid))
    }

    /// Category of every command received, in order, across connections.
    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    /// How many commands of `category` were received.
    pub fn count(&self, category: &str) -> usize {
        self.lock().commands.iter().filter(|c| *c == category).count()
    }

    /// Every raw request document, in order.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    /// Connections accepted.
    pub fn connections(&self) -> usize {
        self.lock().connections
    }

    /// Connections released by the client.
    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    /// Successful logins.
    pub fn logins(&self) -> usize {
        self.lock().logins
    }

    /// Logouts received.
    pub fn logouts(&self) -> usize {
        self.lock().logouts
    }

    /// True while the current connection is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    /// Stored domain.
    pub fn domain(&self, name: &str) -> Option<MockDomain> {
        self.lock().domains.get(&key(name)).cloned()
    }

    /// Stored contact.
    pub fn contact(&self, id: &str) -> Option<MockContact> {
        self.lock().contacts.get(id).cloned()
    }

    /// Ids of every stored contact.
    pub fn contact_ids(&self) -> Vec<String> {
        self.lock().contacts.keys().cloned().collect()
    }

    /// Stored host.
    pub fn host(&self, name: &str) -> Option<MockHost> {
        self.lock().hosts.get(&key(name)).cloned()
    }
}

impl std::fmt::Debug for MockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MockRegistry")
            .field("domains", &state.domains.len())
            .field("contacts", &state.contacts.len())
            .field("hosts", &state.hosts.len())
            .field("commands", &state.commands.len())
            .finish_non_exhaustive()
    }
}

struct Reply {
    results: Vec<(u16, String)>,
    data: Option<Element>,
}

impl Reply {
    fn ok() -> Self {
        Self::code(code::OK, "Command completed successfully")
    }

    fn code(code: u16, message: &str) -> Self {
        Self { results: vec![(code, message.to_string())], data: None }
    }

    fn error(code: u16, message: impl Into<String>) -> Self {
        Self { results: vec![(code, message.into())], data: None }
    }

    fn data(data: Element) -> Self {
        Self { data: Some(data), ..Self::ok() }
    }

    fn missing() -> Self {
        Self::error(code::OBJECT_MISSING, "Object does not exist")
    }

    fn policy(reason: &str) -> Self {
        Self::error(code::POLICY_ERROR, format!("Parameter value policy error: {reason}"))
    }
}

impl State {
    fn take_fault(&mut self, category: &str) -> Option<Fault> {
        let index = self.faults.iter().position(|(c, _)| c == category)?;
        Some(self.faults.remove(index).1)
    }

    fn render(&mut self, reply: Reply, cl_trid: Option<&str>) -> Vec<u8> {
        self.sv_counter += 1;
        let results = reply.results.iter().map(|(code, message)| {
            Element::new("result").attr("code", code.to_string()).child(Element::text_element("msg", message.as_str()))
        });
        let tr_id = Element::new("trID")
            .text_child_opt("clTRID", cl_trid)
            .child(Element::text_element("svTRID", format!("MOCK-{}", self.sv_counter)));

        let response = Element::new("response")
            .children(results)
            .child_opt(reply.data.map(|data| Element::new("resData").child(data)))
            .child(tr_id);
        Element::new("epp").attr("xmlns", ns::EPP).child(response).to_document().into_bytes()
    }

    fn dispatch(&mut self, category: &str, verb: &XmlNode, command: &XmlNode) -> Reply {
        if category == "login" {
            return self.login(verb);
        }
        if !self.authenticated {
            return Reply::error(code::COMMAND_USE_ERROR, "Command use error: not logged in");
        }
        if category == "logout" {
            self.authenticated = false;
            self.logouts += 1;
            return Reply::code(code::ENDING_SESSION, "Command completed successfully; ending session");
        }

        let Some(object) = verb.first_child() else {
            return Reply::error(code::SYNTAX_ERROR, "Command syntax error");
        };
        match category {
            "domain-check" => self.domain_check(object),
            "domain-create" => self.domain_create(object),
            "domain-info" => self.domain_info(object),
            "domain-renew" => self.domain_renew(object),
            "domain-transfer" => self.domain_transfer(verb.attribute("op").unwrap_or("query"), object),
            "domain-update" => self.domain_update(object),
            "domain-delete" => self.domain_delete(object),
            "contact-check" => self.contact_check(object),
            "contact-create" => self.contact_create(object, command.child("extension")),
            "contact-info" => self.contact_info(object),
            "contact-update" => self.contact_update(object),
            "contact-delete" => self.contact_delete(object),
            "host-check" => self.host_check(object),
            "host-create" => self.host_create(object),
            "host-info" => self.host_info(object),
            "host-update" => self.host_update(object),
            "host-delete" => self.host_delete(object),
            _ => Reply::error(code::UNIMPLEMENTED_COMMAND, "Unimplemented command"),
        }
    }

    fn login(&mut self, verb: &XmlNode) -> Reply {
        if self.authenticated {
            return Reply::error(code::COMMAND_USE_ERROR, "Command use error: already logged in");
        }
        let client_id = verb.child_text("clID").unwrap_or_default();
        let password = verb.child("pw").map(XmlNode::text).unwrap_or_default();
        if client_id != self.client_id || password != self.password {
            return Reply::error(code::AUTHENTICATION_ERROR, "Authentication error");
        }
        self.authenticated = true;
        self.logins += 1;
        Reply::ok()
    }

    fn domain_check(&self, object: &XmlNode) -> Reply {
        let items = object.children_named("name").map(|node| {
            let name = node.text();
            let reason = self
                .reserved
                .get(&key(name))
                .map(String::as_str)
                .or_else(|| self.domains.contains_key(&key(name)).then_some("In use"));
            check_entry("domain", "name", name, reason)
        });
        Reply::data(domain_element("chkData").children(items))
    }

    fn domain_create(&mut self, object: &XmlNode) -> Reply {
        let Some(name) = object.child_text("name") else { return Reply::missing() };
        if self.domains.contains_key(&key(name)) {
            return Reply::error(code::OBJECT_EXISTS, "Object exists");
        }
        if let Some(reason) = self.reserved.get(&key(name)) {
            return Reply::policy(reason);
        }
        let registrant = object.child_text("registrant").unwrap_or_default();
        if !self.contacts.contains_key(registrant) {
            return Reply::error(code::OBJECT_MISSING, format!("Registrant {registrant} does not exist"));
        }

        let created = self.now;
        let expires = add_years(created, period_of(object));
        let domain = MockDomain {
            name: name.to_string(),
            registrant: registrant.to_string(),
            contacts: object
                .children_named("contact")
                .map(|c| (c.attribute("type").unwrap_or_default().to_string(), c.text().to_string()))
                .collect(),
            nameservers: host_objects(object.child("ns")),
            statuses: vec!["ok".to_string()],
            created: Some(created),
            expires: Some(expires),
            auth_info: auth_info_of(object).to_string(),
            transfer_status: None,
        };
        self.domains.insert(key(name), domain);

        Reply::data(
            domain_element("creData")
                .child(Element::text_element("domain:name", name))
                .child(Element::text_element("domain:crDate", stamp(created)))
                .child(Element::text_element("domain:exDate", stamp(expires))),
        )
    }

    fn domain_info(&self, object: &XmlNode) -> Reply {
        let Some(domain) = object.child_text("name").and_then(|n| self.domains.get(&key(n))) else {
            return Reply::missing();
        };

        let ns_block = (!domain.nameservers.is_empty()).then(|| {
            Element::new("domain:ns")
                .children(domain.nameservers.iter().map(|h| Element::text_element("domain:hostObj", h.as_str())))
        });
        let subordinate = self
            .hosts
            .values()
            .filter(|h| key(&h.name).ends_with(&format!(".{}", key(&domain.name))))
            .map(|h| Element::text_element("domain:host", h.name.as_str()));

        Reply::data(
            domain_element("infData")
                .child(Element::text_element("domain:name", domain.name.as_str()))
                .child(Element::text_element("domain:roid", roid(&domain.name)))
                .children(domain.statuses.iter().map(|s| Element::new("domain:status").attr("s", s.as_str())))
                .child(Element::text_element("domain:registrant", domain.registrant.as_str()))
                .children(domain.contacts.iter().map(|(role, id)| {
                    Element::text_element("domain:contact", id.as_str()).attr("type", role.as_str())
                }))
                .child_opt(ns_block)
                .children(subordinate)
                .child(Element::text_element("domain:clID", self.client_id.as_str()))
                .child_opt(domain.created.map(|d| Element::text_element("domain:crDate", stamp(d))))
                .child_opt(domain.expires.map(|d| Element::text_element("domain:exDate", stamp(d))))
                .child(
                    Element::new("domain:authInfo")
                        .child(Element::text_element("domain:pw", domain.auth_info.as_str())),
                ),
        )
    }

    fn domain_renew(&mut self, object: &XmlNode) -> Reply {
        let Some(domain) = object.child_text("name").and_then(|n| self.domains.get_mut(&key(n))) else {
            return Reply::missing();
        };
        let Some(current) = domain.expires else {
            return Reply::error(code::STATUS_PROHIBITS, "Object status prohibits operation");
        };
        if object.child_text("curExpDate") != Some(current.format("%Y-%m-%d").to_string().as_str()) {
            return Reply::policy("curExpDate does not match");
        }

        let expires = add_years(current, period_of(object));
        domain.expires = Some(expires);
        Reply::data(
            domain_element("renData")
                .child(Element::text_element("domain:name", domain.name.as_str()))
                .child(Element::text_element("domain:exDate", stamp(expires))),
        )
    }

    fn domain_transfer(&mut self, op: &str, object: &XmlNode) -> Reply {
        let requester = self.client_id.clone();
        let now = self.now;
        let Some(domain) = object.child_text("name").and_then(|n| self.domains.get_mut(&key(n))) else {
            return Reply::missing();
        };

        match op {
            "request" => {
                if auth_info_of(object) != domain.auth_info {
                    return Reply::error(code::INVALID_AUTH_INFO, "Invalid authorization information");
                }
                if domain.transfer_status.as_deref() == Some("pending") {
                    return Reply::error(code::PENDING_TRANSFER, "Object pending transfer");
                }
                domain.transfer_status = Some("pending".to_string());
                Reply {
                    data: Some(transfer_data(domain, &requester, now)),
                    ..Reply::code(code::ACTION_PENDING, "Command completed successfully; action pending")
                }
            },
            "query" => {
                if domain.transfer_status.is_none() {
                    return Reply::error(code::NOT_PENDING_TRANSFER, "Object not pending transfer");
                }
                Reply::data(transfer_data(domain, &requester, now))
            },
            _ => Reply::error(code::UNIMPLEMENTED_OPTION, "Unimplemented option"),
        }
    }

    fn domain_update(&mut self, object: &XmlNode) -> Reply {
        let Some(stored) = object.child_text("name").and_then(|n| self.domains.get(&key(n))) else {
            return Reply::missing();
        };
        if stored.statuses.iter().any(|s| s == "serverUpdateProhibited") {
            return Reply::error(code::STATUS_PROHIBITS, "Object status prohibits operation");
        }

        let mut domain = stored.clone();
        if let Some(rem) = object.child("rem") {
            for host in host_objects(rem.child("ns")) {
                let before = domain.nameservers.len();
                domain.nameservers.retain(|h| !h.eq_ignore_ascii_case(&host));
                if domain.nameservers.len() == before {
                    return Reply::policy(&format!("{host} is not delegated"));
                }
            }
            for status in statuses_of(rem) {
                domain.statuses.retain(|s| *s != status);
            }
        }
        if let Some(add) = object.child("add") {
            for host in host_objects(add.child("ns")) {
                if domain.nameservers.iter().any(|h| h.eq_ignore_ascii_case(&host)) {
                    return Reply::policy(&format!("{host} is already delegated"));
                }
                domain.nameservers.push(host);
            }
            for status in statuses_of(add) {
                if domain.statuses.contains(&status) {
                    return Reply::policy(&format!("status {status} already set"));
                }
                domain.statuses.push(status);
            }
        }
        if domain.nameservers.len() > 13 {
            return Reply::policy("too many nameservers");
        }
        if let Some(chg) = object.child("chg") {
            if let Some(registrant) = chg.child_text("registrant") {
                domain.registrant = registrant.to_string();
            }
            if let Some(pw) = chg.child("authInfo").and_then(|a| a.child_text("pw")) {
                domain.auth_info = pw.to_string();
            }
        }

        domain.statuses.retain(|s| s != "ok");
        if domain.statuses.is_empty() {
            domain.statuses.push("ok".to_string());
        }
        self.domains.insert(key(&domain.name), domain);
        Reply::ok()
    }

    fn domain_delete(&mut self, object: &XmlNode) -> Reply {
        let Some(domain) = object.child_text("name").and_then(|n| self.domains.get_mut(&key(n))) else {
            return Reply::missing();
        };
        if domain.statuses.iter().any(|s| s == "clientDeleteProhibited" || s == "serverDeleteProhibited") {
            return Reply::error(code::STATUS_PROHIBITS, "Object status prohibits operation");
        }
        domain.statuses = vec!["pendingDelete".to_string()];
        Reply::code(code::ACTION_PENDING, "Command completed successfully; action pending")
    }

    fn contact_check(&self, object: &XmlNode) -> Reply {
        let items = object.children_named("id").map(|node| {
            let id = node.text();
            check_entry("contact", "id", id, self.contacts.contains_key(id).then_some("In use"))
        });
        Reply::data(contact_element("chkData").children(items))
    }

    fn contact_create(&mut self, object: &XmlNode, extension: Option<&XmlNode>) -> Reply {
        let Some(id) = object.child_text("id") else { return Reply::missing() };
        if self.contacts.contains_key(id) {
            return Reply::error(code::OBJECT_EXISTS, "Object exists");
        }

        let ext = extension.and_then(|e| e.child("create"));
        let ext_text = |name: &str| ext.and_then(|e| e.child_text(name)).unwrap_or_default().to_string();
        let text = |name: &str| object.child_text(name).unwrap_or_default().to_string();
        let contact = MockContact {
            id: id.to_string(),
            postal: object.child("postalInfo").map(postal_of).unwrap_or_default(),
            voice: text("voice"),
            fax: text("fax"),
            email: text("email"),
            auth_info: auth_info_of(object).to_string(),
            reg_nr: ext_text("regNr"),
            vat_nr: ext_text("vatNr"),
            disclose: None,
        };
        self.contacts.insert(id.to_string(), contact);

        Reply::data(
            contact_element("creData")
                .child(Element::text_element("contact:id", id))
                .child(Element::text_element("contact:crDate", stamp(self.now))),
        )
    }

    fn contact_info(&self, object: &XmlNode) -> Reply {
        let Some(contact) = object.child_text("id").and_then(|id| self.contacts.get(id)) else {
            return Reply::missing();
        };
        let postal = &contact.postal;

        let addr = Element::new("contact:addr")
            .children(postal.street.iter().map(|line| Element::text_element("contact:street", line.as_str())))
            .text_child_nonempty("contact:city", &postal.city)
            .text_child_nonempty("contact:sp", &postal.sp)
            .text_child_nonempty("contact:pc", &postal.pc)
            .text_child_nonempty("contact:cc", &postal.cc);
        let postal_info = Element::new("contact:postalInfo")
            .attr("type", "loc")
            .text_child_nonempty("contact:name", &postal.name)
            .text_child_nonempty("contact:org", &postal.org)
            .child(addr);

        Reply::data(
            contact_element("infData")
                .child(Element::text_element("contact:id", contact.id.as_str()))
                .child(Element::text_element("contact:roid", roid(&contact.id)))
                .child(Element::new("contact:status").attr("s", "ok"))
                .child(postal_info)
                .text_child_nonempty("contact:voice", &contact.voice)
                .text_child_nonempty("contact:fax", &contact.fax)
                .text_child_nonempty("contact:email", &contact.email)
                .child(Element::text_element("contact:crDate", stamp(self.now)))
                .child(
                    Element::new("contact:authInfo")
                        .child(Element::text_element("contact:pw", contact.auth_info.as_str())),
                ),
        )
    }

    fn contact_update(&mut self, object: &XmlNode) -> Reply {
        let Some(contact) = object.child_text("id").and_then(|id| self.contacts.get_mut(id)) else {
            return Reply::missing();
        };
        let Some(chg) = object.child("chg") else {
            return Reply::error(code::SYNTAX_ERROR, "Command syntax error: empty update");
        };

        if let Some(postal) = chg.child("postalInfo") {
            contact.postal = postal_of(postal);
        }
        for (field, target) in
            [("voice", &mut contact.voice), ("fax", &mut contact.fax), ("email", &mut contact.email)]
        {
            if let Some(node) = chg.child(field) {
                *target = node.text().to_string();
            }
        }
        if let Some(disclose) = chg.child("disclose") {
            contact.disclose = Some(disclose.attribute("flag") == Some("1"));
        }
        Reply::ok()
    }

    fn contact_delete(&mut self, object: &XmlNode) -> Reply {
        let Some(id) = object.child_text("id") else { return Reply::missing() };
        if !self.contacts.contains_key(id) {
            return Reply::missing();
        }
        if self.domains.values().any(|d| d.references_contact(id)) {
            return Reply::error(code::ASSOCIATION_PROHIBITS, "Object association prohibits operation");
        }
        self.contacts.remove(id);
        Reply::ok()
    }

    fn host_check(&self, object: &XmlNode) -> Reply {
        let items = object.children_named("name").map(|node| {
            let name = node.text();
            check_entry("host", "name", name, self.hosts.contains_key(&key(name)).then_some("In use"))
        });
        Reply::data(host_element("chkData").children(items))
    }

    fn host_create(&mut self, object: &XmlNode) -> Reply {
        let Some(name) = object.child_text("name") else { return Reply::missing() };
        if self.hosts.contains_key(&key(name)) {
            return Reply::error(code::OBJECT_EXISTS, "Object exists");
        }
        let host = MockHost {
            name: name.to_string(),
            addresses: object.children_named("addr").map(|a| a.text().to_string()).collect(),
        };
        self.hosts.insert(key(name), host);

        Reply::data(
            host_element("creData")
                .child(Element::text_element("host:name", name))
                .child(Element::text_element("host:crDate", stamp(self.now))),
        )
    }

    fn host_info(&self, object: &XmlNode) -> Reply {
        let Some(host) = object.child_text("name").and_then(|n| self.hosts.get(&key(n))) else {
            return Reply::missing();
        };
        let addresses = host.addresses.iter().map(|addr| {
            let version = if addr.contains(':') { "v6" } else { "v4" };
            Element::text_element("host:addr", addr.as_str()).attr("ip", version)
        });

        Reply::data(
            host_element("infData")
                .child(Element::text_element("host:name", host.name.as_str()))
                .child(Element::new("host:status").attr("s", "ok"))
                .children(addresses),
        )
    }

    fn host_update(&mut self, object: &XmlNode) -> Reply {
        let Some(stored) = object.child_text("name").and_then(|n| self.hosts.get(&key(n))) else {
            return Reply::missing();
        };

        let mut host = stored.clone();
        let addresses = |block: Option<&XmlNode>| -> Vec<String> {
            block.map(|b| b.children_named("addr").map(|a| a.text().to_string()).collect()).unwrap_or_default()
        };
        for addr in addresses(object.child("rem")) {
            let before = host.addresses.len();
            host.addresses.retain(|a| *a != addr);
            if host.addresses.len() == before {
                return Reply::policy(&format!("{addr} is not assigned"));
            }
        }
        for addr in addresses(object.child("add")) {
            if host.addresses.contains(&addr) {
                return Reply::policy(&format!("{addr} is already assigned"));
            }
            host.addresses.push(addr);
        }

        self.hosts.insert(key(&host.name), host);
        Reply::ok()
    }

    fn host_delete(&mut self, object: &XmlNode) -> Reply {
        let Some(name) = object.child_text("name") else { return Reply::missing() };
        if !self.hosts.contains_key(&key(name)) {
            return Reply::missing();
        }
        if self.domains.values().any(|d| d.nameservers.iter().any(|h| h.eq_ignore_ascii_case(name))) {
            return Reply::error(code::ASSOCIATION_PROHIBITS, "Object association prohibits operation");
        }
        self.hosts.remove(&key(name));
        Reply::ok()
    }
}

/// Same `{object}-{verb}` naming the client uses in its transaction ids.
fn category_of(verb: &XmlNode) -> String {
    if matches!(verb.name.as_str(), "login" | "logout") {
        return verb.name.clone();
    }
    let object = match verb.first_child().and_then(|o| o.namespace.as_deref()) {
        Some(ns::DOMAIN) => "domain",
        Some(ns::CONTACT) => "contact",
        Some(ns::HOST) => "host",
        _ => "unknown",
    };
    format!("{object}-{}", verb.name)
}

fn greeting(now: DateTime<Utc>) -> Element {
    let objects = [ns::DOMAIN, ns::CONTACT, ns::HOST].map(|uri| Element::text_element("objURI", uri));
    let extensions = [ns::REGISTRY_DOMAIN_EXT, ns::REGISTRY_CONTACT_EXT, ns::SEC_DNS]
        .map(|uri| Element::text_element("extURI", uri));

    let menu = Element::new("svcMenu")
        .child(Element::text_element("version", "1.0"))
        .child(Element::text_element("lang", "en"))
        .children(objects)
        .child(Element::new("svcExtension").children(extensions));
    let greeting = Element::new("greeting")
        .child(Element::text_element("svID", SERVER_ID))
        .child(Element::text_element("svDate", stamp(now)))
        .child(menu);
    Element::new("epp").attr("xmlns", ns::EPP).child(greeting)
}

fn domain_element(name: &str) -> Element {
    Element::new(format!("domain:{name}")).attr("xmlns:domain", ns::DOMAIN)
}

fn contact_element(name: &str) -> Element {
    Element::new(format!("contact:{name}")).attr("xmlns:contact", ns::CONTACT)
}

fn host_element(name: &str) -> Element {
    Element::new(format!("host:{name}")).attr("xmlns:host", ns::HOST)
}

fn check_entry(prefix: &str, tag: &str, value: &str, reason: Option<&str>) -> Element {
    let avail = if reason.is_some() { "0" } else { "1" };
    Element::new(format!("{prefix}:cd"))
        .child(Element::text_element(format!("{prefix}:{tag}"), value).attr("avail", avail))
        .text_child_opt(&format!("{prefix}:reason"), reason)
}

fn transfer_data(domain: &MockDomain, requester: &str, now: DateTime<Utc>) -> Element {
    domain_element("trnData")
        .child(Element::text_element("domain:name", domain.name.as_str()))
        .text_child_opt("domain:trStatus", domain.transfer_status.as_deref())
        .child(Element::text_element("domain:reID", requester))
        .child(Element::text_element("domain:reDate", stamp(now)))
        .child(Element::text_element("domain:acID", LOSING_REGISTRAR))
        .child(Element::text_element("domain:acDate", stamp(now + Duration::days(5))))
        .child_opt(domain.expires.map(|d| Element::text_element("domain:exDate", stamp(d))))
}

fn postal_of(node: &XmlNode) -> PostalInfo {
    let text = |parent: Option<&XmlNode>, name: &str| {
        parent.and_then(|p| p.child_text(name)).unwrap_or_default().to_string()
    };
    let addr = node.child("addr");
    PostalInfo {
        name: text(Some(node), "name"),
        org: text(Some(node), "org"),
        street: addr.map(|a| a.children_named("street").map(|s| s.text().to_string()).collect()).unwrap_or_default(),
        city: text(addr, "city"),
        sp: text(addr, "sp"),
        pc: text(addr, "pc"),
        cc: text(addr, "cc"),
    }
}

fn host_objects(block: Option<&XmlNode>) -> Vec<String> {
    let Some(block) = block else { return Vec::new() };
    block
        .children
        .iter()
        .filter_map(|entry| match entry.name.as_str() {
            "hostObj" => Some(entry.text()),
            "hostAttr" => entry.child_text("hostName"),
            _ => None,
        })
        .map(str::to_string)
        .collect()
}

fn statuses_of(block: &XmlNode) -> Vec<String> {
    block.children_named("status").filter_map(|s| s.attribute("s")).map(str::to_string).collect()
}

fn auth_info_of(object: &XmlNode) -> &str {
    object.child("authInfo").and_then(|a| a.child_text("pw")).unwrap_or_default()
}

fn period_of(object: &XmlNode) -> u32 {
    object.child_text("period").and_then(|p| p.parse().ok()).unwrap_or(1)
}

fn add_years(from: DateTime<Utc>, years: u32) -> DateTime<Utc> {
    from.checked_add_months(Months::new(years.saturating_mul(12))).unwrap_or(from)
}

fn stamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S.0Z").to_string()
}

fn roid(name: &str) -> String {
    format!("{}-MOCK", name.to_ascii_uppercase().replace('.', "_"))
}

fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
