//! Command Builder.
//!
//! Every EPP command is a variant of [`Command`]. Rendering is a pure
//! function of the command and its [`ClTrid`]; the tree is assembled from
//! [`Element`]s, so caller values are escaped by construction and optional
//! values that are empty never produce an element.

use std::{fmt, net::IpAddr};

use chrono::NaiveDate;

use crate::{
    ns,
    types::{DomainContact, DomainStatus, PostalInfo, TransferOp},
    xml::Element,
};

/// Client transaction identifier: `{prefix}-{category}-{token}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClTrid(String);

impl ClTrid {
    /// Compose an identifier. `category` comes from [`Command::category`].
    pub fn new(prefix: &str, category: &str, token: u64) -> Self {
        Self(format!("{prefix}-{category}-{token}"))
    }

    /// Identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClTrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object and extension namespaces declared at login.
///
/// A registry rejects commands for any object type not declared here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Services {
    /// `<objURI>` entries.
    pub object_uris: Vec<String>,
    /// `<extURI>` entries inside `<svcExtension>`.
    pub extension_uris: Vec<String>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            object_uris: vec![ns::DOMAIN.to_string(), ns::CONTACT.to_string(), ns::HOST.to_string()],
            extension_uris: vec![
                ns::REGISTRY_DOMAIN_EXT.to_string(),
                ns::REGISTRY_CONTACT_EXT.to_string(),
                ns::SEC_DNS.to_string(),
            ],
        }
    }
}

/// `<login>` payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Login {
    /// Registrar client identifier (`clID`).
    pub client_id: String,
    /// Password, carried as CDATA.
    pub password: String,
    /// Declared namespaces.
    pub services: Services,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("client_id", &self.client_id)
            .field("password", &format_args!("<redacted {} bytes>", self.password.len()))
            .field("services", &self.services)
            .finish()
    }
}

/// `domain:create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCreate {
    /// Fully qualified domain name.
    pub name: String,
    /// Registration period in years.
    pub period: u8,
    /// Nameserver host names, sent as `hostAttr` so external hosts need no
    /// prior host object. Empty omits the `ns` block.
    pub nameservers: Vec<String>,
    /// Registrant contact id.
    pub registrant: String,
    /// Role contacts in the order they are emitted.
    pub contacts: Vec<DomainContact>,
    /// Domain auth-info password.
    pub auth_info: String,
}

/// `domain:renew`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRenew {
    /// Domain name.
    pub name: String,
    /// Expiry date the registry currently holds.
    pub current_expiry: NaiveDate,
    /// Years to add.
    pub period: u8,
}

/// `domain:transfer` with any `op`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTransfer {
    /// Domain name.
    pub name: String,
    /// Transfer operation.
    pub op: TransferOp,
    /// Years to add on completion (request only).
    pub period: Option<u8>,
    /// Auth-info password authorising the transfer.
    pub auth_info: Option<String>,
}

/// One `add` or `rem` block of a `domain:update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBlock {
    /// Nameserver host names.
    pub nameservers: Vec<String>,
    /// Status flags.
    pub statuses: Vec<DomainStatus>,
}

impl UpdateBlock {
    /// True when the block would render as an empty element.
    pub fn is_empty(&self) -> bool {
        self.nameservers.is_empty() && self.statuses.is_empty()
    }
}

/// `chg` block of a `domain:update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainChange {
    /// New registrant contact id.
    pub registrant: Option<String>,
    /// New auth-info password.
    pub auth_info: Option<String>,
}

impl DomainChange {
    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.registrant.is_none() && self.auth_info.is_none()
    }
}

/// `domain:update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainUpdate {
    /// Domain name.
    pub name: String,
    /// Values to add.
    pub add: UpdateBlock,
    /// Values to remove.
    pub rem: UpdateBlock,
    /// Values to replace.
    pub chg: DomainChange,
}

impl DomainUpdate {
    /// True when the update carries no change at all.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.rem.is_empty() && self.chg.is_empty()
    }
}

/// Registry contact extension (registration and VAT numbers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactExtension {
    /// Company or personal registration number.
    pub reg_nr: String,
    /// VAT number.
    pub vat_nr: String,
}

impl ContactExtension {
    /// True when neither number is set; the extension is then omitted.
    pub fn is_empty(&self) -> bool {
        self.reg_nr.is_empty() && self.vat_nr.is_empty()
    }
}

/// `contact:create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactCreate {
    /// Registrar-assigned contact id.
    pub id: String,
    /// Postal information.
    pub postal: PostalInfo,
    /// Phone number in `+CC.NNNN` form.
    pub voice: String,
    /// Fax number.
    pub fax: String,
    /// Email address.
    pub email: String,
    /// Contact auth-info password.
    pub auth_info: String,
    /// Registry extension values.
    pub extension: ContactExtension,
}

/// `chg` block of a `contact:update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactChange {
    /// Replacement postal info.
    pub postal: Option<PostalInfo>,
    /// Replacement phone.
    pub voice: Option<String>,
    /// Replacement fax.
    pub fax: Option<String>,
    /// Replacement email.
    pub email: Option<String>,
    /// Disclose flag for name, addr, voice, fax and email.
    pub disclose: Option<bool>,
}

/// `contact:update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpdate {
    /// Contact id.
    pub id: String,
    /// Replacement values.
    pub chg: ContactChange,
}

/// `host:create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCreate {
    /// Host name.
    pub name: String,
    /// Glue addresses.
    pub addresses: Vec<IpAddr>,
}

/// `host:update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostUpdate {
    /// Host name.
    pub name: String,
    /// Addresses to add.
    pub add: Vec<IpAddr>,
    /// Addresses to remove.
    pub rem: Vec<IpAddr>,
}

/// Every command the client can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open an authenticated session.
    Login(Login),
    /// End the session.
    Logout,
    /// Availability of one or more domain names.
    DomainCheck {
        /// Names to check.
        names: Vec<String>,
    },
    /// Register a domain.
    DomainCreate(DomainCreate),
    /// Query a domain, including all subordinate hosts.
    DomainInfo {
        /// Domain name.
        name: String,
    },
    /// Extend a registration.
    DomainRenew(DomainRenew),
    /// Request, query, approve, reject or cancel a transfer.
    DomainTransfer(DomainTransfer),
    /// Modify nameservers, statuses, registrant or auth-info.
    DomainUpdate(DomainUpdate),
    /// Delete a domain.
    DomainDelete {
        /// Domain name.
        name: String,
    },
    /// Availability of one or more contact ids.
    ContactCheck {
        /// Ids to check.
        ids: Vec<String>,
    },
    /// Create a contact.
    ContactCreate(ContactCreate),
    /// Query a contact.
    ContactInfo {
        /// Contact id.
        id: String,
    },
    /// Modify a contact.
    ContactUpdate(ContactUpdate),
    /// Delete a contact.
    ContactDelete {
        /// Contact id.
        id: String,
    },
    /// Availability of one or more host names.
    HostCheck {
        /// Names to check.
        names: Vec<String>,
    },
    /// Create a host.
    HostCreate(HostCreate),
    /// Query a host.
    HostInfo {
        /// Host name.
        name: String,
    },
    /// Add or remove host addresses.
    HostUpdate(HostUpdate),
    /// Delete a host.
    HostDelete {
        /// Host name.
        name: String,
    },
}

impl Command {
    /// `{object}-{action}` part of the clTRID (`login` and `logout` stand alone).
    pub fn category(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Logout => "logout",
            Self::DomainCheck { .. } => "domain-check",
            Self::DomainCreate(_) => "domain-create",
            Self::DomainInfo { .. } => "domain-info",
            Self::DomainRenew(_) => "domain-renew",
            Self::DomainTransfer(_) => "domain-transfer",
            Self::DomainUpdate(_) => "domain-update",
            Self::DomainDelete { .. } => "domain-delete",
            Self::ContactCheck { .. } => "contact-check",
            Self::ContactCreate(_) => "contact-create",
            Self::ContactInfo { .. } => "contact-info",
            Self::ContactUpdate(_) => "contact-update",
            Self::ContactDelete { .. } => "contact-delete",
            Self::HostCheck { .. } => "host-check",
            Self::HostCreate(_) => "host-create",
            Self::HostInfo { .. } => "host-info",
            Self::HostUpdate(_) => "host-update",
            Self::HostDelete { .. } => "host-delete",
        }
    }

    /// True for the commands that change authentication state.
    pub fn is_session_control(&self) -> bool {
        matches!(self, Self::Login(_) | Self::Logout)
    }

    /// Copy safe to log: login identifier and password are blanked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        match self {
            Self::Login(login) => Self::Login(Login {
                client_id: String::new(),
                password: String::new(),
                services: login.services.clone(),
            }),
            other => other.clone(),
        }
    }

    /// Render the complete EPP document.
    pub fn to_xml(&self, cltrid: &ClTrid) -> String {
        let command = Element::new("command")
            .child(self.body())
            .child_opt(self.extension().map(|ext| Element::new("extension").child(ext)))
            .child(Element::text_element("clTRID", cltrid.as_str()));

        Element::new("epp").attr("xmlns", ns::EPP).child(command).to_document()
    }

    fn body(&self) -> Element {
        match self {
            Self::Login(login) => login_body(login),
            Self::Logout => Element::new("logout"),

            Self::DomainCheck { names } => verb("check", domain("check").children(names_of("domain:name", names))),
            Self::DomainCreate(create) => verb("create", domain_create(create)),
            Self::DomainInfo { name } => verb(
                "info",
                domain("info").child(Element::text_element("domain:name", name.as_str()).attr("hosts", "all")),
            ),
            Self::DomainRenew(renew) => verb(
                "renew",
                domain("renew")
                    .child(Element::text_element("domain:name", renew.name.as_str()))
                    .child(Element::text_element(
                        "domain:curExpDate",
                        renew.current_expiry.format("%Y-%m-%d").to_string(),
                    ))
                    .child(period("domain:period", renew.period)),
            ),
            Self::DomainTransfer(transfer) => Element::new("transfer")
                .attr("op", transfer.op.as_str())
                .child(domain_transfer(transfer)),
            Self::DomainUpdate(update) => verb("update", domain_update(update)),
            Self::DomainDelete { name } => {
                verb("delete", domain("delete").child(Element::text_element("domain:name", name.as_str())))
            },

            Self::ContactCheck { ids } => verb("check", contact("check").children(names_of("contact:id", ids))),
            Self::ContactCreate(create) => verb("create", contact_create(create)),
            Self::ContactInfo { id } => {
                verb("info", contact("info").child(Element::text_element("contact:id", id.as_str())))
            },
            Self::ContactUpdate(update) => verb("update", contact_update(update)),
            Self::ContactDelete { id } => {
                verb("delete", contact("delete").child(Element::text_element("contact:id", id.as_str())))
            },

            Self::HostCheck { names } => verb("check", host("check").children(names_of("host:name", names))),
            Self::HostCreate(create) => verb(
                "create",
                host("create")
                    .child(Element::text_element("host:name", create.name.as_str()))
                    .children(create.addresses.iter().map(host_addr)),
            ),
            Self::HostInfo { name } => {
                verb("info", host("info").child(Element::text_element("host:name", name.as_str())))
            },
            Self::HostUpdate(update) => verb("update", host_update(update)),
            Self::HostDelete { name } => {
                verb("delete", host("delete").child(Element::text_element("host:name", name.as_str())))
            },
        }
    }

    fn extension(&self) -> Option<Element> {
        match self {
            Self::ContactCreate(create) if !create.extension.is_empty() => Some(
                Element::new("lvcontact:create")
                    .attr("xmlns:lvcontact", ns::REGISTRY_CONTACT_EXT)
                    .text_child_nonempty("lvcontact:regNr", &create.extension.reg_nr)
                    .text_child_nonempty("lvcontact:vatNr", &create.extension.vat_nr),
            ),
            _ => None,
        }
    }
}

fn verb(name: &str, object: Element) -> Element {
    Element::new(name).child(object)
}

fn domain(action: &str) -> Element {
    Element::new(format!("domain:{action}")).attr("xmlns:domain", ns::DOMAIN)
}

fn contact(action: &str) -> Element {
    Element::new(format!("contact:{action}")).attr("xmlns:contact", ns::CONTACT)
}

fn host(action: &str) -> Element {
    Element::new(format!("host:{action}")).attr("xmlns:host", ns::HOST)
}

fn names_of<'a>(tag: &'a str, values: &'a [String]) -> impl Iterator<Item = Element> + 'a {
    values.iter().map(move |v| Element::text_element(tag, v.as_str()))
}

fn period(tag: &str, years: u8) -> Element {
    Element::text_element(tag, years.to_string()).attr("unit", "y")
}

fn auth_info(prefix: &str, password: &str) -> Element {
    Element::new(format!("{prefix}:authInfo")).child(Element::text_element(format!("{prefix}:pw"), password))
}

fn login_body(login: &Login) -> Element {
    let svcs = Element::new("svcs").children(names_of("objURI", &login.services.object_uris));
    let svcs = if login.services.extension_uris.is_empty() {
        svcs
    } else {
        svcs.child(Element::new("svcExtension").children(names_of("extURI", &login.services.extension_uris)))
    };

    Element::new("login")
        .child(Element::text_element("clID", login.client_id.as_str()))
        .child(Element::new("pw").cdata(login.password.as_str()))
        .child(
            Element::new("options")
                .child(Element::text_element("version", "1.0"))
                .child(Element::text_element("lang", "en")),
        )
        .child(svcs)
}

fn domain_create(create: &DomainCreate) -> Element {
    let ns_block = (!create.nameservers.is_empty()).then(|| {
        Element::new("domain:ns").children(
            create
                .nameservers
                .iter()
                .map(|host| Element::new("domain:hostAttr").child(Element::text_element("domain:hostName", host.as_str()))),
        )
    });

    domain("create")
        .child(Element::text_element("domain:name", create.name.as_str()))
        .child(period("domain:period", create.period))
        .child_opt(ns_block)
        .child(Element::text_element("domain:registrant", create.registrant.as_str()))
        .children(create.contacts.iter().map(domain_contact))
        .child(auth_info("domain", &create.auth_info))
}

fn domain_contact(contact: &DomainContact) -> Element {
    Element::text_element("domain:contact", contact.id.as_str()).attr("type", contact.role.as_str())
}

fn domain_transfer(transfer: &DomainTransfer) -> Element {
    domain("transfer")
        .child(Element::text_element("domain:name", transfer.name.as_str()))
        .child_opt(transfer.period.map(|years| period("domain:period", years)))
        .child_opt(transfer.auth_info.as_deref().map(|pw| auth_info("domain", pw)))
}

fn domain_update(update: &DomainUpdate) -> Element {
    let block = |tag: &str, values: &UpdateBlock| {
        if values.is_empty() {
            return None;
        }
        let ns_block = (!values.nameservers.is_empty())
            .then(|| Element::new("domain:ns").children(names_of("domain:hostObj", &values.nameservers)));
        Some(
            Element::new(tag)
                .child_opt(ns_block)
                .children(values.statuses.iter().map(|s| Element::new("domain:status").attr("s", s.as_str()))),
        )
    };

    let chg = (!update.chg.is_empty()).then(|| {
        Element::new("domain:chg")
            .child_opt(
                update.chg.registrant.as_deref().map(|r| Element::text_element("domain:registrant", r)),
            )
            .child_opt(update.chg.auth_info.as_deref().map(|pw| auth_info("domain", pw)))
    });

    domain("update")
        .child(Element::text_element("domain:name", update.name.as_str()))
        .child_opt(block("domain:add", &update.add))
        .child_opt(block("domain:rem", &update.rem))
        .child_opt(chg)
}

fn postal_info(postal: &PostalInfo) -> Element {
    let addr = Element::new("contact:addr")
        .children(
            postal
                .street
                .iter()
                .filter(|line| !line.is_empty())
                .take(3)
                .map(|line| Element::text_element("contact:street", line.as_str())),
        )
        .text_child_nonempty("contact:city", &postal.city)
        .text_child_nonempty("contact:sp", &postal.sp)
        .text_child_nonempty("contact:pc", &postal.pc)
        .text_child_nonempty("contact:cc", &postal.cc);

    Element::new("contact:postalInfo")
        .attr("type", "loc")
        .text_child_nonempty("contact:name", &postal.name)
        .text_child_nonempty("contact:org", &postal.org)
        .child(addr)
}

fn contact_create(create: &ContactCreate) -> Element {
    contact("create")
        .child(Element::text_element("contact:id", create.id.as_str()))
        .child(postal_info(&create.postal))
        .text_child_nonempty("contact:voice", &create.voice)
        .text_child_nonempty("contact:fax", &create.fax)
        .text_child_nonempty("contact:email", &create.email)
        .child(auth_info("contact", &create.auth_info))
}

fn contact_update(update: &ContactUpdate) -> Element {
    let chg = &update.chg;
    let disclose = chg.disclose.map(|flag| {
        Element::new("contact:disclose")
            .attr("flag", if flag { "1" } else { "0" })
            .child(Element::new("contact:name").attr("type", "int"))
            .child(Element::new("contact:addr").attr("type", "int"))
            .child(Element::new("contact:voice"))
            .child(Element::new("contact:fax"))
            .child(Element::new("contact:email"))
    });

    let chg = Element::new("contact:chg")
        .child_opt(chg.postal.as_ref().map(postal_info))
        .text_child_opt("contact:voice", chg.voice.as_deref())
        .text_child_opt("contact:fax", chg.fax.as_deref())
        .text_child_opt("contact:email", chg.email.as_deref())
        .child_opt(disclose);

    contact("update")
        .child(Element::text_element("contact:id", update.id.as_str()))
        .child_opt((!chg.is_empty()).then_some(chg))
}

fn host_addr(addr: &IpAddr) -> Element {
    let version = if addr.is_ipv4() { "v4" } else { "v6" };
    Element::text_element("host:addr", addr.to_string()).attr("ip", version)
}

fn host_update(update: &HostUpdate) -> Element {
    let block = |tag: &str, addrs: &[IpAddr]| {
        (!addrs.is_empty()).then(|| Element::new(tag).children(addrs.iter().map(host_addr)))
    };

    host("update")
        .child(Element::text_element("host:name", update.name.as_str()))
        .child_opt(block("host:add", &update.add))
        .child_opt(block("host:rem", &update.rem))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{types::ContactRole, xml::XmlNode};

    fn trid(category: &str) -> ClTrid {
        ClTrid::new("ABC", category, 1)
    }

    fn sample_contact(name: &str) -> ContactCreate {
        ContactCreate {
            id: "C1".to_string(),
            postal: PostalInfo {
                name: name.to_string(),
                org: String::new(),
                street: vec!["Main 1".to_string(), String::new()],
                city: "Riga".to_string(),
                sp: String::new(),
                pc: "LV-1050".to_string(),
                cc: "LV".to_string(),
            },
            voice: "+371.1234567".to_string(),
            fax: String::new(),
            email: "a@example.lv".to_string(),
            auth_info: "Aa1!Aa1!Aa1!Aa1!".to_string(),
            extension: ContactExtension::default(),
        }
    }

    #[test]
    fn cltrid_format() {
        let id = ClTrid::new("REG", Command::Logout.category(), 1_717_000_000_123);
        assert_eq!(id.as_str(), "REG-logout-1717000000123");
        let check = Command::DomainCheck { names: vec![] };
        assert_eq!(ClTrid::new("REG", check.category(), 7).as_str(), "REG-domain-check-7");
    }

    #[test]
    fn logout_document() {
        insta::assert_snapshot!(Command::Logout.to_xml(&trid("logout")), @r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><command><logout/><clTRID>ABC-logout-1</clTRID></command></epp>"#);
    }

    #[test]
    fn login_document() {
        let login = Command::Login(Login {
            client_id: "reg".to_string(),
            password: "p&ss]]>w".to_string(),
            services: Services::default(),
        });
        insta::assert_snapshot!(login.to_xml(&trid("login")), @r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><command><login><clID>reg</clID><pw><![CDATA[p&ss]]]]><![CDATA[>w]]></pw><options><version>1.0</version><lang>en</lang></options><svcs><objURI>urn:ietf:params:xml:ns:domain-1.0</objURI><objURI>urn:ietf:params:xml:ns:contact-1.0</objURI><objURI>urn:ietf:params:xml:ns:host-1.0</objURI><svcExtension><extURI>http://www.nic.lv/epp/schema/lvdomain-ext-1.0</extURI><extURI>http://www.nic.lv/epp/schema/lvcontact-ext-1.0</extURI><extURI>urn:ietf:params:xml:ns:secDNS-1.1</extURI></svcExtension></svcs></login><clTRID>ABC-login-1</clTRID></command></epp>"#);
    }

    #[test]
    fn login_password_survives_parse() {
        let login = Command::Login(Login {
            client_id: "reg".to_string(),
            password: "a]]>b<c&d".to_string(),
            services: Services::default(),
        });
        let root = XmlNode::parse(login.to_xml(&trid("login")).as_bytes()).unwrap();
        let pw = root.child("command").unwrap().child("login").unwrap().child("pw").unwrap();
        assert_eq!(pw.text, "a]]>b<c&d");
    }

    #[test]
    fn redacted_login_blanks_credentials() {
        let login = Command::Login(Login {
            client_id: "secret-id".to_string(),
            password: "secret-pw".to_string(),
            services: Services::default(),
        });
        let xml = login.redacted().to_xml(&trid("login"));

        assert!(!xml.contains("secret-id"));
        assert!(!xml.contains("secret-pw"));
        assert!(xml.contains("<clID></clID>"));
        assert!(xml.contains("<objURI>urn:ietf:params:xml:ns:domain-1.0</objURI>"));
    }

    #[test]
    fn login_debug_hides_password() {
        let login = Login {
            client_id: "reg".to_string(),
            password: "hunter2".to_string(),
            services: Services::default(),
        };
        let debug = format!("{login:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted 7 bytes>"));
    }

    #[test]
    fn domain_update_with_add_and_rem() {
        let update = Command::DomainUpdate(DomainUpdate {
            name: "example.lv".to_string(),
            add: UpdateBlock { nameservers: vec!["ns3.example.com".to_string()], statuses: vec![] },
            rem: UpdateBlock {
                nameservers: vec!["ns1.example.com".to_string()],
                statuses: vec![DomainStatus::ClientHold],
            },
            chg: DomainChange::default(),
        });
        insta::assert_snapshot!(update.to_xml(&trid("domain-update")), @r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><command><update><domain:update xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"><domain:name>example.lv</domain:name><domain:add><domain:ns><domain:hostObj>ns3.example.com</domain:hostObj></domain:ns></domain:add><domain:rem><domain:ns><domain:hostObj>ns1.example.com</domain:hostObj></domain:ns><domain:status s="clientHold"/></domain:rem></domain:update></update><clTRID>ABC-domain-update-1</clTRID></command></epp>"#);
    }

    #[test]
    fn empty_update_blocks_are_omitted() {
        let update = Command::DomainUpdate(DomainUpdate {
            name: "example.lv".to_string(),
            add: UpdateBlock { nameservers: vec![], statuses: vec![DomainStatus::ClientDeleteProhibited] },
            ..DomainUpdate::default()
        });
        let xml = update.to_xml(&trid("domain-update"));

        assert!(xml.contains("<domain:add><domain:status s=\"clientDeleteProhibited\"/></domain:add>"));
        assert!(!xml.contains("domain:rem"));
        assert!(!xml.contains("domain:chg"));
        assert!(!xml.contains("domain:ns"));
    }

    #[test]
    fn domain_create_sends_host_attributes() {
        let create = Command::DomainCreate(DomainCreate {
            name: "example.lv".to_string(),
            period: 2,
            nameservers: vec!["ns1.example.com".to_string(), "ns2.example.com".to_string()],
            registrant: "R1".to_string(),
            contacts: vec![DomainContact::new(ContactRole::Admin, "A1")],
            auth_info: "pw".to_string(),
        });
        insta::assert_snapshot!(create.to_xml(&trid("domain-create")), @r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><command><create><domain:create xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"><domain:name>example.lv</domain:name><domain:period unit="y">2</domain:period><domain:ns><domain:hostAttr><domain:hostName>ns1.example.com</domain:hostName></domain:hostAttr><domain:hostAttr><domain:hostName>ns2.example.com</domain:hostName></domain:hostAttr></domain:ns><domain:registrant>R1</domain:registrant><domain:contact type="admin">A1</domain:contact><domain:authInfo><domain:pw>pw</domain:pw></domain:authInfo></domain:create></create><clTRID>ABC-domain-create-1</clTRID></command></epp>"#);
    }

    #[test]
    fn domain_create_without_nameservers_omits_ns() {
        let create = Command::DomainCreate(DomainCreate {
            name: "example.lv".to_string(),
            period: 1,
            nameservers: vec![],
            registrant: "R1".to_string(),
            contacts: vec![
                DomainContact::new(ContactRole::Admin, "R1"),
                DomainContact::new(ContactRole::Tech, "__DEFAULT__"),
            ],
            auth_info: "pw".to_string(),
        });
        let xml = create.to_xml(&trid("domain-create"));

        assert!(!xml.contains("domain:ns"));
        assert!(xml.contains("<domain:period unit=\"y\">1</domain:period>"));
        assert!(xml.contains(
            "<domain:contact type=\"admin\">R1</domain:contact><domain:contact type=\"tech\">__DEFAULT__</domain:contact>"
        ));
        assert!(xml.contains("<domain:authInfo><domain:pw>pw</domain:pw></domain:authInfo>"));
    }

    #[test]
    fn renew_uses_date_only() {
        let renew = Command::DomainRenew(DomainRenew {
            name: "example.lv".to_string(),
            current_expiry: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            period: 2,
        });
        let xml = renew.to_xml(&trid("domain-renew"));
        assert!(xml.contains("<domain:curExpDate>2025-06-01</domain:curExpDate>"));
        assert!(xml.contains("<domain:period unit=\"y\">2</domain:period>"));
    }

    #[test]
    fn transfer_query_has_op_and_no_auth() {
        let transfer = Command::DomainTransfer(DomainTransfer {
            name: "example.lv".to_string(),
            op: TransferOp::Query,
            period: None,
            auth_info: None,
        });
        let xml = transfer.to_xml(&trid("domain-transfer"));
        assert!(xml.contains("<transfer op=\"query\"><domain:transfer"));
        assert!(!xml.contains("authInfo"));
    }

    #[test]
    fn contact_create_omits_empty_fields() {
        let xml = Command::ContactCreate(sample_contact("Jane")).to_xml(&trid("contact-create"));

        assert!(!xml.contains("contact:org"));
        assert!(!xml.contains("contact:sp"));
        assert!(!xml.contains("contact:fax"));
        assert!(!xml.contains("<extension>"));
        assert_eq!(xml.matches("<contact:street>").count(), 1);
        assert!(xml.contains("<contact:postalInfo type=\"loc\"><contact:name>Jane</contact:name>"));
    }

    #[test]
    fn contact_create_extension() {
        let mut create = sample_contact("Jane");
        create.extension = ContactExtension { reg_nr: "40003000000".to_string(), vat_nr: String::new() };
        let xml = Command::ContactCreate(create).to_xml(&trid("contact-create"));

        assert!(xml.contains(
            "<extension><lvcontact:create xmlns:lvcontact=\"http://www.nic.lv/epp/schema/lvcontact-ext-1.0\"><lvcontact:regNr>40003000000</lvcontact:regNr></lvcontact:create></extension><clTRID>"
        ));
    }

    #[test]
    fn disclose_update_document() {
        let update = Command::ContactUpdate(ContactUpdate {
            id: "C1".to_string(),
            chg: ContactChange { disclose: Some(false), ..ContactChange::default() },
        });
        insta::assert_snapshot!(update.to_xml(&trid("contact-update")), @r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><command><update><contact:update xmlns:contact="urn:ietf:params:xml:ns:contact-1.0"><contact:id>C1</contact:id><contact:chg><contact:disclose flag="0"><contact:name type="int"/><contact:addr type="int"/><contact:voice/><contact:fax/><contact:email/></contact:disclose></contact:chg></contact:update></update><clTRID>ABC-contact-update-1</clTRID></command></epp>"#);
    }

    #[test]
    fn host_address_versions() {
        let create = Command::HostCreate(HostCreate {
            name: "ns1.example.lv".to_string(),
            addresses: vec!["192.0.2.1".parse().unwrap(), "2001:db8::1".parse().unwrap()],
        });
        let xml = create.to_xml(&trid("host-create"));
        assert!(xml.contains("<host:addr ip=\"v4\">192.0.2.1</host:addr>"));
        assert!(xml.contains("<host:addr ip=\"v6\">2001:db8::1</host:addr>"));
    }

    #[test]
    fn host_update_add_then_rem() {
        let update = Command::HostUpdate(HostUpdate {
            name: "ns1.example.lv".to_string(),
            add: vec!["192.0.2.2".parse().unwrap()],
            rem: vec!["192.0.2.1".parse().unwrap()],
        });
        let xml = update.to_xml(&trid("host-update"));
        assert!(xml.contains(
            "<host:add><host:addr ip=\"v4\">192.0.2.2</host:addr></host:add><host:rem><host:addr ip=\"v4\">192.0.2.1</host:addr></host:rem>"
        ));
    }

    #[test]
    fn hostile_contact_fields_are_escaped() {
        let hostile = "</contact:name><contact:id>X</contact:id>&";
        let xml = Command::ContactCreate(sample_contact(hostile)).to_xml(&trid("contact-create"));

        assert!(!xml.contains(hostile));
        assert!(xml.contains("&lt;/contact:name&gt;&lt;contact:id&gt;X&lt;/contact:id&gt;&amp;"));
        let root = XmlNode::parse(xml.as_bytes()).unwrap();
        let create = root.child("command").unwrap().child("create").unwrap().child("create").unwrap();
        assert_eq!(create.children_named("id").count(), 1);
    }

    proptest! {
        #[test]
        fn caller_values_survive_round_trip(
            name in "[a-zA-Z0-9<>&'\" ]{1,40}",
            city in "[a-zA-Z0-9<>&'\" ]{1,40}",
        ) {
            let mut create = sample_contact(&name);
            create.postal.city = city.clone();
            let xml = Command::ContactCreate(create).to_xml(&trid("contact-create"));

            let root = XmlNode::parse(xml.as_bytes()).unwrap();
            let postal = root
                .child("command").unwrap()
                .child("create").unwrap()
                .child("create").unwrap()
                .child("postalInfo").unwrap();
            prop_assert_eq!(postal.child("name").unwrap().text(), name.trim());
            prop_assert_eq!(postal.child("addr").unwrap().child("city").unwrap().text(), city.trim());
        }
    }
}
