//! Response Interpreter.
//!
//! [`Response::parse`] turns a payload into result entries plus an optional
//! typed [`ResData`]. Deciding whether a response is a failure is left to
//! the caller through [`Response::failure_message`]; this module only
//! reports what the registry said.

use std::net::IpAddr;

use crate::{
    date::EppDate,
    error::ParseError,
    ns,
    types::{ContactRole, DomainContact, DomainStatus, PostalInfo},
    xml::XmlNode,
};

/// Codes at or above this value denote failure.
pub const FAILURE_THRESHOLD: u16 = 2000;

/// One `<result>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EppResult {
    /// Four-digit result code.
    pub code: u16,
    /// Human-readable message (may be empty).
    pub message: String,
}

impl EppResult {
    /// True when `code >= 2000`.
    pub fn is_failure(&self) -> bool {
        self.code >= FAILURE_THRESHOLD
    }
}

/// Availability of one checked object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem {
    /// Domain name, contact id or host name.
    pub name: String,
    /// True when the object can be provisioned.
    pub available: bool,
    /// Registry-supplied reason when unavailable.
    pub reason: Option<String>,
}

/// `domain:infData`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainInfo {
    /// Domain name.
    pub name: String,
    /// Repository object id.
    pub roid: Option<String>,
    /// Current status flags.
    pub statuses: Vec<DomainStatus>,
    /// Registry-specific status values outside RFC 5731, verbatim.
    pub other_statuses: Vec<String>,
    /// Registrant contact id.
    pub registrant: Option<String>,
    /// Role contacts in document order.
    pub contacts: Vec<DomainContact>,
    /// Delegated nameservers in document order.
    pub nameservers: Vec<String>,
    /// Subordinate hosts.
    pub hosts: Vec<String>,
    /// Sponsoring registrar.
    pub client_id: Option<String>,
    /// Creation date.
    pub created: Option<EppDate>,
    /// Last update date.
    pub updated: Option<EppDate>,
    /// Expiry date.
    pub expires: Option<EppDate>,
    /// Auth-info password (only returned to the sponsor).
    pub auth_info: Option<String>,
}

impl DomainInfo {
    /// Contact ids in registrant, admin, tech, billing order, each once.
    pub fn distinct_contact_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        let roles = ContactRole::ALL
            .iter()
            .flat_map(|role| self.contacts.iter().filter(move |c| c.role == *role));
        for id in self.registrant.as_deref().into_iter().chain(roles.map(|c| c.id.as_str())) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// First contact id for `role`.
    pub fn contact(&self, role: ContactRole) -> Option<&str> {
        self.contacts.iter().find(|c| c.role == role).map(|c| c.id.as_str())
    }
}

/// `domain:creData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCreated {
    /// Domain name.
    pub name: String,
    /// Creation date.
    pub created: Option<EppDate>,
    /// Expiry date.
    pub expires: Option<EppDate>,
}

/// `domain:renData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRenewed {
    /// Domain name.
    pub name: String,
    /// New expiry date.
    pub expires: Option<EppDate>,
}

/// `domain:trnData`.
///
/// `status` is kept verbatim; mapping it to an outcome is a business rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferData {
    /// Domain name.
    pub name: String,
    /// Raw `trStatus` value.
    pub status: String,
    /// Registrar that requested the transfer.
    pub requesting_id: Option<String>,
    /// When the request was made.
    pub requested: Option<EppDate>,
    /// Registrar that must act.
    pub acting_id: Option<String>,
    /// When action is or was due.
    pub acted: Option<EppDate>,
    /// Expiry date after the transfer.
    pub expires: Option<EppDate>,
}

/// `contact:infData`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    /// Contact id.
    pub id: String,
    /// Repository object id.
    pub roid: Option<String>,
    /// Status values.
    pub statuses: Vec<String>,
    /// First postal info block.
    pub postal: PostalInfo,
    /// Phone.
    pub voice: String,
    /// Fax.
    pub fax: String,
    /// Email.
    pub email: String,
    /// Creation date.
    pub created: Option<EppDate>,
    /// Auth-info password.
    pub auth_info: Option<String>,
}

/// `contact:creData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactCreated {
    /// Assigned id.
    pub id: String,
    /// Creation date.
    pub created: Option<EppDate>,
}

/// `host:infData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// Host name.
    pub name: String,
    /// Status values.
    pub statuses: Vec<String>,
    /// Glue addresses.
    pub addresses: Vec<IpAddr>,
}

/// `host:creData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCreated {
    /// Host name.
    pub name: String,
    /// Creation date.
    pub created: Option<EppDate>,
}

/// Typed `<resData>` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResData {
    /// `domain:chkData`.
    DomainCheck(Vec<CheckItem>),
    /// `domain:infData`.
    DomainInfo(DomainInfo),
    /// `domain:creData`.
    DomainCreated(DomainCreated),
    /// `domain:renData`.
    DomainRenewed(DomainRenewed),
    /// `domain:trnData`.
    DomainTransfer(TransferData),
    /// `contact:chkData`.
    ContactCheck(Vec<CheckItem>),
    /// `contact:infData`.
    ContactInfo(ContactInfo),
    /// `contact:creData`.
    ContactCreated(ContactCreated),
    /// `host:chkData`.
    HostCheck(Vec<CheckItem>),
    /// `host:infData`.
    HostInfo(HostInfo),
    /// `host:creData`.
    HostCreated(HostCreated),
}

impl ResData {
    /// Decode the first child of `<resData>`. Unknown payloads yield `None`.
    fn from_node(node: &XmlNode) -> Result<Option<Self>, ParseError> {
        let uri = node.namespace.as_deref().unwrap_or_default();
        let data = match (uri, node.name.as_str()) {
            (ns::DOMAIN, "chkData") => Self::DomainCheck(check_items(node, "name")?),
            (ns::DOMAIN, "infData") => Self::DomainInfo(domain_info(node)?),
            (ns::DOMAIN, "creData") => Self::DomainCreated(DomainCreated {
                name: node.required_text("name")?.to_string(),
                created: optional_date(node, "crDate")?,
                expires: optional_date(node, "exDate")?,
            }),
            (ns::DOMAIN, "renData") => Self::DomainRenewed(DomainRenewed {
                name: node.required_text("name")?.to_string(),
                expires: optional_date(node, "exDate")?,
            }),
            (ns::DOMAIN, "trnData") => Self::DomainTransfer(TransferData {
                name: node.required_text("name")?.to_string(),
                status: node.required_text("trStatus")?.to_string(),
                requesting_id: owned(node.child_text("reID")),
                requested: optional_date(node, "reDate")?,
                acting_id: owned(node.child_text("acID")),
                acted: optional_date(node, "acDate")?,
                expires: optional_date(node, "exDate")?,
            }),
            (ns::CONTACT, "chkData") => Self::ContactCheck(check_items(node, "id")?),
            (ns::CONTACT, "infData") => Self::ContactInfo(contact_info(node)?),
            (ns::CONTACT, "creData") => Self::ContactCreated(ContactCreated {
                id: node.required_text("id")?.to_string(),
                created: optional_date(node, "crDate")?,
            }),
            (ns::HOST, "chkData") => Self::HostCheck(check_items(node, "name")?),
            (ns::HOST, "infData") => Self::HostInfo(host_info(node)?),
            (ns::HOST, "creData") => Self::HostCreated(HostCreated {
                name: node.required_text("name")?.to_string(),
                created: optional_date(node, "crDate")?,
            }),
            _ => return Ok(None),
        };
        Ok(Some(data))
    }
}

/// Parsed `<response>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Result entries in document order. Never empty.
    pub results: Vec<EppResult>,
    /// Typed payload, if the response carried a known one.
    pub res_data: Option<ResData>,
    /// Echoed client transaction id.
    pub cl_trid: Option<String>,
    /// Server transaction id.
    pub sv_trid: Option<String>,
}

impl Response {
    /// Parse a response payload.
    pub fn parse(input: &[u8]) -> Result<Self, ParseError> {
        let root = XmlNode::parse(input)?;
        if !root.is(ns::EPP, "epp") {
            return Err(ParseError::UnexpectedDocument { expected: "response" });
        }
        let response = root.child("response").ok_or(ParseError::UnexpectedDocument { expected: "response" })?;

        let mut results = Vec::new();
        for result in response.children_named("result") {
            let raw = result.required_attribute("code")?;
            let code = raw
                .parse::<u16>()
                .ok()
                .filter(|code| (1000..=2599).contains(code))
                .ok_or_else(|| ParseError::InvalidValue { field: "result code", value: raw.to_string() })?;
            let message = result.child_text("msg").unwrap_or_default().to_string();
            results.push(EppResult { code, message });
        }
        if results.is_empty() {
            return Err(ParseError::MissingElement { parent: "response".to_string(), element: "result" });
        }

        // A failed command's payload is advisory; the result codes decide
        let failed = results.iter().any(EppResult::is_failure);
        let res_data = match response.child("resData").and_then(XmlNode::first_child) {
            Some(node) if failed => ResData::from_node(node).ok().flatten(),
            Some(node) => ResData::from_node(node)?,
            None => None,
        };

        let tr_id = response.child("trID");
        let cl_trid = owned(tr_id.and_then(|t| t.child_text("clTRID")));
        let sv_trid = owned(tr_id.and_then(|t| t.child_text("svTRID")));

        Ok(Self { results, res_data, cl_trid, sv_trid })
    }

    /// True when every result code is below 2000.
    pub fn is_success(&self) -> bool {
        !self.results.iter().any(EppResult::is_failure)
    }

    /// Failing result entries.
    pub fn failures(&self) -> impl Iterator<Item = &EppResult> {
        self.results.iter().filter(|r| r.is_failure())
    }

    /// Every failing message joined with `"; "`, or `None` on success.
    pub fn failure_message(&self) -> Option<String> {
        if self.is_success() {
            return None;
        }
        let messages: Vec<&str> = self.failures().map(|r| r.message.as_str()).collect();
        Some(messages.join("; "))
    }

    /// Codes of every result entry.
    pub fn codes(&self) -> Vec<u16> {
        self.results.iter().map(|r| r.code).collect()
    }

    /// Availability results of a domain check.
    pub fn into_domain_check(self) -> Result<Vec<CheckItem>, ParseError> {
        match self.res_data {
            Some(ResData::DomainCheck(items)) => Ok(items),
            _ => Err(ParseError::UnexpectedPayload { expected: "domain:chkData" }),
        }
    }

    /// Domain info payload.
    pub fn into_domain_info(self) -> Result<DomainInfo, ParseError> {
        match self.res_data {
            Some(ResData::DomainInfo(info)) => Ok(info),
            _ => Err(ParseError::UnexpectedPayload { expected: "domain:infData" }),
        }
    }

    /// Domain create payload.
    pub fn into_domain_created(self) -> Result<DomainCreated, ParseError> {
        match self.res_data {
            Some(ResData::DomainCreated(created)) => Ok(created),
            _ => Err(ParseError::UnexpectedPayload { expected: "domain:creData" }),
        }
    }

    /// Domain renew payload.
    pub fn into_domain_renewed(self) -> Result<DomainRenewed, ParseError> {
        match self.res_data {
            Some(ResData::DomainRenewed(renewed)) => Ok(renewed),
            _ => Err(ParseError::UnexpectedPayload { expected: "domain:renData" }),
        }
    }

    /// Domain transfer payload.
    pub fn into_transfer(self) -> Result<TransferData, ParseError> {
        match self.res_data {
            Some(ResData::DomainTransfer(transfer)) => Ok(transfer),
            _ => Err(ParseError::UnexpectedPayload { expected: "domain:trnData" }),
        }
    }

    /// Availability results of a contact check.
    pub fn into_contact_check(self) -> Result<Vec<CheckItem>, ParseError> {
        match self.res_data {
            Some(ResData::ContactCheck(items)) => Ok(items),
            _ => Err(ParseError::UnexpectedPayload { expected: "contact:chkData" }),
        }
    }

    /// Contact info payload.
    pub fn into_contact_info(self) -> Result<ContactInfo, ParseError> {
        match self.res_data {
            Some(ResData::ContactInfo(info)) => Ok(info),
            _ => Err(ParseError::UnexpectedPayload { expected: "contact:infData" }),
        }
    }

    /// Contact create payload.
    pub fn into_contact_created(self) -> Result<ContactCreated, ParseError> {
        match self.res_data {
            Some(ResData::ContactCreated(created)) => Ok(created),
            _ => Err(ParseError::UnexpectedPayload { expected: "contact:creData" }),
        }
    }

    /// Availability results of a host check.
    pub fn into_host_check(self) -> Result<Vec<CheckItem>, ParseError> {
        match self.res_data {
            Some(ResData::HostCheck(items)) => Ok(items),
            _ => Err(ParseError::UnexpectedPayload { expected: "host:chkData" }),
        }
    }

    /// Host info payload.
    pub fn into_host_info(self) -> Result<HostInfo, ParseError> {
        match self.res_data {
            Some(ResData::HostInfo(info)) => Ok(info),
            _ => Err(ParseError::UnexpectedPayload { expected: "host:infData" }),
        }
    }

    /// Host create payload.
    pub fn into_host_created(self) -> Result<HostCreated, ParseError> {
        match self.res_data {
            Some(ResData::HostCreated(created)) => Ok(created),
            _ => Err(ParseError::UnexpectedPayload { expected: "host:creData" }),
        }
    }
}

/// Server `<greeting>`, sent once on connect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Greeting {
    /// Server name.
    pub server_id: String,
    /// Server clock at connect time.
    pub server_date: Option<EppDate>,
    /// Supported protocol versions.
    pub versions: Vec<String>,
    /// Supported languages.
    pub languages: Vec<String>,
    /// Supported object namespaces.
    pub object_uris: Vec<String>,
    /// Supported extension namespaces.
    pub extension_uris: Vec<String>,
}

impl Greeting {
    /// Parse a greeting payload.
    pub fn parse(input: &[u8]) -> Result<Self, ParseError> {
        let root = XmlNode::parse(input)?;
        if !root.is(ns::EPP, "epp") {
            return Err(ParseError::UnexpectedDocument { expected: "greeting" });
        }
        let greeting = root.child("greeting").ok_or(ParseError::UnexpectedDocument { expected: "greeting" })?;

        let texts = |node: Option<&XmlNode>, name: &str| -> Vec<String> {
            node.map(|n| n.children_named(name).map(|c| c.text().to_string()).collect()).unwrap_or_default()
        };
        let menu = greeting.child("svcMenu");

        Ok(Self {
            server_id: greeting.child_text("svID").unwrap_or_default().to_string(),
            server_date: optional_date(greeting, "svDate")?,
            versions: texts(menu, "version"),
            languages: texts(menu, "lang"),
            object_uris: texts(menu, "objURI"),
            extension_uris: texts(menu.and_then(|m| m.child("svcExtension")), "extURI"),
        })
    }

    /// True when the server announced `uri` as an object or extension.
    pub fn supports(&self, uri: &str) -> bool {
        self.object_uris.iter().chain(&self.extension_uris).any(|u| u == uri)
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn optional_date(node: &XmlNode, name: &str) -> Result<Option<EppDate>, ParseError> {
    node.child_text(name).map(str::parse::<EppDate>).transpose()
}

fn check_items(node: &XmlNode, key: &'static str) -> Result<Vec<CheckItem>, ParseError> {
    node.children_named("cd")
        .map(|cd| {
            let subject = cd.required_child(key)?;
            let avail = subject.required_attribute("avail")?;
            let available = match avail {
                "1" | "true" => true,
                "0" | "false" => false,
                other => {
                    return Err(ParseError::InvalidValue { field: "avail", value: other.to_string() });
                },
            };
            Ok(CheckItem {
                name: subject.text().to_string(),
                available,
                reason: owned(cd.child_text("reason")),
            })
        })
        .collect()
}

fn domain_info(node: &XmlNode) -> Result<DomainInfo, ParseError> {
    let mut statuses = Vec::new();
    let mut other_statuses = Vec::new();
    for status in node.children_named("status") {
        let value = status.required_attribute("s")?;
        match value.parse::<DomainStatus>() {
            Ok(known) => statuses.push(known),
            Err(_) => other_statuses.push(value.to_string()),
        }
    }

    let contacts = node
        .children_named("contact")
        .map(|c| Ok(DomainContact::new(c.required_attribute("type")?.parse()?, c.text())))
        .collect::<Result<Vec<_>, ParseError>>()?;

    let nameservers = node
        .child("ns")
        .map(|ns| {
            ns.children
                .iter()
                .filter_map(|entry| match entry.name.as_str() {
                    "hostObj" => Some(entry.text()),
                    "hostAttr" => entry.child_text("hostName"),
                    _ => None,
                })
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(DomainInfo {
        name: node.required_text("name")?.to_string(),
        roid: owned(node.child_text("roid")),
        statuses,
        other_statuses,
        registrant: owned(node.child_text("registrant")),
        contacts,
        nameservers,
        hosts: node.children_named("host").map(|h| h.text().to_string()).collect(),
        client_id: owned(node.child_text("clID")),
        created: optional_date(node, "crDate")?,
        updated: optional_date(node, "upDate")?,
        expires: optional_date(node, "exDate")?,
        auth_info: owned(node.child("authInfo").and_then(|a| a.child_text("pw"))),
    })
}

fn contact_info(node: &XmlNode) -> Result<ContactInfo, ParseError> {
    let postal = node
        .child("postalInfo")
        .map(|p| {
            let text = |parent: &XmlNode, name: &str| parent.child_text(name).unwrap_or_default().to_string();
            let addr = p.child("addr");
            PostalInfo {
                name: text(p, "name"),
                org: text(p, "org"),
                street: addr
                    .map(|a| a.children_named("street").map(|s| s.text().to_string()).collect())
                    .unwrap_or_default(),
                city: addr.map(|a| text(a, "city")).unwrap_or_default(),
                sp: addr.map(|a| text(a, "sp")).unwrap_or_default(),
                pc: addr.map(|a| text(a, "pc")).unwrap_or_default(),
                cc: addr.map(|a| text(a, "cc")).unwrap_or_default(),
            }
        })
        .unwrap_or_default();

    Ok(ContactInfo {
        id: node.required_text("id")?.to_string(),
        roid: owned(node.child_text("roid")),
        statuses: statuses_of(node)?,
        postal,
        voice: node.child_text("voice").unwrap_or_default().to_string(),
        fax: node.child_text("fax").unwrap_or_default().to_string(),
        email: node.child_text("email").unwrap_or_default().to_string(),
        created: optional_date(node, "crDate")?,
        auth_info: owned(node.child("authInfo").and_then(|a| a.child_text("pw"))),
    })
}

fn host_info(node: &XmlNode) -> Result<HostInfo, ParseError> {
    let addresses = node
        .children_named("addr")
        .map(|a| {
            a.text()
                .parse::<IpAddr>()
                .map_err(|_| ParseError::InvalidValue { field: "host address", value: a.text().to_string() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HostInfo { name: node.required_text("name")?.to_string(), statuses: statuses_of(node)?, addresses })
}

fn statuses_of(node: &XmlNode) -> Result<Vec<String>, ParseError> {
    node.children_named("status").map(|s| Ok(s.required_attribute("s")?.to_string())).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wrap(inner: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><response>{inner}<trID><clTRID>ABC-domain-info-1</clTRID><svTRID>SRV-1</svTRID></trID></response></epp>"#
        )
        .into_bytes()
    }

    #[test]
    fn plain_success() {
        let response =
            Response::parse(&wrap(r#"<result code="1000"><msg>Command completed successfully</msg></result>"#))
                .unwrap();

        assert!(response.is_success());
        assert_eq!(response.failure_message(), None);
        assert_eq!(response.cl_trid.as_deref(), Some("ABC-domain-info-1"));
        assert_eq!(response.sv_trid.as_deref(), Some("SRV-1"));
        assert!(response.res_data.is_none());
    }

    #[test]
    fn informational_codes_are_success() {
        let response = Response::parse(&wrap(
            r#"<result code="1001"><msg>Action pending</msg></result><result code="1301"><msg>Ack to dequeue</msg></result>"#,
        ))
        .unwrap();
        assert!(response.is_success());
        assert_eq!(response.codes(), vec![1001, 1301]);
    }

    #[test]
    fn failing_messages_are_joined() {
        let response = Response::parse(&wrap(
            r#"<result code="2302"><msg>Object exists</msg></result><result code="1000"><msg>ok</msg></result><result code="2005"><msg>Parameter value syntax error</msg></result>"#,
        ))
        .unwrap();

        assert!(!response.is_success());
        assert_eq!(response.failure_message().unwrap(), "Object exists; Parameter value syntax error");
    }

    #[test]
    fn non_xml_is_parse_error() {
        assert!(matches!(Response::parse(b"HTTP/1.1 400 Bad Request"), Err(ParseError::Xml { .. })));
    }

    #[test]
    fn greeting_is_not_a_response() {
        let doc = br#"<epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><greeting><svID>x</svID></greeting></epp>"#;
        assert!(matches!(Response::parse(doc), Err(ParseError::UnexpectedDocument { .. })));
    }

    #[test]
    fn response_without_result_rejected() {
        let err = Response::parse(&wrap("")).unwrap_err();
        assert!(matches!(err, ParseError::MissingElement { element: "result", .. }));
    }

    #[test]
    fn bad_result_code_rejected() {
        let err = Response::parse(&wrap(r#"<result code="abc"><msg>x</msg></result>"#)).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { field: "result code", .. }));
    }

    #[test]
    fn domain_check_with_reason() {
        let response = Response::parse(&wrap(
            r#"<result code="1000"><msg>ok</msg></result><resData><domain:chkData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"><domain:cd><domain:name avail="0">taken.lv</domain:name><domain:reason>In use</domain:reason></domain:cd><domain:cd><domain:name avail="1">free.lv</domain:name></domain:cd></domain:chkData></resData>"#,
        ))
        .unwrap();

        let items = response.into_domain_check().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], CheckItem {
            name: "taken.lv".to_string(),
            available: false,
            reason: Some("In use".to_string()),
        });
        assert!(items[1].available);
        assert_eq!(items[1].reason, None);
    }

    #[test]
    fn domain_info_payload() {
        let response = Response::parse(&wrap(
            r#"<result code="1000"><msg>ok</msg></result><resData><domain:infData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"><domain:name>example.lv</domain:name><domain:roid>EX-1</domain:roid><domain:status s="ok"/><domain:status s="clientTransferProhibited"/><domain:registrant>R1</domain:registrant><domain:contact type="admin">A1</domain:contact><domain:contact type="tech">R1</domain:contact><domain:ns><domain:hostObj>ns1.example.com</domain:hostObj><domain:hostObj>ns2.example.com</domain:hostObj></domain:ns><domain:clID>REG</domain:clID><domain:crDate>2020-06-01T10:00:00.0Z</domain:crDate><domain:exDate>2025-06-01T10:00:00.0Z</domain:exDate><domain:authInfo><domain:pw>s3cret&amp;</domain:pw></domain:authInfo></domain:infData></resData>"#,
        ))
        .unwrap();

        let info = response.into_domain_info().unwrap();
        assert_eq!(info.name, "example.lv");
        assert_eq!(info.statuses, vec![DomainStatus::Ok, DomainStatus::ClientTransferProhibited]);
        assert_eq!(info.nameservers, vec!["ns1.example.com", "ns2.example.com"]);
        assert_eq!(info.contact(ContactRole::Admin), Some("A1"));
        assert_eq!(info.distinct_contact_ids(), vec!["R1", "A1"]);
        assert_eq!(info.expires.unwrap().date_string(), "2025-06-01");
        assert_eq!(info.auth_info.as_deref(), Some("s3cret&"));
    }

    #[test]
    fn host_attr_nameservers_are_read() {
        let response = Response::parse(&wrap(
            r#"<result code="1000"><msg>ok</msg></result><resData><domain:infData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"><domain:name>example.lv</domain:name><domain:ns><domain:hostAttr><domain:hostName>ns1.example.lv</domain:hostName></domain:hostAttr></domain:ns></domain:infData></resData>"#,
        ))
        .unwrap();
        assert_eq!(response.into_domain_info().unwrap().nameservers, vec!["ns1.example.lv"]);
    }

    #[test]
    fn registry_specific_status_kept_aside() {
        let response = Response::parse(&wrap(
            r#"<result code="1000"><msg>ok</msg></result><resData><domain:infData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"><domain:name>example.lv</domain:name><domain:status s="frozen"/><domain:status s="clientTransferProhibited"/></domain:infData></resData>"#,
        ))
        .unwrap();
        let info = response.into_domain_info().unwrap();
        assert_eq!(info.statuses, vec![DomainStatus::ClientTransferProhibited]);
        assert_eq!(info.other_statuses, vec!["frozen".to_string()]);
    }

    #[test]
    fn unreadable_payload_on_failure_keeps_registry_message() {
        let response = Response::parse(&wrap(
            r#"<result code="2304"><msg>Object status prohibits operation</msg></result><resData><domain:infData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"><domain:status s="ok"/></domain:infData></resData>"#,
        ))
        .unwrap();
        assert!(!response.is_success());
        assert!(response.res_data.is_none());
        assert_eq!(response.failure_message().as_deref(), Some("Object status prohibits operation"));
    }

    #[test]
    fn unreadable_payload_on_success_is_parse_error() {
        let err = Response::parse(&wrap(
            r#"<result code="1000"><msg>ok</msg></result><resData><domain:infData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"><domain:status s="ok"/></domain:infData></resData>"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ParseError::MissingElement { .. }));
    }

    #[test]
    fn transfer_payload_keeps_raw_status() {
        let response = Response::parse(&wrap(
            r#"<result code="1000"><msg>ok</msg></result><resData><domain:trnData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"><domain:name>example.lv</domain:name><domain:trStatus>serverApproved</domain:trStatus><domain:reID>NEW</domain:reID><domain:acID>OLD</domain:acID><domain:exDate>2025-06-01T00:00:00Z</domain:exDate></domain:trnData></resData>"#,
        ))
        .unwrap();

        let transfer = response.into_transfer().unwrap();
        assert_eq!(transfer.status, "serverApproved");
        assert_eq!(transfer.requesting_id.as_deref(), Some("NEW"));
        assert_eq!(transfer.expires.unwrap().date_string(), "2025-06-01");
    }

    #[test]
    fn contact_info_payload() {
        let response = Response::parse(&wrap(
            r#"<result code="1000"><msg>ok</msg></result><resData><contact:infData xmlns:contact="urn:ietf:params:xml:ns:contact-1.0"><contact:id>C1</contact:id><contact:status s="ok"/><contact:postalInfo type="loc"><contact:name>Jane Doe</contact:name><contact:addr><contact:street>Main 1</contact:street><contact:street>Apt 2</contact:street><contact:city>Riga</contact:city><contact:cc>LV</contact:cc></contact:addr></contact:postalInfo><contact:voice>+371.1234567</contact:voice><contact:email>jane@example.lv</contact:email></contact:infData></resData>"#,
        ))
        .unwrap();

        let info = response.into_contact_info().unwrap();
        assert_eq!(info.id, "C1");
        assert_eq!(info.postal.street, vec!["Main 1", "Apt 2"]);
        assert_eq!(info.postal.cc, "LV");
        assert_eq!(info.fax, "");
        assert_eq!(info.statuses, vec!["ok"]);
    }

    #[test]
    fn host_info_addresses() {
        let response = Response::parse(&wrap(
            r#"<result code="1000"><msg>ok</msg></result><resData><host:infData xmlns:host="urn:ietf:params:xml:ns:host-1.0"><host:name>ns1.example.lv</host:name><host:addr ip="v4">192.0.2.1</host:addr><host:addr ip="v6">2001:db8::1</host:addr></host:infData></resData>"#,
        ))
        .unwrap();
        let info = response.into_host_info().unwrap();
        assert_eq!(info.addresses.len(), 2);
        assert!(info.addresses[1].is_ipv6());
    }

    #[test]
    fn wrong_payload_accessor() {
        let response = Response::parse(&wrap(r#"<result code="1000"><msg>ok</msg></result>"#)).unwrap();
        assert!(matches!(
            response.into_domain_info(),
            Err(ParseError::UnexpectedPayload { expected: "domain:infData" })
        ));
    }

    #[test]
    fn unknown_payload_is_ignored() {
        let response = Response::parse(&wrap(
            r#"<result code="1000"><msg>ok</msg></result><resData><x:data xmlns:x="urn:example:x"><x:v>1</x:v></x:data></resData>"#,
        ))
        .unwrap();
        assert!(response.res_data.is_none());
    }

    #[test]
    fn greeting_parse() {
        let doc = br#"<?xml version="1.0" encoding="UTF-8"?><epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><greeting><svID>Registry EPP</svID><svDate>2024-01-01T12:00:00.0Z</svDate><svcMenu><version>1.0</version><lang>en</lang><objURI>urn:ietf:params:xml:ns:domain-1.0</objURI><objURI>urn:ietf:params:xml:ns:contact-1.0</objURI><svcExtension><extURI>urn:ietf:params:xml:ns:secDNS-1.1</extURI></svcExtension></svcMenu></greeting></epp>"#;

        let greeting = Greeting::parse(doc).unwrap();
        assert_eq!(greeting.server_id, "Registry EPP");
        assert_eq!(greeting.versions, vec!["1.0"]);
        assert!(greeting.supports(ns::SEC_DNS));
        assert!(!greeting.supports(ns::HOST));
    }
}
