//! XML namespace URIs.

/// EPP core (RFC 5730).
pub const EPP: &str = "urn:ietf:params:xml:ns:epp-1.0";

/// Domain mapping (RFC 5731).
pub const DOMAIN: &str = "urn:ietf:params:xml:ns:domain-1.0";

/// Host mapping (RFC 5732).
pub const HOST: &str = "urn:ietf:params:xml:ns:host-1.0";

/// Contact mapping (RFC 5733).
pub const CONTACT: &str = "urn:ietf:params:xml:ns:contact-1.0";

/// DNSSEC extension (RFC 5910).
pub const SEC_DNS: &str = "urn:ietf:params:xml:ns:secDNS-1.1";

/// Registry domain extension declared at login by default.
pub const REGISTRY_DOMAIN_EXT: &str = "http://www.nic.lv/epp/schema/lvdomain-ext-1.0";

/// Registry contact extension carrying registration and VAT numbers.
pub const REGISTRY_CONTACT_EXT: &str = "http://www.nic.lv/epp/schema/lvcontact-ext-1.0";
