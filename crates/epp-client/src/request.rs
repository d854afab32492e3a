//! Caller-supplied parameter sets for registrar flows.
//!
//! These are the values a hosting application hands over per call. They
//! are deserializable so the CLI can read them from a file.

use epp_proto::{ContactChange, ContactCreate, ContactExtension, ContactInfo, ContactRole, PostalInfo};
use serde::{Deserialize, Serialize};

/// Registrant as entered by the end customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Registrant {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Organisation name. Non-empty marks an organisation registrant.
    pub company: String,
    /// Up to three street lines.
    pub address: Vec<String>,
    /// City.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Postal code.
    pub postcode: String,
    /// Two-letter country code.
    pub country: String,
    /// Phone in `+CC.NUMBER` form.
    pub phone: String,
    /// Email address.
    pub email: String,
    /// VAT number, sent for organisations and individuals alike.
    pub tax_id: String,
    /// Company registration number (first custom field).
    pub company_number: String,
    /// Personal identity number (second custom field).
    pub personal_number: String,
}

impl Registrant {
    /// True for organisation registrants.
    pub fn is_organisation(&self) -> bool {
        !self.company.trim().is_empty()
    }

    /// Number sent as the registry's `regNr`.
    pub fn registration_number(&self) -> &str {
        if self.is_organisation() { &self.company_number } else { &self.personal_number }
    }

    /// `first last`, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim()).trim().to_string()
    }

    /// Contact create for `role`.
    ///
    /// The administrative contact of an organisation is the person behind
    /// it, so it carries no organisation, registration or VAT number.
    pub fn contact_create(&self, role: ProvisionedRole, id: String, auth_info: String) -> ContactCreate {
        let personal = role == ProvisionedRole::Admin;
        let postal = PostalInfo {
            name: self.full_name(),
            org: if personal { String::new() } else { self.company.trim().to_string() },
            street: self.address.iter().take(3).cloned().collect(),
            city: self.city.clone(),
            sp: self.state.clone(),
            pc: self.postcode.clone(),
            cc: self.country.clone(),
        };
        let extension = if personal {
            ContactExtension::default()
        } else {
            ContactExtension { reg_nr: self.registration_number().to_string(), vat_nr: self.tax_id.clone() }
        };

        ContactCreate {
            id,
            postal,
            voice: self.phone.clone(),
            fax: String::new(),
            email: self.email.clone(),
            auth_info,
            extension,
        }
    }
}

/// Contacts created during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionedRole {
    /// Domain holder.
    Registrant,
    /// Separate administrative contact of an organisation.
    Admin,
}

/// Parameters of `register_domain`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrationRequest {
    /// Domain to register.
    pub domain: String,
    /// Registration period in years.
    pub period: u8,
    /// Nameservers, blank entries ignored.
    pub nameservers: Vec<String>,
    /// Holder details.
    pub registrant: Registrant,
    /// Existing technical contact id. Falls back to the endpoint policy.
    pub tech_contact: Option<String>,
    /// Existing billing contact id. Falls back to the endpoint policy.
    pub billing_contact: Option<String>,
}

impl Default for RegistrationRequest {
    fn default() -> Self {
        Self {
            domain: String::new(),
            period: 1,
            nameservers: Vec::new(),
            registrant: Registrant::default(),
            tech_contact: None,
            billing_contact: None,
        }
    }
}

/// Role names shown to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoleLabel {
    /// `domain:registrant`.
    Registrant,
    /// `admin` contact.
    Administrator,
    /// `tech` contact.
    Technical,
    /// `billing` contact.
    Billing,
}

impl From<ContactRole> for RoleLabel {
    fn from(role: ContactRole) -> Self {
        match role {
            ContactRole::Admin => Self::Administrator,
            ContactRole::Tech => Self::Technical,
            ContactRole::Billing => Self::Billing,
        }
    }
}

/// Editable contact fields, read by `contact_details` and written by
/// `save_contact_details`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactDetails {
    /// Full name.
    pub name: String,
    /// Organisation.
    pub organization: String,
    /// Street lines, at most three.
    pub street: Vec<String>,
    /// City.
    pub city: String,
    /// State or province.
    pub state_province: String,
    /// Postal code.
    pub postal_code: String,
    /// Country code.
    pub country_code: String,
    /// Phone.
    pub phone: String,
    /// Fax.
    pub fax: String,
    /// Email.
    pub email: String,
}

impl From<ContactInfo> for ContactDetails {
    fn from(info: ContactInfo) -> Self {
        let postal = info.postal;
        Self {
            name: postal.name,
            organization: postal.org,
            street: postal.street,
            city: postal.city,
            state_province: postal.sp,
            postal_code: postal.pc,
            country_code: postal.cc,
            phone: info.voice,
            fax: info.fax,
            email: info.email,
        }
    }
}

impl ContactDetails {
    /// `contact:chg` replacing postal info, phone, fax and email.
    pub fn to_change(&self) -> ContactChange {
        ContactChange {
            postal: Some(PostalInfo {
                name: self.name.clone(),
                org: self.organization.clone(),
                street: self.street.iter().take(3).cloned().collect(),
                city: self.city.clone(),
                sp: self.state_province.clone(),
                pc: self.postal_code.clone(),
                cc: self.country_code.clone(),
            }),
            voice: Some(self.phone.clone()),
            fax: Some(self.fax.clone()),
            email: Some(self.email.clone()),
            disclose: None,
        }
    }
}
