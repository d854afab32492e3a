//! Subcommands, one per registrar flow.

use std::{collections::BTreeMap, net::IpAddr, path::PathBuf};

use clap::{Subcommand, ValueEnum};
use epp_client::{ContactDetails, LockState, Registrar, RegistrationRequest, RoleLabel};
use epp_core::{Connector, Environment};
use serde_json::{Value, json};

use crate::{error::CliError, files};

/// Registrar operation to run.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a domain from a request file (TOML or JSON)
    Register {
        /// Registration request file
        request: PathBuf,
    },

    /// Renew a domain from its current expiry date
    Renew {
        /// Domain name
        domain: String,
        /// Years to add
        #[arg(short, long, default_value = "1")]
        period: u8,
    },

    /// Request an incoming transfer
    Transfer {
        /// Domain name
        domain: String,
        /// Transfer secret from the losing registrar
        #[arg(long)]
        auth_code: String,
        /// Years to add on completion
        #[arg(short, long)]
        period: Option<u8>,
    },

    /// Poll a pending incoming transfer
    TransferSync {
        /// Domain name
        domain: String,
    },

    /// List delegated nameservers
    Nameservers {
        /// Domain name
        domain: String,
    },

    /// Replace the delegation with the given nameservers
    SaveNameservers {
        /// Domain name
        domain: String,
        /// Nameservers, in order
        nameservers: Vec<String>,
    },

    /// Show the registrar lock
    LockStatus {
        /// Domain name
        domain: String,
    },

    /// Prohibit transfer and delete
    Lock {
        /// Domain name
        domain: String,
    },

    /// Lift the transfer and delete prohibitions
    Unlock {
        /// Domain name
        domain: String,
    },

    /// Show every contact on a domain, by role
    Contacts {
        /// Domain name
        domain: String,
    },

    /// Update contacts from a file keyed by role (TOML or JSON)
    SaveContacts {
        /// Domain name
        domain: String,
        /// Contact details file
        details: PathBuf,
    },

    /// Hide or publish contact data in WHOIS
    IdProtection {
        /// Domain name
        domain: String,
        /// Desired state
        state: Toggle,
    },

    /// Show the domain transfer secret
    AuthCode {
        /// Domain name
        domain: String,
    },

    /// Create a glue nameserver
    RegisterNs {
        /// Host name
        name: String,
        /// IPv4 or IPv6 address
        address: IpAddr,
    },

    /// Replace a glue nameserver address
    ModifyNs {
        /// Host name
        name: String,
        /// Address to remove
        current: IpAddr,
        /// Address to add
        new: IpAddr,
    },

    /// Delete a glue nameserver
    DeleteNs {
        /// Host name
        name: String,
    },

    /// Delete a domain
    Delete {
        /// Domain name
        domain: String,
    },

    /// Check expiry against the registry
    Sync {
        /// Domain name
        domain: String,
    },
}

/// On/off switch.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Enabled
    On,
    /// Disabled
    Off,
}

impl Command {
    /// Run against `registrar` and render the result.
    pub fn run<C: Connector, E: Environment>(&self, registrar: &Registrar<C, E>) -> Result<Value, CliError> {
        let value = match self {
            Self::Register { request } => {
                let request: RegistrationRequest = files::load_request(request)?;
                serde_json::to_value(registrar.register_domain(&request)?)?
            },
            Self::Renew { domain, period } => serde_json::to_value(registrar.renew_domain(domain, *period)?)?,
            Self::Transfer { domain, auth_code, period } => {
                serde_json::to_value(registrar.transfer_domain(domain, auth_code, *period)?)?
            },
            Self::TransferSync { domain } => serde_json::to_value(registrar.transfer_sync(domain)?)?,
            Self::Nameservers { domain } => json!({ "nameservers": registrar.nameservers(domain)? }),
            Self::SaveNameservers { domain, nameservers } => {
                serde_json::to_value(registrar.save_nameservers(domain, nameservers)?)?
            },
            Self::LockStatus { domain } => json!({ "lock": registrar.registrar_lock(domain)? }),
            Self::Lock { domain } => serde_json::to_value(registrar.set_registrar_lock(domain, LockState::Locked)?)?,
            Self::Unlock { domain } => {
                serde_json::to_value(registrar.set_registrar_lock(domain, LockState::Unlocked)?)?
            },
            Self::Contacts { domain } => serde_json::to_value(registrar.contact_details(domain)?)?,
            Self::SaveContacts { domain, details } => {
                let details: BTreeMap<RoleLabel, ContactDetails> = files::load_request(details)?;
                json!({ "updated": registrar.save_contact_details(domain, &details)? })
            },
            Self::IdProtection { domain, state } => {
                json!({ "updated": registrar.set_id_protection(domain, *state == Toggle::On)? })
            },
            Self::AuthCode { domain } => json!({ "auth_code": registrar.auth_code(domain)? }),
            Self::RegisterNs { name, address } => {
                registrar.register_nameserver(name, *address)?;
                json!({ "nameserver": name, "address": address })
            },
            Self::ModifyNs { name, current, new } => {
                registrar.modify_nameserver(name, *current, *new)?;
                json!({ "nameserver": name, "address": new })
            },
            Self::DeleteNs { name } => {
                registrar.delete_nameserver(name)?;
                json!({ "deleted": name })
            },
            Self::Delete { domain } => {
                registrar.request_delete(domain)?;
                json!({ "deleted": domain })
            },
            Self::Sync { domain } => serde_json::to_value(registrar.sync(domain)?)?,
        };
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use chrono::{TimeZone, Utc};
    use epp_core::{Credential, EndpointConfig, EppError};
    use epp_harness::{LoopbackConnector, MockContact, MockDomain, MockRegistry, SimEnv};

    use super::*;

    fn registrar(registry: &MockRegistry) -> Registrar<LoopbackConnector, SimEnv> {
        let config = EndpointConfig::new("registry.test", Credential::new("REG", "pw"), "CLI");
        Registrar::new(LoopbackConnector::new(registry.clone()), config, SimEnv::new())
    }

    fn seeded() -> MockRegistry {
        let registry = MockRegistry::new("REG", "pw");
        registry.add_contact(MockContact::new("R1", "Anna Berzina"));
        registry.add_domain(
            MockDomain::new("example.lv", "R1")
                .contact("admin", "R1")
                .nameservers(["ns1.host.lv", "ns2.host.lv"])
                .auth_info("Secr3t!"),
        );
        registry
    }

    #[test]
    fn nameservers_listed_in_order() {
        let registry = seeded();
        let out = Command::Nameservers { domain: "example.lv".into() }.run(&registrar(&registry)).unwrap();
        assert_eq!(out, json!({ "nameservers": ["ns1.host.lv", "ns2.host.lv"] }));
    }

    #[test]
    fn lock_reports_changes_then_state() {
        let registry = seeded();
        let registrar = registrar(&registry);

        let out = Command::Lock { domain: "example.lv".into() }.run(&registrar).unwrap();
        assert_eq!(out["removed"], json!([]));
        assert_eq!(out["added"].as_array().unwrap().len(), 2);

        let out = Command::LockStatus { domain: "example.lv".into() }.run(&registrar).unwrap();
        assert_eq!(out, json!({ "lock": "locked" }));
    }

    #[test]
    fn auth_code_and_sync() {
        let registry = seeded();
        registry.add_domain(MockDomain::new("dated.lv", "R1").dates(
            Some(Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap()),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()),
        ));
        let registrar = registrar(&registry);

        let out = Command::AuthCode { domain: "example.lv".into() }.run(&registrar).unwrap();
        assert_eq!(out, json!({ "auth_code": "Secr3t!" }));

        let out = Command::Sync { domain: "dated.lv".into() }.run(&registrar).unwrap();
        assert_eq!(out, json!({ "expiry_date": "2026-03-01", "state": "active" }));
    }

    #[test]
    fn id_protection_hides_every_contact() {
        let registry = seeded();
        let out = Command::IdProtection { domain: "example.lv".into(), state: Toggle::On }
            .run(&registrar(&registry))
            .unwrap();
        assert_eq!(out, json!({ "updated": ["R1"] }));
        assert_eq!(registry.contact("R1").unwrap().disclose, Some(false));
    }

    #[test]
    fn nameserver_lifecycle() {
        let registry = seeded();
        let registrar = registrar(&registry);
        let v4: IpAddr = "192.0.2.1".parse().unwrap();
        let v6: IpAddr = "2001:db8::1".parse().unwrap();

        Command::RegisterNs { name: "ns1.example.lv".into(), address: v4 }.run(&registrar).unwrap();
        let out = Command::ModifyNs { name: "ns1.example.lv".into(), current: v4, new: v6 }.run(&registrar).unwrap();
        assert_eq!(out, json!({ "nameserver": "ns1.example.lv", "address": "2001:db8::1" }));
        assert_eq!(registry.host("ns1.example.lv").unwrap().addresses, vec!["2001:db8::1".to_string()]);

        Command::DeleteNs { name: "ns1.example.lv".into() }.run(&registrar).unwrap();
        assert!(registry.host("ns1.example.lv").is_none());
    }

    #[test]
    fn register_reads_request_file() {
        let registry = MockRegistry::new("REG", "pw");
        let mut request = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            request,
            r#"
            domain = "fresh.lv"
            nameservers = ["ns1.host.lv"]

            [registrant]
            first_name = "Anna"
            last_name = "Berzina"
            country = "LV"
            email = "anna@example.lv"
            personal_number = "010190-12345"
            "#
        )
        .unwrap();

        let out = Command::Register { request: request.path().to_path_buf() }.run(&registrar(&registry)).unwrap();
        assert_eq!(out["domain"], "fresh.lv");
        assert_eq!(out["expiry_date"], "2026-01-01");
        assert!(out.get("admin").is_none());
        assert!(registry.domain("fresh.lv").is_some());
    }

    #[test]
    fn registry_failure_passes_through() {
        let registry = seeded();
        let err = Command::Delete { domain: "missing.lv".into() }.run(&registrar(&registry)).unwrap_err();
        assert!(matches!(err, CliError::Epp(EppError::Protocol { .. })));
    }
}
