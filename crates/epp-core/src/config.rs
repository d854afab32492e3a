//! Endpoint configuration.
//!
//! Deserializable from TOML (or any serde format). Secrets are redacted
//! from `Debug` output so a config can be logged safely.

use std::{fmt, path::PathBuf, time::Duration};

use epp_proto::{DEFAULT_MAX_FRAME, Services};
use serde::Deserialize;

use crate::error::EppError;

/// Default EPP port assigned by IANA.
pub const DEFAULT_PORT: u16 = 700;

/// Default TCP connect + TLS handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Contact id registries treat as "use the registrar default".
pub const DEFAULT_CONTACT_SENTINEL: &str = "__DEFAULT__";

/// Everything needed to reach and authenticate against one registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Registry host name or address.
    pub host: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connect + handshake timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// TLS parameters.
    #[serde(default)]
    pub tls: TlsOptions,
    /// Login credential.
    pub credential: Credential,
    /// Registrar prefix used in transaction ids.
    pub registrar_prefix: String,
    /// Namespaces declared at login.
    #[serde(default)]
    pub services: ServiceUris,
    /// Role contact policy for domain registration.
    #[serde(default)]
    pub contacts: ContactPolicy,
    /// Largest inbound payload accepted, in bytes.
    #[serde(default = "default_max_frame")]
    pub max_frame: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_secs()
}

fn default_max_frame() -> usize {
    DEFAULT_MAX_FRAME
}

impl EndpointConfig {
    /// Config with defaults for everything but the identity of the endpoint.
    pub fn new(host: impl Into<String>, credential: Credential, registrar_prefix: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout_secs: default_timeout_secs(),
            tls: TlsOptions::default(),
            credential,
            registrar_prefix: registrar_prefix.into(),
            services: ServiceUris::default(),
            contacts: ContactPolicy::default(),
            max_frame: DEFAULT_MAX_FRAME,
        }
    }

    /// Connect + handshake timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check local preconditions. Nothing is sent over the wire.
    pub fn validate(&self) -> Result<(), EppError> {
        if self.host.trim().is_empty() {
            return Err(EppError::config("host must not be empty"));
        }
        if self.port == 0 {
            return Err(EppError::config("port must not be 0"));
        }
        if self.credential.client_id.is_empty() {
            return Err(EppError::config("credential.client_id must not be empty"));
        }
        if self.credential.password.is_empty() {
            return Err(EppError::config("credential.password must not be empty"));
        }
        if self.registrar_prefix.is_empty() {
            return Err(EppError::config("registrar_prefix must not be empty"));
        }
        if self.services.objects.is_empty() {
            return Err(EppError::config("services.objects must declare at least one object URI"));
        }
        if self.tls.private_key.is_some() && self.tls.client_cert.is_none() {
            return Err(EppError::config("tls.private_key given without tls.client_cert"));
        }
        Ok(())
    }
}

/// Protocol versions offered during the handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsVersion {
    /// TLS 1.2 and 1.3.
    #[default]
    Any,
    /// TLS 1.3 only.
    Tls13,
}

/// TLS parameters supplied at connect time.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlsOptions {
    /// PEM client certificate chain.
    pub client_cert: Option<PathBuf>,
    /// PEM private key. Read from `client_cert` when absent.
    pub private_key: Option<PathBuf>,
    /// Passphrase for an encrypted PKCS#8 key.
    pub passphrase: Option<String>,
    /// PEM trust anchors replacing the bundled web roots.
    pub ca_file: Option<PathBuf>,
    /// Verify the registry certificate. Turning this off still encrypts.
    pub verify_peer: bool,
    /// Offered protocol versions.
    pub tls_version: TlsVersion,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            client_cert: None,
            private_key: None,
            passphrase: None,
            ca_file: None,
            verify_peer: true,
            tls_version: TlsVersion::Any,
        }
    }
}

impl fmt::Debug for TlsOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsOptions")
            .field("client_cert", &self.client_cert)
            .field("private_key", &self.private_key)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("ca_file", &self.ca_file)
            .field("verify_peer", &self.verify_peer)
            .field("tls_version", &self.tls_version)
            .finish()
    }
}

/// Registrar login credential.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credential {
    /// Client identifier (`clID`).
    pub client_id: String,
    /// Password.
    pub password: String,
}

impl Credential {
    /// Build a credential.
    pub fn new(client_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), password: password.into() }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("password", &format_args!("<redacted {} bytes>", self.password.len()))
            .finish()
    }
}

/// Namespaces declared at login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceUris {
    /// Object URIs.
    pub objects: Vec<String>,
    /// Extension URIs.
    pub extensions: Vec<String>,
}

impl Default for ServiceUris {
    fn default() -> Self {
        let services = Services::default();
        Self { objects: services.object_uris, extensions: services.extension_uris }
    }
}

impl From<&ServiceUris> for Services {
    fn from(uris: &ServiceUris) -> Self {
        Self { object_uris: uris.objects.clone(), extension_uris: uris.extensions.clone() }
    }
}

/// What to put in a role slot the caller left empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleFallback {
    /// Send this id, which the registry maps to its own default contact.
    Sentinel(String),
    /// Leave the role out of the create command.
    Omit,
}

impl Default for RoleFallback {
    fn default() -> Self {
        Self::Sentinel(DEFAULT_CONTACT_SENTINEL.to_string())
    }
}

impl RoleFallback {
    /// Contact id to send, if any.
    pub fn contact_id(&self) -> Option<&str> {
        match self {
            Self::Sentinel(id) => Some(id.as_str()),
            Self::Omit => None,
        }
    }
}

/// Fallbacks for technical and billing roles at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactPolicy {
    /// Technical role.
    pub tech: RoleFallback,
    /// Billing role.
    pub billing: RoleFallback,
}
