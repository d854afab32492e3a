//! Shared protocol enumerations and value types.

use std::{fmt, str::FromStr};

use crate::error::ParseError;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            /// Wire representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(ParseError::InvalidValue { field: $field, value: other.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Domain status flag (RFC 5731 §2.3).
    pub enum DomainStatus: "domain status" {
        /// No pending operation or prohibition.
        Ok => "ok",
        /// Deleted domain awaiting release.
        Inactive => "inactive",
        /// Registrar-set delete prohibition.
        ClientDeleteProhibited => "clientDeleteProhibited",
        /// Registrar-set hold.
        ClientHold => "clientHold",
        /// Registrar-set renew prohibition.
        ClientRenewProhibited => "clientRenewProhibited",
        /// Registrar-set transfer prohibition.
        ClientTransferProhibited => "clientTransferProhibited",
        /// Registrar-set update prohibition.
        ClientUpdateProhibited => "clientUpdateProhibited",
        /// Create awaiting registry action.
        PendingCreate => "pendingCreate",
        /// Delete awaiting registry action.
        PendingDelete => "pendingDelete",
        /// Renew awaiting registry action.
        PendingRenew => "pendingRenew",
        /// Transfer in progress.
        PendingTransfer => "pendingTransfer",
        /// Update awaiting registry action.
        PendingUpdate => "pendingUpdate",
        /// Registry-set delete prohibition.
        ServerDeleteProhibited => "serverDeleteProhibited",
        /// Registry-set hold.
        ServerHold => "serverHold",
        /// Registry-set renew prohibition.
        ServerRenewProhibited => "serverRenewProhibited",
        /// Registry-set transfer prohibition.
        ServerTransferProhibited => "serverTransferProhibited",
        /// Registry-set update prohibition.
        ServerUpdateProhibited => "serverUpdateProhibited",
    }
}

impl DomainStatus {
    /// Flags a registrar may add or remove with `domain:update`.
    pub fn is_client_settable(self) -> bool {
        self.as_str().starts_with("client")
    }
}

wire_enum! {
    /// Transfer status reported in `trnData` (RFC 5730 §2.9.3.4).
    pub enum TransferStatus: "transfer status" {
        /// Approved by the losing registrar.
        ClientApproved => "clientApproved",
        /// Cancelled by the requesting registrar.
        ClientCancelled => "clientCancelled",
        /// Rejected by the losing registrar.
        ClientRejected => "clientRejected",
        /// Awaiting action.
        Pending => "pending",
        /// Approved by the registry.
        ServerApproved => "serverApproved",
        /// Cancelled by the registry.
        ServerCancelled => "serverCancelled",
    }
}

wire_enum! {
    /// `op` attribute of a `<transfer>` command.
    pub enum TransferOp: "transfer op" {
        /// Start a transfer.
        Request => "request",
        /// Ask for the current transfer state.
        Query => "query",
        /// Approve an incoming transfer.
        Approve => "approve",
        /// Reject an incoming transfer.
        Reject => "reject",
        /// Cancel an outgoing transfer.
        Cancel => "cancel",
    }
}

wire_enum! {
    /// Role of a non-registrant contact on a domain.
    pub enum ContactRole: "contact type" {
        /// Administrative contact.
        Admin => "admin",
        /// Technical contact.
        Tech => "tech",
        /// Billing contact.
        Billing => "billing",
    }
}

/// Contact reference on a domain object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainContact {
    /// Role this contact plays.
    pub role: ContactRole,
    /// Registry contact id.
    pub id: String,
}

impl DomainContact {
    /// Reference `id` in `role`.
    pub fn new(role: ContactRole, id: impl Into<String>) -> Self {
        Self { role, id: id.into() }
    }
}

/// `postalInfo` block of a contact (RFC 5733 §2.3), always sent as `type="loc"`.
///
/// Empty strings mean "absent": the builder omits the matching element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalInfo {
    /// Full name.
    pub name: String,
    /// Organisation.
    pub org: String,
    /// Up to three street lines.
    pub street: Vec<String>,
    /// City.
    pub city: String,
    /// State or province.
    pub sp: String,
    /// Postal code.
    pub pc: String,
    /// Two-letter country code.
    pub cc: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_every_variant() {
        for status in DomainStatus::ALL {
            assert_eq!(status.as_str().parse::<DomainStatus>().unwrap(), *status);
        }
        assert_eq!(DomainStatus::ALL.len(), 17);
    }

    #[test]
    fn unknown_status_rejected() {
        let err = "clientLocked".parse::<DomainStatus>().unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { field: "domain status", .. }));
    }

    #[test]
    fn client_settable_flags() {
        assert!(DomainStatus::ClientTransferProhibited.is_client_settable());
        assert!(!DomainStatus::ServerHold.is_client_settable());
        assert!(!DomainStatus::Ok.is_client_settable());
    }

    #[test]
    fn transfer_status_is_case_sensitive() {
        assert!("serverApproved".parse::<TransferStatus>().is_ok());
        assert!("ServerApproved".parse::<TransferStatus>().is_err());
    }
}
