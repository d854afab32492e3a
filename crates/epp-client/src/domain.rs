//! Domain object commands (RFC 5731).

use chrono::NaiveDate;
use epp_core::{Environment, EppError, Session, Transport};
use epp_proto::{
    CheckItem, Command, DomainCreate, DomainCreated, DomainInfo, DomainRenew, DomainRenewed, DomainTransfer,
    DomainUpdate, ResData, TransferData, TransferOp,
};

use crate::exec::{run, run_unit, single_item};

/// Upper bound on delegated nameservers.
pub const MAX_NAMESERVERS: usize = 13;

/// Availability of each name, in registry order.
pub fn check<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    names: &[String],
) -> Result<Vec<CheckItem>, EppError> {
    if names.is_empty() {
        return Err(EppError::validation("domain check needs at least one name"));
    }
    run(session, &Command::DomainCheck { names: names.to_vec() }, |r| r.into_domain_check())
}

/// Availability of one name.
pub fn check_one<T: Transport, E: Environment>(session: &mut Session<T, E>, name: &str) -> Result<CheckItem, EppError> {
    let items = check(session, &[name.to_string()])?;
    single_item(items, name)
}

/// Register a domain.
pub fn create<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    create: DomainCreate,
) -> Result<DomainCreated, EppError> {
    if create.nameservers.len() > MAX_NAMESERVERS {
        return Err(EppError::validation(format!(
            "{} nameservers given, at most {MAX_NAMESERVERS} allowed",
            create.nameservers.len()
        )));
    }
    run(session, &Command::DomainCreate(create), |r| r.into_domain_created())
}

/// Full domain info, including subordinate hosts.
pub fn info<T: Transport, E: Environment>(session: &mut Session<T, E>, name: &str) -> Result<DomainInfo, EppError> {
    run(session, &Command::DomainInfo { name: name.to_string() }, |r| r.into_domain_info())
}

/// Extend a registration by `period` years from `current_expiry`.
pub fn renew<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    name: &str,
    current_expiry: NaiveDate,
    period: u8,
) -> Result<DomainRenewed, EppError> {
    let command = Command::DomainRenew(DomainRenew { name: name.to_string(), current_expiry, period });
    run(session, &command, |r| r.into_domain_renewed())
}

/// Any transfer operation. Returns `trnData` when the registry sent it.
pub fn transfer<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    transfer: DomainTransfer,
) -> Result<Option<TransferData>, EppError> {
    run(session, &Command::DomainTransfer(transfer), |r| {
        Ok(match r.res_data {
            Some(ResData::DomainTransfer(data)) => Some(data),
            _ => None,
        })
    })
}

/// Current transfer state. The registry must answer with `trnData`.
pub fn transfer_query<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    name: &str,
) -> Result<TransferData, EppError> {
    let command = Command::DomainTransfer(DomainTransfer {
        name: name.to_string(),
        op: TransferOp::Query,
        period: None,
        auth_info: None,
    });
    run(session, &command, |r| r.into_transfer())
}

/// Apply an update. An update with nothing in it is refused locally.
pub fn update<T: Transport, E: Environment>(session: &mut Session<T, E>, update: DomainUpdate) -> Result<(), EppError> {
    if update.is_empty() {
        return Err(EppError::validation(format!("empty update for {}", update.name)));
    }
    run_unit(session, &Command::DomainUpdate(update))
}

/// Delete a domain.
pub fn delete<T: Transport, E: Environment>(session: &mut Session<T, E>, name: &str) -> Result<(), EppError> {
    run_unit(session, &Command::DomainDelete { name: name.to_string() })
}
