//! Host object commands (RFC 5732).

use std::net::IpAddr;

use epp_core::{Environment, EppError, Session, Transport};
use epp_proto::{CheckItem, Command, HostCreate, HostCreated, HostInfo, HostUpdate};

use crate::exec::{run, run_unit, single_item};

/// Availability of each host name.
pub fn check<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    names: &[String],
) -> Result<Vec<CheckItem>, EppError> {
    if names.is_empty() {
        return Err(EppError::validation("host check needs at least one name"));
    }
    run(session, &Command::HostCheck { names: names.to_vec() }, |r| r.into_host_check())
}

/// Availability of one host name.
pub fn check_one<T: Transport, E: Environment>(session: &mut Session<T, E>, name: &str) -> Result<CheckItem, EppError> {
    let items = check(session, &[name.to_string()])?;
    single_item(items, name)
}

/// Create a host with the given addresses.
pub fn create<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    name: &str,
    addresses: Vec<IpAddr>,
) -> Result<HostCreated, EppError> {
    let command = Command::HostCreate(HostCreate { name: name.to_string(), addresses });
    run(session, &command, |r| r.into_host_created())
}

/// Host info.
pub fn info<T: Transport, E: Environment>(session: &mut Session<T, E>, name: &str) -> Result<HostInfo, EppError> {
    run(session, &Command::HostInfo { name: name.to_string() }, |r| r.into_host_info())
}

/// Add and remove addresses.
pub fn update<T: Transport, E: Environment>(session: &mut Session<T, E>, update: HostUpdate) -> Result<(), EppError> {
    if update.add.is_empty() && update.rem.is_empty() {
        return Err(EppError::validation(format!("empty update for host {}", update.name)));
    }
    run_unit(session, &Command::HostUpdate(update))
}

/// Delete a host.
pub fn delete<T: Transport, E: Environment>(session: &mut Session<T, E>, name: &str) -> Result<(), EppError> {
    run_unit(session, &Command::HostDelete { name: name.to_string() })
}

/// Parse an address literal, reporting the offending text.
pub fn parse_address(text: &str) -> Result<IpAddr, EppError> {
    text.trim().parse().map_err(|_| EppError::validation(format!("invalid IP address {text:?}")))
}
