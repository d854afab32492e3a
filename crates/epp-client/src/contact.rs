//! Contact object commands (RFC 5733).

use epp_core::{Environment, EppError, Session, Transport};
use epp_proto::{CheckItem, Command, ContactChange, ContactCreate, ContactCreated, ContactInfo, ContactUpdate};

use crate::exec::{run, run_unit, single_item};

/// Availability of each id.
pub fn check<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    ids: &[String],
) -> Result<Vec<CheckItem>, EppError> {
    if ids.is_empty() {
        return Err(EppError::validation("contact check needs at least one id"));
    }
    run(session, &Command::ContactCheck { ids: ids.to_vec() }, |r| r.into_contact_check())
}

/// Availability of one id.
pub fn check_one<T: Transport, E: Environment>(session: &mut Session<T, E>, id: &str) -> Result<CheckItem, EppError> {
    let items = check(session, &[id.to_string()])?;
    single_item(items, id)
}

/// Create a contact and return the id the registry stored.
pub fn create<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    create: ContactCreate,
) -> Result<ContactCreated, EppError> {
    run(session, &Command::ContactCreate(create), |r| r.into_contact_created())
}

/// Contact info.
pub fn info<T: Transport, E: Environment>(session: &mut Session<T, E>, id: &str) -> Result<ContactInfo, EppError> {
    run(session, &Command::ContactInfo { id: id.to_string() }, |r| r.into_contact_info())
}

/// Change contact fields.
pub fn update<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    id: &str,
    chg: ContactChange,
) -> Result<(), EppError> {
    if chg == ContactChange::default() {
        return Err(EppError::validation(format!("empty update for contact {id}")));
    }
    run_unit(session, &Command::ContactUpdate(ContactUpdate { id: id.to_string(), chg }))
}

/// Set the WHOIS disclose flag on name, address, voice, fax and email.
pub fn set_disclose<T: Transport, E: Environment>(
    session: &mut Session<T, E>,
    id: &str,
    disclose: bool,
) -> Result<(), EppError> {
    update(session, id, ContactChange { disclose: Some(disclose), ..ContactChange::default() })
}

/// Delete a contact.
pub fn delete<T: Transport, E: Environment>(session: &mut Session<T, E>, id: &str) -> Result<(), EppError> {
    run_unit(session, &Command::ContactDelete { id: id.to_string() })
}
