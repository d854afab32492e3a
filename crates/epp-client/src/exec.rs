//! Shared command execution for the object modules.

use epp_core::{Environment, EppError, Session, Transport};
use epp_proto::{CheckItem, Command, ParseError, Response};

/// Execute `command` labelled by its category and extract the payload.
pub(crate) fn run<T, E, R>(
    session: &mut Session<T, E>,
    command: &Command,
    extract: impl FnOnce(Response) -> Result<R, ParseError>,
) -> Result<R, EppError>
where
    T: Transport,
    E: Environment,
{
    let label = command.category();
    let response = session.execute(command, label)?;
    extract(response).map_err(|source| EppError::parse(label, source))
}

/// Execute `command` for its result code only.
pub(crate) fn run_unit<T, E>(session: &mut Session<T, E>, command: &Command) -> Result<(), EppError>
where
    T: Transport,
    E: Environment,
{
    run(session, command, |_| Ok(()))
}

/// The single item of a one-name check, matched by name.
pub(crate) fn single_item(items: Vec<CheckItem>, name: &str) -> Result<CheckItem, EppError> {
    items
        .into_iter()
        .find(|item| item.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| EppError::interpretation(format!("check response does not mention {name}")))
}
