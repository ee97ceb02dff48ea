//! `nuc system services`: list and control systemd services.

use crate::api::ServiceCommand;
use crate::cli::{output, session, Cli};
use crate::errors::Result;

pub fn execute_list(cli: &Cli) -> Result<()> {
    let Some(session) = session::start(cli)? else {
        return Ok(());
    };

    let listing = session.client.list_units(session.token())?;
    output::print_units_table("services", &listing.services);
    Ok(())
}

/// Start, stop or restart one service.
pub fn execute_command(cli: &Cli, command: ServiceCommand, service: &str) -> Result<()> {
    let Some(session) = session::start(cli)? else {
        return Ok(());
    };

    session.client.service(session.token(), command, service)?;
    output::success(&format!(
        "Service {service} {} successfully.",
        command.past_tense()
    ));
    Ok(())
}
