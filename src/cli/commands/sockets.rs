//! `nuc system sockets list`.

use crate::cli::{output, session, Cli};
use crate::errors::Result;

pub fn execute_list(cli: &Cli) -> Result<()> {
    let Some(session) = session::start(cli)? else {
        return Ok(());
    };

    // Sockets ride along in the same listing as services.
    let listing = session.client.list_units(session.token())?;
    output::print_units_table("sockets", &listing.sockets);
    Ok(())
}
