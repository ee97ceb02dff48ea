//! `nuc docker`: running containers and images on the server.

use crate::api::ContainerCommand;
use crate::cli::{output, session, Cli};
use crate::errors::Result;

pub fn execute_ps(cli: &Cli) -> Result<()> {
    let Some(session) = session::start(cli)? else {
        return Ok(());
    };

    let containers = session.client.running_containers(session.token())?;
    output::print_containers_table(&containers);
    Ok(())
}

/// Start or stop one container by name or id.
pub fn execute_command(cli: &Cli, command: ContainerCommand, container: &str) -> Result<()> {
    let Some(session) = session::start(cli)? else {
        return Ok(());
    };

    session.client.container(session.token(), command, container)?;
    output::success(&format!(
        "Container {container} {} successfully.",
        command.past_tense()
    ));
    Ok(())
}

pub fn execute_rm(cli: &Cli, image: &str, force: bool) -> Result<()> {
    let Some(session) = session::start(cli)? else {
        return Ok(());
    };

    let message = session.client.remove_image(session.token(), image, force)?;
    if message.is_empty() {
        output::success(&format!("Image {image} removed"));
    } else {
        output::success(&message);
    }
    Ok(())
}
