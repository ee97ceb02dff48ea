//! `nuc shell`: interactive reverse shell over WebSocket.

use crate::cli::{data_dir, output, Cli};
use crate::config::Settings;
use crate::errors::Result;

pub fn execute(cli: &Cli, url: Option<&str>) -> Result<()> {
    let settings = Settings::load(&data_dir(cli)?)?;
    let url = crate::shell::resolve_url(url, &settings)?;

    output::info(&format!("Connecting to {url} (type `exit` to leave)"));
    crate::shell::run(&url)?;
    output::info("Shell session closed.");
    Ok(())
}
