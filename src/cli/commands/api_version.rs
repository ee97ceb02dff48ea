//! `nuc api-version`: show the server's version and the logged-in user.

use crate::api::VersionInfo;
use crate::cli::{session, Cli};
use crate::errors::Result;

pub fn execute(cli: &Cli) -> Result<()> {
    let Some(session) = session::start(cli)? else {
        return Ok(());
    };

    let info = session.client.version(session.token())?;
    for line in render(&info) {
        println!("{line}");
    }
    Ok(())
}

fn render(info: &VersionInfo) -> Vec<String> {
    let mut lines = vec![format!("API Version: {}", info.version)];
    if let Some(user) = &info.user {
        lines.push(format!("User: {user}"));
    }
    lines
}
