//! `nuc completions <shell>`: print a completion script to stdout.
//!
//!   nuc completions bash > ~/.local/share/bash-completion/completions/nuc
//!   nuc completions zsh > "${fpath[1]}/_nuc"

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;
use crate::errors::Result;

/// Name the scripts complete; matches the installed binary.
const BIN_NAME: &str = "nuc";

pub fn execute(shell: Shell) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_script(shell, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Render the script for `shell` into `out`.
fn write_script<W: Write>(shell: Shell, out: &mut W) -> Result<()> {
    tracing::debug!(%shell, "generating completions");
    clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_script(shell, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bash_script_knows_nested_subcommands() {
        let bash = script(Shell::Bash);
        assert!(bash.contains("nuc"));
        assert!(bash.contains("set-url"));
        assert!(bash.contains("restart"));
    }

    #[test]
    fn every_supported_shell_renders() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            assert!(!script(shell).is_empty(), "{shell} produced nothing");
        }
    }
}
