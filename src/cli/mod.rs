//! CLI module: Clap argument parser, prompts, output helpers, and command
//! implementations.

pub mod commands;
pub mod output;
pub mod session;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::DataDir;
use crate::errors::{NucError, Result};

/// Minimum passphrase length for new vault passphrases.
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Environment variable consulted before prompting for the passphrase.
pub const PASSPHRASE_ENV: &str = "NUC_PASSPHRASE";

/// nuc: command-line client for the nuc system API.
#[derive(Parser)]
#[command(name = "nuc", about = "CLI tool for API interaction", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory for config.json and the sealed token file (default: ~/.nuc/data)
    #[arg(long, env = "NUC_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print diagnostic logs to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Configure the CLI tool
    Configure {
        #[command(subcommand)]
        action: ConfigureAction,
    },

    /// Get the API version
    ApiVersion,

    /// System commands
    System {
        #[command(subcommand)]
        action: SystemAction,
    },

    /// Docker commands
    Docker {
        #[command(subcommand)]
        action: DockerAction,
    },

    /// Open a reverse shell through the WebSocket server
    Shell {
        /// WebSocket URL (default: derived from the API URL, path /ws)
        #[arg(long)]
        url: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// `configure` subcommands.
#[derive(clap::Subcommand)]
pub enum ConfigureAction {
    /// Set the API URL
    SetUrl {
        /// Base URL of the API server (e.g. https://api.example.com)
        api_url: String,
    },

    /// Authenticate and obtain access tokens
    Auth {
        /// Use the login password as the vault passphrase
        #[arg(long)]
        reuse_password: bool,
    },

    /// Show the current configuration
    Show,

    /// Save the vault passphrase to the OS keyring (auto-unlock)
    Keyring {
        /// Remove the passphrase from the keyring instead of saving
        #[arg(long)]
        delete: bool,
    },
}

/// `system` subcommands.
#[derive(clap::Subcommand)]
pub enum SystemAction {
    /// Manage services
    Services {
        #[command(subcommand)]
        action: ServicesAction,
    },

    /// Socket commands
    Sockets {
        #[command(subcommand)]
        action: SocketsAction,
    },
}

/// `system services` subcommands.
#[derive(clap::Subcommand)]
pub enum ServicesAction {
    /// List all services
    List,
    /// Start a specific service
    Start { service: String },
    /// Stop a specific service
    Stop { service: String },
    /// Restart a specific service
    Restart { service: String },
}

/// `system sockets` subcommands.
#[derive(clap::Subcommand)]
pub enum SocketsAction {
    /// List all sockets
    List,
}

/// `docker` subcommands.
#[derive(clap::Subcommand)]
pub enum DockerAction {
    /// List all currently running Docker containers
    Ps,
    /// Start a specific Docker container
    Start { container: String },
    /// Stop a specific Docker container
    Stop { container: String },
    /// Remove a specific Docker image
    Rm {
        image: String,
        /// Force remove the image
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the data directory from `--data-dir` / `NUC_DATA_DIR` / home.
pub fn data_dir(cli: &Cli) -> Result<DataDir> {
    DataDir::resolve(cli.data_dir.as_deref())
}

/// Get the vault passphrase, trying in order:
/// 1. `NUC_PASSPHRASE` env var (scripts and CI)
/// 2. OS keyring (if compiled with `keyring-store` feature)
/// 3. Interactive masked prompt
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn prompt_passphrase(vault_id: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(pw) = passphrase_from_env() {
        return Ok(pw);
    }

    #[cfg(feature = "keyring-store")]
    if let Some(id) = vault_id {
        match crate::keyring::get_passphrase(id) {
            Ok(Some(pw)) => return Ok(Zeroizing::new(pw)),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "keyring lookup failed"),
        }
    }

    #[cfg(not(feature = "keyring-store"))]
    let _ = vault_id;

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault passphrase")
        .interact()
        .map_err(|e| NucError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new passphrase with confirmation (used by `configure auth`).
///
/// Also respects `NUC_PASSPHRASE`.  Enforces a minimum length.
pub fn prompt_new_passphrase() -> Result<Zeroizing<String>> {
    if let Some(pw) = passphrase_from_env() {
        check_passphrase_len(&pw)?;
        return Ok(pw);
    }

    loop {
        let pw = dialoguer::Password::new()
            .with_prompt("Choose vault passphrase")
            .with_confirmation(
                "Confirm vault passphrase",
                "Passphrases do not match, try again",
            )
            .interact()
            .map_err(|e| NucError::CommandFailed(format!("passphrase prompt: {e}")))?;

        if pw.chars().count() < MIN_PASSPHRASE_LEN {
            output::warning(&format!(
                "Passphrase must be at least {MIN_PASSPHRASE_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(pw));
    }
}

/// Prompt for the API login username (echoed).
pub fn prompt_username() -> Result<String> {
    let username: String = dialoguer::Input::new()
        .with_prompt("Enter username")
        .interact_text()
        .map_err(|e| NucError::CommandFailed(format!("username prompt: {e}")))?;
    Ok(username.trim().to_string())
}

/// Prompt for the API login password (masked).
pub fn prompt_login_password() -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt("Enter password")
        .interact()
        .map_err(|e| NucError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

fn passphrase_from_env() -> Option<Zeroizing<String>> {
    match std::env::var(PASSPHRASE_ENV) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

/// Reject passphrases shorter than `MIN_PASSPHRASE_LEN` characters.
pub fn check_passphrase_len(passphrase: &str) -> Result<()> {
    if passphrase.chars().count() < MIN_PASSPHRASE_LEN {
        return Err(NucError::PassphraseTooShort(MIN_PASSPHRASE_LEN));
    }
    Ok(())
}
