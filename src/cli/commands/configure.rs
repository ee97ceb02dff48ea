//! `nuc configure`: API URL, login, and a look at the current setup.

use chrono::Utc;
use console::style;

use crate::cli::{
    check_passphrase_len, data_dir, output, prompt_login_password, prompt_new_passphrase,
    prompt_username, session, Cli,
};
use crate::config::{DataDir, Settings};
use crate::errors::{NucError, Result};
use crate::vault::TokenVault;

/// Execute `nuc configure set-url <api-url>`.
///
/// Keeps every other setting when a config file already exists.
pub fn execute_set_url(cli: &Cli, api_url: &str) -> Result<()> {
    let dir = data_dir(cli)?;
    let settings = update_api_url(&dir, api_url)?;
    settings.save(&dir)?;

    tracing::debug!(api_url = %settings.api_url, path = %dir.config_path().display(), "saved config");
    output::success("Configuration saved successfully.");
    Ok(())
}

fn update_api_url(dir: &DataDir, api_url: &str) -> Result<Settings> {
    match Settings::load(dir) {
        Ok(mut settings) => {
            settings.api_url = crate::config::settings::normalize_api_url(api_url)?;
            Ok(settings)
        }
        Err(NucError::NotConfigured) => Settings::with_api_url(api_url),
        Err(e) => Err(e),
    }
}

/// Execute `nuc configure auth`: log in and seal the returned tokens.
pub fn execute_auth(cli: &Cli, reuse_password: bool) -> Result<()> {
    let dir = data_dir(cli)?;
    let Some((settings, client)) = session::connect(&dir)? else {
        return Ok(());
    };

    let username = prompt_username()?;
    let password = prompt_login_password()?;

    let passphrase = if reuse_password {
        check_passphrase_len(&password)?;
        password.clone()
    } else {
        prompt_new_passphrase()?
    };

    let vault = TokenVault::from_settings(&dir, &settings);
    let bundle = session::login_and_seal(
        &client,
        &vault,
        &username,
        &password,
        passphrase.as_bytes(),
        Utc::now().timestamp(),
        settings.token_lifetime_secs(),
    )?;

    match bundle.message.as_deref() {
        Some(message) if !message.is_empty() => output::success(message),
        _ => output::success("Authenticated."),
    }
    output::info(&format!(
        "Tokens sealed in {}",
        style(vault.path().display()).cyan()
    ));
    Ok(())
}

/// Execute `nuc configure show`.
pub fn execute_show(cli: &Cli) -> Result<()> {
    let dir = data_dir(cli)?;
    let settings = Settings::load(&dir)?;
    let vault = TokenVault::from_settings(&dir, &settings);

    println!("{:<14}{}", style("Data dir").bold(), dir.root().display());
    println!("{:<14}{}", style("API URL").bold(), settings.api_url);
    println!("{:<14}{}", style("Key deriv.").bold(), kdf_label(&settings));
    println!("{:<14}{} days", style("Token life").bold(), settings.token_lifetime_days);

    if vault.exists() {
        println!("{:<14}{}", style("Token file").bold(), vault.path().display());
    } else {
        println!("{:<14}{}", style("Token file").bold(), style("not authenticated").yellow());
    }
    Ok(())
}

fn kdf_label(settings: &Settings) -> String {
    match settings.kdf {
        crate::crypto::kdf::KdfChoice::Sha256 => "sha256 (legacy layout)".to_string(),
        crate::crypto::kdf::KdfChoice::Argon2id => format!(
            "argon2id (m={} KiB, t={}, p={})",
            settings.argon2_memory_kib, settings.argon2_iterations, settings.argon2_parallelism
        ),
    }
}
