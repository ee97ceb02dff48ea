//! OS keyring integration for the vault passphrase.
//!
//! Stores and retrieves the passphrase from the operating system's
//! secure credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! Entries are keyed by token file path, so separate data directories keep
//! separate passphrases.  Lookups that fail fall back to a prompt.

use crate::errors::{NucError, Result};

/// Service name used in the OS keyring.
const SERVICE_NAME: &str = "nuc";

fn entry_key(token_path: &str) -> String {
    format!("vault:{token_path}")
}

fn entry(token_path: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(SERVICE_NAME, &entry_key(token_path))
        .map_err(|e| NucError::KeyringError(format!("failed to create keyring entry: {e}")))
}

/// Store the passphrase for a token file.
pub fn store_passphrase(token_path: &str, passphrase: &str) -> Result<()> {
    entry(token_path)?.set_password(passphrase).map_err(|e| {
        NucError::KeyringError(format!("failed to store passphrase in keyring: {e}"))
    })
}

/// Retrieve the passphrase for a token file.
///
/// Returns `None` if nothing is stored (rather than an error).
pub fn get_passphrase(token_path: &str) -> Result<Option<String>> {
    match entry(token_path)?.get_password() {
        Ok(passphrase) => Ok(Some(passphrase)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(NucError::KeyringError(format!(
            "failed to read from keyring: {e}"
        ))),
    }
}

/// Delete the stored passphrase.  Deleting a missing entry succeeds.
pub fn delete_passphrase(token_path: &str) -> Result<()> {
    match entry(token_path)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(NucError::KeyringError(format!(
            "failed to delete from keyring: {e}"
        ))),
    }
}
