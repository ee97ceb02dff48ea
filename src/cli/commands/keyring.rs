//! `nuc configure keyring`: keep the vault passphrase in the OS keyring.
//!
//! Without the `keyring-store` feature the command reports how to enable it.

use crate::cli::output;
use crate::cli::Cli;
use crate::errors::Result;

/// Save the passphrase (after proving it opens the token file) or delete it.
pub fn execute(cli: &Cli, delete: bool) -> Result<()> {
    #[cfg(feature = "keyring-store")]
    {
        let dir = crate::cli::data_dir(cli)?;
        let settings = crate::config::Settings::load(&dir)?;
        let vault = crate::vault::TokenVault::from_settings(&dir, &settings);
        let vault_id = vault.path().to_string_lossy().to_string();

        if delete {
            crate::keyring::delete_passphrase(&vault_id)?;
            output::success("Passphrase removed from OS keyring.");
        } else {
            // Skip the keyring lookup: the user is setting the value.
            let passphrase = crate::cli::prompt_passphrase(None)?;
            vault.unlock(passphrase.as_bytes())?;

            crate::keyring::store_passphrase(&vault_id, &passphrase)?;
            output::success("Passphrase saved to OS keyring. Future commands will unlock automatically.");
        }

        Ok(())
    }

    #[cfg(not(feature = "keyring-store"))]
    {
        let _ = (cli, delete);
        output::tip("Rebuild with `cargo build --features keyring-store` to enable it.");
        Err(crate::errors::NucError::KeyringError(
            "keyring support not compiled in".into(),
        ))
    }
}
