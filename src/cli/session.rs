//! The authenticated-command preamble and the login flow.
//!
//! Every API command runs the same steps before its request: load
//! settings, check the server is up, unlock the token file, refuse an
//! expired token, and push the expiry forward (sliding renewal).

use chrono::Utc;
use zeroize::Zeroizing;

use super::output;
use super::{data_dir, prompt_passphrase, Cli};
use crate::api::ApiClient;
use crate::config::{DataDir, Settings};
use crate::errors::{NucError, Result};
use crate::vault::{TokenBundle, TokenVault};

/// A ready-to-use API client plus the token to send with it.
pub struct Session {
    pub client: ApiClient,
    pub settings: Settings,
    access_token: Zeroizing<String>,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.access_token
    }
}

/// Load settings and build a client.
///
/// Returns `Ok(None)` after telling the user when the server does not
/// answer `/ping`; callers treat that as a clean exit.
pub fn connect(data_dir: &DataDir) -> Result<Option<(Settings, ApiClient)>> {
    let settings = Settings::load(data_dir)?;
    let client = ApiClient::from_settings(&settings);

    if !client.ping() {
        output::info("API server is offline");
        return Ok(None);
    }

    Ok(Some((settings, client)))
}

/// Run the full preamble for an authenticated command.
pub fn start(cli: &Cli) -> Result<Option<Session>> {
    let dir = data_dir(cli)?;
    let Some((settings, client)) = connect(&dir)? else {
        return Ok(None);
    };

    let vault = TokenVault::from_settings(&dir, &settings);
    if !vault.exists() {
        return Err(NucError::NotFound(vault.path().to_path_buf()));
    }

    let vault_id = vault.path().to_string_lossy().to_string();
    let passphrase = prompt_passphrase(Some(&vault_id))?;

    let bundle = unlock_and_renew(
        &vault,
        passphrase.as_bytes(),
        Utc::now().timestamp(),
        settings.token_lifetime_secs(),
    )?;

    Ok(Some(Session {
        client,
        settings,
        access_token: Zeroizing::new(bundle.access_token),
    }))
}

/// Open the token file, reject an expired token, and re-save it with
/// `expires_at = now + lifetime_secs`.
pub fn unlock_and_renew(
    vault: &TokenVault,
    passphrase: &[u8],
    now: i64,
    lifetime_secs: i64,
) -> Result<TokenBundle> {
    let bundle = vault.unlock(passphrase)?;

    if bundle.is_expired(now) {
        tracing::debug!(expires_at = bundle.expires_at, now, "token expired");
        return Err(NucError::TokenExpired);
    }

    let renewed = bundle.renewed(now.saturating_add(lifetime_secs));
    vault.save(&renewed, passphrase)?;
    tracing::debug!(expires_at = renewed.expires_at, "token expiry renewed");

    Ok(renewed)
}

/// Log in and seal the returned token under `passphrase`.
///
/// A server-provided expiry wins; otherwise the token lives for
/// `lifetime_secs` from `now`.
pub fn login_and_seal(
    client: &ApiClient,
    vault: &TokenVault,
    username: &str,
    password: &str,
    passphrase: &[u8],
    now: i64,
    lifetime_secs: i64,
) -> Result<TokenBundle> {
    let response = client.login(username, password)?;
    if response.access_token.is_empty() {
        return Err(NucError::Api {
            status: 200,
            message: "login response did not include an access token".into(),
        });
    }

    let bundle = response.into_bundle(now.saturating_add(lifetime_secs));
    vault.save(&bundle, passphrase)?;
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::{Argon2Params, KdfChoice};
    use tempfile::TempDir;

    fn sha_vault(dir: &TempDir) -> TokenVault {
        TokenVault::new(
            dir.path().join("data.bin"),
            KdfChoice::Sha256,
            Argon2Params::default(),
        )
    }

    #[test]
    fn renew_slides_expiry_and_persists_it() {
        let dir = TempDir::new().unwrap();
        let vault = sha_vault(&dir);
        vault
            .save(&TokenBundle::new("abc123", 1_000), b"correct-horse")
            .unwrap();

        let renewed = unlock_and_renew(&vault, b"correct-horse", 900, 500).unwrap();
        assert_eq!(renewed.expires_at, 1_400);
        assert_eq!(vault.unlock(b"correct-horse").unwrap().expires_at, 1_400);
    }

    #[test]
    fn renew_refuses_expired_token_and_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let vault = sha_vault(&dir);
        vault
            .save(&TokenBundle::new("abc123", 1_000), b"correct-horse")
            .unwrap();
        let before = std::fs::read(vault.path()).unwrap();

        let result = unlock_and_renew(&vault, b"correct-horse", 1_001, 500);
        assert!(matches!(result, Err(NucError::TokenExpired)));
        assert_eq!(std::fs::read(vault.path()).unwrap(), before);
    }

    #[test]
    fn renew_with_wrong_passphrase_fails_authentication() {
        let dir = TempDir::new().unwrap();
        let vault = sha_vault(&dir);
        vault
            .save(&TokenBundle::new("abc123", 1_000), b"correct-horse")
            .unwrap();

        let result = unlock_and_renew(&vault, b"wrong-horse", 900, 500);
        assert!(matches!(result, Err(NucError::Authentication)));
    }
}
