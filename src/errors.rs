use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in nuc.
#[derive(Debug, Error)]
pub enum NucError {
    // --- Vault errors ---
    #[error("No stored credentials at {0}")]
    NotFound(PathBuf),

    #[error("Malformed token file: {0}")]
    Format(String),

    #[error("Decryption failed: wrong passphrase or corrupted token file")]
    Authentication,

    #[error("Token bundle could not be decoded: {0}")]
    Decode(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    #[error("API URL is not configured")]
    NotConfigured,

    // --- Session errors ---
    #[error("Token has expired. Please authenticate again.")]
    TokenExpired,

    // --- Network errors ---
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    // --- Keyring errors ---
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Passphrase must be at least {0} characters")]
    PassphraseTooShort(usize),
}

impl NucError {
    /// A follow-up suggestion printed under the error, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotConfigured => Some("Use `nuc configure set-url <api-url>` to set the API URL."),
            Self::NotFound(_) | Self::TokenExpired => {
                Some("Run `nuc configure auth` to authenticate.")
            }
            Self::Format(_) | Self::Decode(_) => {
                Some("The token file looks corrupted. Run `nuc configure auth` to replace it.")
            }
            Self::Authentication => {
                Some("Check the vault passphrase, or run `nuc configure auth` to start over.")
            }
            _ => None,
        }
    }
}

/// Convenience type alias for nuc results.
pub type Result<T> = std::result::Result<T, NucError>;
