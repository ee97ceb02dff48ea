use std::path::Path;

use serde::{Deserialize, Serialize};

use super::paths::{write_private, DataDir};
use crate::crypto::kdf::{validate_params, Argon2Params, KdfChoice};
use crate::errors::{NucError, Result};

/// Client configuration, stored as `config.json` in the data directory.
///
/// Only `api_url` is required; every other field has a default so a file
/// written by older clients (`{"api_url": "..."}`) loads unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the API server, without a trailing slash.
    pub api_url: String,

    /// Key derivation used when sealing new token files.
    #[serde(default)]
    pub kdf: KdfChoice,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// How far each login or authenticated command pushes the token expiry.
    #[serde(default = "default_token_lifetime_days")]
    pub token_lifetime_days: i64,

    /// Timeout for a whole HTTP request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// WebSocket endpoint for `nuc shell`; derived from `api_url` if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_url: Option<String>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_token_lifetime_days() -> i64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    30
}

// ── Implementation ───────────────────────────────────────────────────

impl Settings {
    /// Settings for `api_url` with every other field at its default.
    ///
    /// The URL is normalized and validated first.
    pub fn with_api_url(api_url: &str) -> Result<Self> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            kdf: KdfChoice::default(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            token_lifetime_days: default_token_lifetime_days(),
            request_timeout_secs: default_request_timeout_secs(),
            shell_url: None,
        })
    }

    /// Load `config.json` from the data directory.
    ///
    /// A missing file means the client was never configured.
    pub fn load(data_dir: &DataDir) -> Result<Self> {
        Self::load_from(&data_dir.config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NucError::NotConfigured);
            }
            Err(e) => return Err(NucError::Io(e)),
        };

        let mut settings: Settings = serde_json::from_str(&contents).map_err(|e| {
            NucError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;
        settings.validate().map_err(|e| {
            NucError::ConfigError(format!("Invalid settings in {}: {e}", path.display()))
        })?;

        Ok(settings)
    }

    /// Normalize `api_url` and reject values no command can work with.
    fn validate(&mut self) -> Result<()> {
        self.api_url = normalize_api_url(&self.api_url)?;

        if self.token_lifetime_days <= 0 {
            return Err(NucError::ConfigError(format!(
                "token_lifetime_days must be positive (got {})",
                self.token_lifetime_days
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(NucError::ConfigError(
                "request_timeout_secs must be positive".into(),
            ));
        }
        if self.kdf == KdfChoice::Argon2id {
            validate_params(&self.argon2_params())?;
        }
        Ok(())
    }

    /// Write `config.json` (0600) into the data directory.
    pub fn save(&self, data_dir: &DataDir) -> Result<()> {
        let contents = serde_json::to_vec_pretty(self)
            .map_err(|e| NucError::ConfigError(format!("Failed to encode settings: {e}")))?;
        write_private(&data_dir.config_path(), &contents)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Token lifetime in seconds.
    pub fn token_lifetime_secs(&self) -> i64 {
        self.token_lifetime_days.saturating_mul(24 * 60 * 60)
    }
}

/// Trim whitespace and a trailing slash, and require an http(s) scheme.
pub fn normalize_api_url(raw: &str) -> Result<String> {
    let url = raw.trim().trim_end_matches('/');

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| {
            NucError::ConfigError(format!(
                "API URL '{raw}' must start with http:// or https://"
            ))
        })?;

    if rest.is_empty() {
        return Err(NucError::ConfigError(format!(
            "API URL '{raw}' has no host"
        )));
    }

    Ok(url.to_string())
}

// ── Tests ────────────────────────────────────────────────────────────
