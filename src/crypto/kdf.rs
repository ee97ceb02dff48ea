//! Passphrase-to-key derivation.
//!
//! Two derivations are supported:
//!
//! - **SHA-256** of the passphrase bytes.  Fast and unsalted; this is the
//!   derivation older token files were sealed with, so it stays readable.
//! - **Argon2id** with a random per-seal salt.  Memory-hard; parameters and
//!   salt travel inside the sealed file so `open` can repeat them.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::keys::{VaultKey, KEY_LEN};
use crate::errors::{NucError, Result};

/// Length of the Argon2id salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
pub const MIN_MEMORY_KIB: u32 = 8_192;

/// Upper bound on memory cost accepted from a file (1 GB).
pub const MAX_MEMORY_KIB: u32 = 1_048_576;

/// Upper bound on Argon2 passes accepted from a file or config.
pub const MAX_ITERATIONS: u32 = 64;

/// Upper bound on Argon2 lanes.  With `MIN_MEMORY_KIB` this keeps the
/// memory cost at or above the 8 KiB per lane Argon2 requires.
pub const MAX_PARALLELISM: u32 = 255;

/// Configurable Argon2id parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Which derivation new token files are sealed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfChoice {
    #[default]
    Argon2id,
    Sha256,
}

impl KdfChoice {
    /// Build a concrete derivation, generating a fresh salt where needed.
    pub fn fresh(self, params: Argon2Params) -> KeyDerivation {
        match self {
            Self::Sha256 => KeyDerivation::Sha256,
            Self::Argon2id => KeyDerivation::Argon2id {
                salt: generate_salt(),
                params,
            },
        }
    }
}

/// A fully specified derivation: everything needed to turn the same
/// passphrase into the same key again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDerivation {
    Sha256,
    Argon2id {
        salt: [u8; SALT_LEN],
        params: Argon2Params,
    },
}

impl KeyDerivation {
    pub fn derive(&self, passphrase: &[u8]) -> Result<VaultKey> {
        match self {
            Self::Sha256 => Ok(derive_key(passphrase)),
            Self::Argon2id { salt, params } => derive_key_with_params(passphrase, salt, params),
        }
    }

    /// Short name used in logs and `configure show`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Argon2id { .. } => "argon2id",
        }
    }
}

/// Map a passphrase to a 256-bit key with a single SHA-256 pass.
///
/// Deterministic and unsalted: the same passphrase always yields the
/// same key.
pub fn derive_key(passphrase: &[u8]) -> VaultKey {
    let digest = Sha256::digest(passphrase);
    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&digest);
    VaultKey::new(bytes)
}

/// Derive a 32-byte key with explicit Argon2id parameters.
///
/// The same passphrase + salt + params always produce the same key.
/// Rejects parameters below the safe minimum.
pub fn derive_key_with_params(
    passphrase: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<VaultKey> {
    validate_params(argon2_params)?;

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| NucError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut out = [0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase, salt, &mut out)
        .map_err(|e| NucError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;
    let key = VaultKey::new(out);
    out.zeroize();

    Ok(key)
}

/// Check Argon2 parameters against the accepted range.
pub fn validate_params(params: &Argon2Params) -> Result<()> {
    if params.memory_kib < MIN_MEMORY_KIB {
        return Err(NucError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            params.memory_kib
        )));
    }
    if params.memory_kib > MAX_MEMORY_KIB {
        return Err(NucError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at most {MAX_MEMORY_KIB} (got {})",
            params.memory_kib
        )));
    }
    if !(1..=MAX_ITERATIONS).contains(&params.iterations) {
        return Err(NucError::KeyDerivationFailed(format!(
            "Argon2 iterations must be between 1 and {MAX_ITERATIONS} (got {})",
            params.iterations
        )));
    }
    if !(1..=MAX_PARALLELISM).contains(&params.parallelism) {
        return Err(NucError::KeyDerivationFailed(format!(
            "Argon2 parallelism must be between 1 and {MAX_PARALLELISM} (got {})",
            params.parallelism
        )));
    }
    Ok(())
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
