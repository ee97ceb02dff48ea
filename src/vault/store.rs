//! Sealing, opening, and persisting token bundles.
//!
//! The free functions are the building blocks; `TokenVault` binds them to
//! one file path and one key-derivation policy for use by CLI commands.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use zeroize::Zeroize;

use crate::config::paths::{write_private, DataDir};
use crate::config::Settings;
use crate::crypto::encryption::{decrypt, encrypt, NONCE_LEN};
use crate::crypto::kdf::{Argon2Params, KdfChoice, KeyDerivation};
use crate::errors::{NucError, Result};

use super::bundle::{self, TokenBundle};
use super::format::{nonce_looks_like_envelope, SealedBlob};

/// Seal a bundle under a passphrase using the SHA-256 derivation.
///
/// This produces the legacy layout that every existing token file uses.
pub fn seal(bundle: &TokenBundle, passphrase: &[u8]) -> Result<SealedBlob> {
    seal_with(bundle, passphrase, KeyDerivation::Sha256)
}

/// Seal a bundle under a passphrase with an explicit key derivation.
///
/// Pure: nothing is written to disk.  Every call draws a fresh nonce, so
/// sealing the same bundle twice never yields the same blob.
pub fn seal_with(bundle: &TokenBundle, passphrase: &[u8], kdf: KeyDerivation) -> Result<SealedBlob> {
    let mut plaintext = bundle::serialize(bundle)?;
    let key = kdf.derive(passphrase)?;

    let sealed = encrypt_unambiguous(&kdf, || encrypt(key.as_bytes(), &plaintext));
    plaintext.zeroize();
    let (nonce, ciphertext) = sealed?;

    Ok(SealedBlob {
        kdf,
        nonce,
        ciphertext,
    })
}

/// Run `encrypt_once` until its nonce cannot be mistaken for the envelope
/// magic in the legacy layout.
fn encrypt_unambiguous<F>(kdf: &KeyDerivation, mut encrypt_once: F) -> Result<([u8; NONCE_LEN], Vec<u8>)>
where
    F: FnMut() -> Result<([u8; NONCE_LEN], Vec<u8>)>,
{
    loop {
        let (nonce, ciphertext) = encrypt_once()?;
        if matches!(kdf, KeyDerivation::Sha256) && nonce_looks_like_envelope(&nonce) {
            tracing::debug!("legacy nonce starts with envelope magic, redrawing");
            continue;
        }
        return Ok((nonce, ciphertext));
    }
}

/// Recover the bundle from a blob.
///
/// A wrong passphrase and a tampered blob both fail with
/// `NucError::Authentication`.  A blob that authenticates but does not hold
/// a bundle fails with `NucError::Decode`.
pub fn open(blob: &SealedBlob, passphrase: &[u8]) -> Result<TokenBundle> {
    let key = blob.kdf.derive(passphrase)?;
    let mut plaintext = decrypt(key.as_bytes(), &blob.nonce, &blob.ciphertext)?;
    drop(key);

    let result = bundle::deserialize(&plaintext);
    plaintext.zeroize();
    result
}

/// Write a blob to `path`, replacing whatever was there.
///
/// The parent directory is created 0700 and the file is written 0600 via
/// temp-file + rename, so a failed write leaves the previous file intact.
pub fn persist(blob: &SealedBlob, path: &Path) -> Result<()> {
    write_private(path, &blob.to_bytes())?;
    tracing::debug!(path = %path.display(), kdf = blob.kdf.name(), "persisted sealed token file");
    Ok(())
}

/// Read a blob from `path`.
///
/// A missing file is `NucError::NotFound` (not yet authenticated); an
/// unreadable layout is `NucError::Format`.
pub fn load(path: &Path) -> Result<SealedBlob> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(NucError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(NucError::Io(e)),
    };

    let blob = SealedBlob::from_bytes(&data)?;
    tracing::debug!(path = %path.display(), kdf = blob.kdf.name(), "loaded sealed token file");
    Ok(blob)
}

/// A token file at a fixed path, sealed with a configured derivation.
#[derive(Debug, Clone)]
pub struct TokenVault {
    path: PathBuf,
    kdf: KdfChoice,
    argon2: Argon2Params,
}

impl TokenVault {
    pub fn new(path: impl Into<PathBuf>, kdf: KdfChoice, argon2: Argon2Params) -> Self {
        Self {
            path: path.into(),
            kdf,
            argon2,
        }
    }

    /// The vault for a data directory, using the derivation from settings.
    pub fn from_settings(data_dir: &DataDir, settings: &Settings) -> Self {
        Self::new(data_dir.token_path(), settings.kdf, settings.argon2_params())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` if a token file is present (it may still fail to open).
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Seal `bundle` with a freshly salted derivation and persist it.
    ///
    /// Always writes the configured layout, so a legacy file is upgraded the
    /// first time it is re-saved under an Argon2id configuration.
    pub fn save(&self, bundle: &TokenBundle, passphrase: &[u8]) -> Result<()> {
        let blob = seal_with(bundle, passphrase, self.kdf.fresh(self.argon2))?;
        persist(&blob, &self.path)
    }

    /// Load and open the token file, whichever layout it uses.
    pub fn unlock(&self, passphrase: &[u8]) -> Result<TokenBundle> {
        let blob = load(&self.path)?;
        open(&blob, passphrase)
    }
}
