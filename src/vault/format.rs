//! On-disk layout of a sealed token file.
//!
//! Two layouts exist.  The **legacy** layout is what SHA-256-derived
//! files have always looked like:
//!
//! ```text
//! [nonce: 12 bytes][ciphertext + GCM tag]
//! ```
//!
//! The **envelope** layout carries the Argon2id salt and parameters:
//!
//! ```text
//! [NUCV: 4 bytes][version: 1 byte][kdf id: 1 byte]
//! [memory_kib: u32 LE][iterations: u32 LE][parallelism: u32 LE][salt: 32 bytes]
//! [nonce: 12 bytes][ciphertext + GCM tag]
//! ```
//!
//! A buffer that starts with the magic is read as an envelope, anything
//! else as legacy.

use crate::crypto::encryption::NONCE_LEN;
use crate::crypto::kdf::{validate_params, Argon2Params, KeyDerivation, SALT_LEN};
use crate::errors::{NucError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every envelope.
const MAGIC: &[u8; 4] = b"NUCV";

/// Current envelope version.
pub const CURRENT_VERSION: u8 = 1;

/// KDF identifier for Argon2id inside an envelope.
const KDF_ARGON2ID: u8 = 1;

/// 4 (magic) + 1 (version) + 1 (kdf id).
const PREFIX_LEN: usize = 6;

/// 3 x u32 params + salt.
const ARGON2_HEADER_LEN: usize = 12 + SALT_LEN;

// ---------------------------------------------------------------------------
// SealedBlob
// ---------------------------------------------------------------------------

/// An encrypted, authenticated token bundle plus everything needed to
/// re-derive its key from the passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlob {
    /// How the key was derived from the passphrase.
    pub kdf: KeyDerivation,

    /// Fresh random nonce used for this seal.
    pub nonce: [u8; NONCE_LEN],

    /// AES-256-GCM output, tag appended.
    pub ciphertext: Vec<u8>,
}

impl SealedBlob {
    /// Encode the blob in the layout matching its key derivation.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.kdf {
            KeyDerivation::Sha256 => {
                let mut buf = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
                buf.extend_from_slice(&self.nonce);
                buf.extend_from_slice(&self.ciphertext);
                buf
            }
            KeyDerivation::Argon2id { salt, params } => {
                let total = PREFIX_LEN + ARGON2_HEADER_LEN + NONCE_LEN + self.ciphertext.len();
                let mut buf = Vec::with_capacity(total);

                buf.extend_from_slice(MAGIC);
                buf.push(CURRENT_VERSION);
                buf.push(KDF_ARGON2ID);
                buf.extend_from_slice(&params.memory_kib.to_le_bytes());
                buf.extend_from_slice(&params.iterations.to_le_bytes());
                buf.extend_from_slice(&params.parallelism.to_le_bytes());
                buf.extend_from_slice(salt);
                buf.extend_from_slice(&self.nonce);
                buf.extend_from_slice(&self.ciphertext);
                buf
            }
        }
    }

    /// Parse bytes read from disk.
    ///
    /// Fails with `NucError::Format` when the buffer is too short to hold a
    /// nonce or the envelope header is unreadable.  The ciphertext itself is
    /// not inspected; a truncated tag surfaces later as an authentication
    /// failure.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.starts_with(MAGIC) {
            return parse_envelope(data);
        }

        if data.len() < NONCE_LEN {
            return Err(NucError::Format(format!(
                "file is {} bytes, shorter than a {NONCE_LEN}-byte nonce",
                data.len()
            )));
        }

        let (nonce, ciphertext) = split_nonce(data);
        Ok(Self {
            kdf: KeyDerivation::Sha256,
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

fn parse_envelope(data: &[u8]) -> Result<SealedBlob> {
    if data.len() < PREFIX_LEN {
        return Err(NucError::Format("envelope header is truncated".into()));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(NucError::Format(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let kdf_id = data[5];
    if kdf_id != KDF_ARGON2ID {
        return Err(NucError::Format(format!("unknown key derivation id {kdf_id}")));
    }

    let body = &data[PREFIX_LEN..];
    if body.len() < ARGON2_HEADER_LEN + NONCE_LEN {
        return Err(NucError::Format(
            "envelope is shorter than its key derivation header and nonce".into(),
        ));
    }

    let params = Argon2Params {
        memory_kib: read_u32(&body[0..4]),
        iterations: read_u32(&body[4..8]),
        parallelism: read_u32(&body[8..12]),
    };
    // A header that would make `open` fail or run away is corruption.
    validate_params(&params).map_err(|e| {
        NucError::Format(format!(
            "Argon2 parameters out of range (m={}, t={}, p={}): {e}",
            params.memory_kib, params.iterations, params.parallelism
        ))
    })?;

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&body[12..ARGON2_HEADER_LEN]);

    let (nonce, ciphertext) = split_nonce(&body[ARGON2_HEADER_LEN..]);
    Ok(SealedBlob {
        kdf: KeyDerivation::Argon2id { salt, params },
        nonce,
        ciphertext: ciphertext.to_vec(),
    })
}

/// `true` if a legacy blob with this nonce would be read as an envelope.
pub fn nonce_looks_like_envelope(nonce: &[u8; NONCE_LEN]) -> bool {
    nonce.starts_with(MAGIC)
}

/// Split a buffer of at least `NONCE_LEN` bytes into nonce and remainder.
fn split_nonce(data: &[u8]) -> ([u8; NONCE_LEN], &[u8]) {
    let (nonce_bytes, rest) = data.split_at(NONCE_LEN);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(nonce_bytes);
    (nonce, rest)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argon2_blob() -> SealedBlob {
        SealedBlob {
            kdf: KeyDerivation::Argon2id {
                salt: [7u8; SALT_LEN],
                params: Argon2Params {
                    memory_kib: 8_192,
                    iterations: 2,
                    parallelism: 1,
                },
            },
            nonce: [9u8; NONCE_LEN],
            ciphertext: vec![1, 2, 3, 4],
        }
    }

    #[test]
    fn legacy_layout_is_nonce_then_ciphertext() {
        let blob = SealedBlob {
            kdf: KeyDerivation::Sha256,
            nonce: [3u8; NONCE_LEN],
            ciphertext: vec![0xAA, 0xBB],
        };
        let bytes = blob.to_bytes();
        assert_eq!(bytes.len(), NONCE_LEN + 2);
        assert_eq!(&bytes[..NONCE_LEN], &[3u8; NONCE_LEN]);
        assert_eq!(SealedBlob::from_bytes(&bytes).unwrap(), blob);
    }

    #[test]
    fn envelope_layout_starts_with_magic() {
        let blob = argon2_blob();
        let bytes = blob.to_bytes();
        assert_eq!(&bytes[..4], MAGIC);
        assert_eq!(bytes[4], CURRENT_VERSION);
        assert_eq!(SealedBlob::from_bytes(&bytes).unwrap(), blob);
    }

    #[test]
    fn legacy_nonce_with_magic_prefix_is_misread() {
        let mut nonce = [0u8; NONCE_LEN];
        nonce[..4].copy_from_slice(MAGIC);
        assert!(nonce_looks_like_envelope(&nonce));
        assert!(!nonce_looks_like_envelope(&[3u8; NONCE_LEN]));

        let blob = SealedBlob {
            kdf: KeyDerivation::Sha256,
            nonce,
            ciphertext: vec![0u8; 64],
        };
        assert_ne!(SealedBlob::from_bytes(&blob.to_bytes()).ok(), Some(blob));
    }

    #[test]
    fn short_legacy_buffer_is_format_error() {
        for len in 0..NONCE_LEN {
            let result = SealedBlob::from_bytes(&vec![0x10u8; len]);
            assert!(matches!(result, Err(NucError::Format(_))), "len {len}");
        }
    }

    #[test]
    fn nonce_only_legacy_buffer_parses_with_empty_ciphertext() {
        let blob = SealedBlob::from_bytes(&[0x10u8; NONCE_LEN]).unwrap();
        assert!(blob.ciphertext.is_empty());
    }

    #[test]
    fn truncated_envelope_is_format_error() {
        let bytes = argon2_blob().to_bytes();
        for cut in [4, 5, PREFIX_LEN + 10, PREFIX_LEN + ARGON2_HEADER_LEN + 3] {
            let result = SealedBlob::from_bytes(&bytes[..cut]);
            assert!(matches!(result, Err(NucError::Format(_))), "cut {cut}");
        }
    }

    #[test]
    fn unknown_version_is_format_error() {
        let mut bytes = argon2_blob().to_bytes();
        bytes[4] = 9;
        let err = SealedBlob::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("unsupported version"));
    }

    #[test]
    fn unknown_kdf_is_format_error() {
        let mut bytes = argon2_blob().to_bytes();
        bytes[5] = 0;
        assert!(matches!(
            SealedBlob::from_bytes(&bytes),
            Err(NucError::Format(_))
        ));
    }

    fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Vec<u8> {
        let mut bytes = argon2_blob().to_bytes();
        bytes[PREFIX_LEN..PREFIX_LEN + 4].copy_from_slice(&memory_kib.to_le_bytes());
        bytes[PREFIX_LEN + 4..PREFIX_LEN + 8].copy_from_slice(&iterations.to_le_bytes());
        bytes[PREFIX_LEN + 8..PREFIX_LEN + 12].copy_from_slice(&parallelism.to_le_bytes());
        bytes
    }

    #[test]
    fn header_params_outside_accepted_range_are_format_errors() {
        use crate::crypto::kdf::{MAX_ITERATIONS, MAX_PARALLELISM, MIN_MEMORY_KIB};

        for (m, t, p) in [
            (0, 1, 1),
            (MIN_MEMORY_KIB - 1, 1, 1),
            (8_192, 0, 1),
            (8_192, MAX_ITERATIONS + 1, 1),
            (8_192, 1 | (1 << 31), 1),
            (8_192, 1, 0),
            (8_192, 1, MAX_PARALLELISM + 1),
            (8_192, 1, 1 | (1 << 8)),
        ] {
            assert!(
                matches!(
                    SealedBlob::from_bytes(&with_params(m, t, p)),
                    Err(NucError::Format(_))
                ),
                "m={m} t={t} p={p} was accepted"
            );
        }

        assert!(SealedBlob::from_bytes(&with_params(MIN_MEMORY_KIB, MAX_ITERATIONS, MAX_PARALLELISM)).is_ok());
    }

    #[test]
    fn oversized_memory_cost_is_format_error() {
        let mut bytes = argon2_blob().to_bytes();
        bytes[PREFIX_LEN..PREFIX_LEN + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            SealedBlob::from_bytes(&bytes),
            Err(NucError::Format(_))
        ));
    }
}
