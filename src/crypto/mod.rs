//! Cryptographic primitives for the token vault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - SHA-256 and Argon2id passphrase key derivation (`kdf`)
//! - The zeroizing `VaultKey` wrapper (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

pub use encryption::{decrypt, encrypt, NONCE_LEN, TAG_LEN};
pub use kdf::{
    derive_key, derive_key_with_params, generate_salt, Argon2Params, KdfChoice, KeyDerivation,
};
pub use keys::VaultKey;
