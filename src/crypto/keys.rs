//! In-memory key material.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a vault key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A 32-byte symmetric key that zeroes its memory when dropped.
///
/// Every key derivation path returns one of these so the raw bytes never
/// outlive the seal or open call that needed them.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build a cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKey(<redacted>)")
    }
}
