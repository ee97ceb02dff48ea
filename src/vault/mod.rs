//! Vault module: the locally stored, passphrase-protected token bundle.
//!
//! This module provides:
//! - `TokenBundle` and its byte codec (`bundle`)
//! - The sealed file layouts (`format`)
//! - `seal` / `open` / `persist` / `load` and the `TokenVault` handle (`store`)

pub mod bundle;
pub mod format;
pub mod store;

pub use bundle::TokenBundle;
pub use format::SealedBlob;
pub use store::{load, open, persist, seal, seal_with, TokenVault};
