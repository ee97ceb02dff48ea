pub mod api;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod shell;
pub mod vault;

#[cfg(feature = "keyring-store")]
pub mod keyring;
