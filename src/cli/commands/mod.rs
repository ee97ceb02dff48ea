//! One module per `nuc` subcommand group.

pub mod api_version;
pub mod completions;
pub mod configure;
pub mod docker;
pub mod keyring;
pub mod services;
pub mod shell;
pub mod sockets;
