//! Configuration: the data directory layout and `config.json` settings.

pub mod paths;
pub mod settings;

pub use paths::DataDir;
pub use settings::Settings;
