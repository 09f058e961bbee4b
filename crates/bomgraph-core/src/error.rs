//! Configuration errors. Always fatal at startup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing setting: {key}")]
    Missing { key: String },

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
