use std::io;

use thiserror::Error;

/// Failures reading or writing `config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access the config file: {0}")]
    Io(#[from] io::Error),

    #[error("config file is not valid JSON: {0}")]
    Serde(String),
}
