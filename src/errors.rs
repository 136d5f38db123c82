use std::io;

use ivb_config::ConfigError;
use ivb_core::CoreError;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Every failure the shell can report. None of them end the session except
/// readline failures outside of a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("{0}")]
    Input(String),
}

impl CliError {
    pub fn input(message: impl Into<String>) -> Self {
        CliError::Input(message.into())
    }
}

impl From<ivb_core::ValidationError> for CliError {
    fn from(err: ivb_core::ValidationError) -> Self {
        CliError::Core(err.into())
    }
}
