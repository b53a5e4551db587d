use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Failures that stop the game before or around the terminal session.
/// Problems inside the running loop are not errors: they end it quietly.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot open log file {}: {source}", .path.display())]
    LogFile { path: PathBuf, source: io::Error },
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}
