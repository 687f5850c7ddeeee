use std::fmt;

use gridlog_config::ConfigError;
use gridlog_engine::StateError;
use gridlog_io::PersistError;

use crate::exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_IMPORT, EXIT_REJECTED, EXIT_STORAGE, EXIT_USAGE,
};

#[derive(Debug)]
pub enum CliError {
    Usage(String),
    Config(ConfigError),
    Persist(PersistError),
    Import(String),
    Output(String),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Config(_) => EXIT_CONFIG,
            Self::Persist(PersistError::State(_)) => EXIT_REJECTED,
            Self::Persist(PersistError::Import(_)) | Self::Import(_) => EXIT_IMPORT,
            Self::Persist(_) => EXIT_STORAGE,
            Self::Output(_) => EXIT_ERROR,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) => write!(f, "{msg}"),
            Self::Config(e) => write!(f, "{e}"),
            Self::Persist(e) => write!(f, "{e}"),
            Self::Import(msg) => write!(f, "import failed: {msg}"),
            Self::Output(msg) => write!(f, "cannot write output: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<PersistError> for CliError {
    fn from(e: PersistError) -> Self {
        Self::Persist(e)
    }
}

impl From<StateError> for CliError {
    fn from(e: StateError) -> Self {
        Self::Persist(PersistError::State(e))
    }
}
