use std::fmt;

use gridlog_engine::StateError;

#[derive(Debug)]
pub enum PersistError {
    /// Filesystem failure.
    Io(String),
    /// Key contains characters a file store cannot use.
    InvalidKey(String),
    /// Stored value under `key` does not decode (or encode).
    Codec { key: String, message: String },
    /// Source file could not be turned into a grid.
    Import(String),
    /// The transition itself was rejected; nothing was written.
    State(StateError),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key: '{key}'"),
            Self::Codec { key, message } => write!(f, "cannot decode '{key}': {message}"),
            Self::Import(msg) => write!(f, "import error: {msg}"),
            Self::State(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::State(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StateError> for PersistError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
