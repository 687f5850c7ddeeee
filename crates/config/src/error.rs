use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file exists but could not be read or written.
    Io(String),
    /// Settings file is not valid JSON for `Settings`.
    Parse(String),
    /// Parsed, but a value is unusable (e.g. a bad strftime pattern).
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "settings IO error: {msg}"),
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
            Self::Validation(msg) => write!(f, "settings validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
