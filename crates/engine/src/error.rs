use std::fmt;

/// Errors raised by the state engine.
///
/// Every variant leaves the caller's previous `AppState` untouched: the engine
/// never applies half of a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StateError {
    /// Serialized action carried a tag no transition knows about.
    InvalidAction(String),
    /// Known tag, but its payload does not decode.
    MalformedPayload { tag: String, message: String },
    /// Edit targets a row past the end of the grid.
    IndexOutOfRange { row: usize, len: usize },
    /// Edit targets a column the grid does not have.
    UnknownColumn(String),
    /// Edit writes a NaN or infinite number, which storage cannot represent.
    NonFiniteValue { row: usize, column: String },
    /// A record's column set differs from the grid's.
    InconsistentRow { row: usize, expected: usize, found: usize },
    /// A day or time label pattern that chrono cannot format with.
    InvalidFormat(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAction(tag) => write!(f, "invalid action: '{tag}'"),
            Self::MalformedPayload { tag, message } => {
                write!(f, "malformed payload for '{tag}': {message}")
            }
            Self::IndexOutOfRange { row, len } => {
                write!(f, "row index {row} out of range (grid has {len} rows)")
            }
            Self::UnknownColumn(name) => write!(f, "unknown column: '{name}'"),
            Self::NonFiniteValue { row, column } => {
                write!(f, "row {row}, column '{column}': number must be finite")
            }
            Self::InconsistentRow { row, expected, found } => write!(
                f,
                "row {row}: column set does not match the grid ({found} columns, expected {expected})"
            ),
            Self::InvalidFormat(pattern) => write!(f, "invalid label format: '{pattern}'"),
        }
    }
}

impl std::error::Error for StateError {}
