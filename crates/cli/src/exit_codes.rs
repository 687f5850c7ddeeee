//! CLI Exit Code Registry
//!
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | Success                                           |
//! | 1    | General error (unspecified)                       |
//! | 2    | Usage error (bad args; also clap's own exit code) |
//! | 3    | Action rejected by the engine (bad edit/action)   |
//! | 4    | Storage failure (read/write/decode of data dir)   |
//! | 5    | Import failure (unreadable CSV/JSON source)       |
//! | 6    | Settings file invalid                             |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments the parser could not catch.
pub const EXIT_USAGE: u8 = 2;

/// The engine rejected the action (unknown tag, bad row, unknown column).
/// Stored data is unchanged.
pub const EXIT_REJECTED: u8 = 3;

/// The data directory could not be read or written.
pub const EXIT_STORAGE: u8 = 4;

/// The import source could not be turned into a grid.
pub const EXIT_IMPORT: u8 = 5;

/// settings.json exists but is invalid.
pub const EXIT_CONFIG: u8 = 6;
