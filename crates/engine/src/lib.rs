//! `gridlog-engine` — state engine for a grid editor.
//!
//! Pure crate: holds cell values, a day-grouped edit history and a substring
//! search index, and computes each next state from an action. No I/O.

pub mod cell;
pub mod error;
pub mod events;
pub mod grid;
pub mod history;
pub mod search;
pub mod store;

pub use cell::CellValue;
pub use error::StateError;
pub use events::EditEvent;
pub use grid::{Grid, Row};
pub use history::{HistoryDayGroup, HistoryEntry, HistoryFormat, HistoryLog};
pub use search::SearchState;
pub use store::{Action, ActionTag, AppState, Store, UiState, transition, transition_with};
