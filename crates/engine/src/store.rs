//! State store: the aggregate app state and the transition function.
//!
//! `transition` is pure. It never mutates its input and on error returns no
//! state at all, so the caller keeps the snapshot it already has. `Store`
//! owns one current snapshot and is the façade UI code dispatches through.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cell::CellValue;
use crate::error::StateError;
use crate::events::EditEvent;
use crate::grid::{self, Grid};
use crate::history::{self, HistoryFormat, HistoryLog};
use crate::search::{self, SearchState};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub history_panel_open: bool,
    /// `"{rowIndex}-{columnName}"` of the last applied edit; empty before any.
    pub last_edited_cell_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub grid: Grid,
    pub history: HistoryLog,
    pub search: SearchState,
    pub ui: UiState,
}

// =============================================================================
// Actions
// =============================================================================

/// Every state change goes through one of these.
///
/// Wire form is `{"type": "<Tag>", "payload": ...}`. The `UPDATE_*` aliases
/// are the tags older editor builds wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Action {
    #[serde(alias = "UPDATE_OPEN_HISTORY")]
    ToggleHistoryPanel,
    #[serde(alias = "UPDATE_TABLE_DATA")]
    SetGrid(Grid),
    #[serde(alias = "UPDATE_HISTORY_DATA")]
    SetHistory(HistoryLog),
    #[serde(alias = "UPDATE_SEARCH_VALUE_AND_MATCHED_ROWS")]
    SetSearchQuery(String),
    #[serde(alias = "UPDATE_SEARCH_VALUE")]
    SetSearchQueryOnly(String),
    ApplyEdit(EditEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionTag {
    ToggleHistoryPanel,
    SetGrid,
    SetHistory,
    SetSearchQuery,
    SetSearchQueryOnly,
    ApplyEdit,
}

impl ActionTag {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToggleHistoryPanel => "ToggleHistoryPanel",
            Self::SetGrid => "SetGrid",
            Self::SetHistory => "SetHistory",
            Self::SetSearchQuery => "SetSearchQuery",
            Self::SetSearchQueryOnly => "SetSearchQueryOnly",
            Self::ApplyEdit => "ApplyEdit",
        }
    }

    /// Resolve a wire tag, including legacy aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ToggleHistoryPanel" | "UPDATE_OPEN_HISTORY" => Some(Self::ToggleHistoryPanel),
            "SetGrid" | "UPDATE_TABLE_DATA" => Some(Self::SetGrid),
            "SetHistory" | "UPDATE_HISTORY_DATA" => Some(Self::SetHistory),
            "SetSearchQuery" | "UPDATE_SEARCH_VALUE_AND_MATCHED_ROWS" => Some(Self::SetSearchQuery),
            "SetSearchQueryOnly" | "UPDATE_SEARCH_VALUE" => Some(Self::SetSearchQueryOnly),
            "ApplyEdit" => Some(Self::ApplyEdit),
            _ => None,
        }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Action {
    pub fn tag(&self) -> ActionTag {
        match self {
            Self::ToggleHistoryPanel => ActionTag::ToggleHistoryPanel,
            Self::SetGrid(_) => ActionTag::SetGrid,
            Self::SetHistory(_) => ActionTag::SetHistory,
            Self::SetSearchQuery(_) => ActionTag::SetSearchQuery,
            Self::SetSearchQueryOnly(_) => ActionTag::SetSearchQueryOnly,
            Self::ApplyEdit(_) => ActionTag::ApplyEdit,
        }
    }

    /// Decode a serialized action.
    ///
    /// Unknown or missing tags are `InvalidAction`; a known tag whose payload
    /// does not decode is `MalformedPayload`.
    pub fn from_value(value: Value) -> Result<Self, StateError> {
        let tag = match value.get("type") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => return Err(StateError::InvalidAction(other.to_string())),
            None => return Err(StateError::InvalidAction(String::new())),
        };
        let Some(kind) = ActionTag::from_name(&tag) else {
            return Err(StateError::InvalidAction(tag));
        };
        serde_json::from_value(value).map_err(|e| StateError::MalformedPayload {
            tag: kind.name().to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, StateError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| StateError::InvalidAction(format!("unreadable action ({e})")))?;
        Self::from_value(value)
    }
}

// =============================================================================
// Transitions
// =============================================================================

/// Next state for `action`, using the default history labels.
pub fn transition(state: &AppState, action: Action) -> Result<AppState, StateError> {
    transition_with(state, action, &HistoryFormat::default())
}

pub fn transition_with(
    state: &AppState,
    action: Action,
    format: &HistoryFormat,
) -> Result<AppState, StateError> {
    let tag = action.tag();
    log::debug!("transition: {tag}");

    let next = match action {
        Action::ToggleHistoryPanel => Ok(toggle_history_panel(state)),
        Action::SetGrid(grid) => Ok(set_grid(state, grid)),
        Action::SetHistory(history) => Ok(set_history(state, history)),
        Action::SetSearchQuery(query) => Ok(set_search_query(state, query)),
        Action::SetSearchQueryOnly(query) => Ok(set_search_query_only(state, query)),
        Action::ApplyEdit(edit) => apply_edit(state, &edit, format),
    };

    if let Err(e) = &next {
        log::warn!("{tag} rejected: {e}");
    }
    next
}

fn toggle_history_panel(state: &AppState) -> AppState {
    AppState {
        ui: UiState {
            history_panel_open: !state.ui.history_panel_open,
            ..state.ui.clone()
        },
        ..state.clone()
    }
}

fn set_grid(state: &AppState, grid: Grid) -> AppState {
    let search = rematch(&state.search, &grid);
    AppState {
        grid,
        search,
        ..state.clone()
    }
}

fn set_history(state: &AppState, history: HistoryLog) -> AppState {
    AppState {
        history,
        ..state.clone()
    }
}

fn set_search_query(state: &AppState, query: String) -> AppState {
    let matched_row_indices = search::find_matches(&state.grid, &query);
    AppState {
        search: SearchState {
            query,
            matched_row_indices,
        },
        ..state.clone()
    }
}

fn set_search_query_only(state: &AppState, query: String) -> AppState {
    AppState {
        search: SearchState {
            query,
            ..state.search.clone()
        },
        ..state.clone()
    }
}

/// Grid and history both derive from the one event, or neither changes.
fn apply_edit(state: &AppState, edit: &EditEvent, format: &HistoryFormat) -> Result<AppState, StateError> {
    let grid = grid::apply_edit(&state.grid, edit)?;
    let column_index = grid
        .column_index(&edit.column_name)
        .ok_or_else(|| StateError::UnknownColumn(edit.column_name.clone()))?;
    let history = history::append_edit(&state.history, edit, column_index, format);
    let search = rematch(&state.search, &grid);

    Ok(AppState {
        grid,
        history,
        search,
        ui: UiState {
            last_edited_cell_key: edit.cell_key(),
            ..state.ui.clone()
        },
    })
}

/// Matches for the current query against a new grid.
fn rematch(current: &SearchState, grid: &Grid) -> SearchState {
    SearchState {
        query: current.query.clone(),
        matched_row_indices: search::find_matches(grid, &current.query),
    }
}

// =============================================================================
// Store façade
// =============================================================================

/// Owner of the current `AppState`.
///
/// Dispatch takes `&mut self`, so transitions on one store are serialized.
/// A failed dispatch leaves the held state as it was.
#[derive(Debug, Clone, Default)]
pub struct Store {
    state: AppState,
    format: HistoryFormat,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            state,
            format: HistoryFormat::default(),
        }
    }

    pub fn with_format(mut self, format: HistoryFormat) -> Self {
        self.format = format;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn into_state(self) -> AppState {
        self.state
    }

    pub fn format(&self) -> &HistoryFormat {
        &self.format
    }

    pub fn dispatch(&mut self, action: Action) -> Result<&AppState, StateError> {
        self.state = transition_with(&self.state, action, &self.format)?;
        Ok(&self.state)
    }

    pub fn dispatch_json(&mut self, json: &str) -> Result<&AppState, StateError> {
        let action = Action::from_json(json)?;
        self.dispatch(action)
    }

    /// Dispatch an action that has no failure case.
    fn dispatch_infallible(&mut self, action: Action) -> &AppState {
        if let Ok(next) = transition_with(&self.state, action, &self.format) {
            self.state = next;
        }
        &self.state
    }

    pub fn toggle_history_panel(&mut self) -> &AppState {
        self.dispatch_infallible(Action::ToggleHistoryPanel)
    }

    pub fn set_grid(&mut self, grid: Grid) -> &AppState {
        self.dispatch_infallible(Action::SetGrid(grid))
    }

    pub fn set_history(&mut self, history: HistoryLog) -> &AppState {
        self.dispatch_infallible(Action::SetHistory(history))
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) -> &AppState {
        self.dispatch_infallible(Action::SetSearchQuery(query.into()))
    }

    pub fn set_search_query_only(&mut self, query: impl Into<String>) -> &AppState {
        self.dispatch_infallible(Action::SetSearchQueryOnly(query.into()))
    }

    pub fn apply_edit(&mut self, edit: EditEvent) -> Result<&AppState, StateError> {
        self.dispatch(Action::ApplyEdit(edit))
    }

    /// Build the edit event from the current grid and apply it.
    ///
    /// `oldValue` is read from the grid; a missing cell yields the edit
    /// error from the table mutator.
    pub fn edit_cell(
        &mut self,
        row: usize,
        column: &str,
        new_value: impl Into<CellValue>,
        timestamp: chrono::NaiveDateTime,
    ) -> Result<&AppState, StateError> {
        let old_value = self.state.grid.get(row, column).cloned().unwrap_or_default();
        self.apply_edit(EditEvent::new(row, column, old_value, new_value, timestamp))
    }
}
