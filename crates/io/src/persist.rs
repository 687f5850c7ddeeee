//! Grid/history persistence around the engine's `Store`.
//!
//! The grid lives under `"table-data"` and the history log under
//! `"history-data"`, both as JSON with the engine's field names. Only the
//! keys an action actually changed are rewritten.

use serde::de::DeserializeOwned;
use serde::Serialize;

use gridlog_engine::{Action, ActionTag, AppState, Grid, HistoryFormat, HistoryLog, Store};

use crate::error::PersistError;
use crate::kv::KeyValueStore;

pub const TABLE_DATA_KEY: &str = "table-data";
pub const HISTORY_DATA_KEY: &str = "history-data";

/// Keys whose stored value is stale after a successful `tag` transition.
pub fn keys_for(tag: ActionTag) -> &'static [&'static str] {
    match tag {
        ActionTag::ApplyEdit => &[TABLE_DATA_KEY, HISTORY_DATA_KEY],
        ActionTag::SetGrid => &[TABLE_DATA_KEY],
        ActionTag::SetHistory => &[HISTORY_DATA_KEY],
        ActionTag::ToggleHistoryPanel
        | ActionTag::SetSearchQuery
        | ActionTag::SetSearchQueryOnly => &[],
    }
}

fn save<T: Serialize>(kv: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_string(value).map_err(|e| PersistError::Codec {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    kv.set(key, &json)
}

fn load<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Result<Option<T>, PersistError> {
    let Some(json) = kv.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&json).map(Some).map_err(|e| {
        log::warn!("stored '{}' is unreadable: {}", key, e);
        PersistError::Codec {
            key: key.to_string(),
            message: e.to_string(),
        }
    })
}

pub fn save_grid(kv: &mut dyn KeyValueStore, grid: &Grid) -> Result<(), PersistError> {
    save(kv, TABLE_DATA_KEY, grid)
}

pub fn load_grid(kv: &dyn KeyValueStore) -> Result<Option<Grid>, PersistError> {
    load(kv, TABLE_DATA_KEY)
}

pub fn save_history(kv: &mut dyn KeyValueStore, history: &HistoryLog) -> Result<(), PersistError> {
    save(kv, HISTORY_DATA_KEY, history)
}

pub fn load_history(kv: &dyn KeyValueStore) -> Result<Option<HistoryLog>, PersistError> {
    load(kv, HISTORY_DATA_KEY)
}

/// Write the keys `tag` dirtied from `state`.
pub fn persist(kv: &mut dyn KeyValueStore, tag: ActionTag, state: &AppState) -> Result<(), PersistError> {
    for &key in keys_for(tag) {
        match key {
            TABLE_DATA_KEY => save_grid(kv, &state.grid)?,
            HISTORY_DATA_KEY => save_history(kv, &state.history)?,
            _ => {}
        }
    }
    Ok(())
}

/// A `Store` whose grid and history are written through to `S`.
///
/// If the write fails after a successful transition, the in-memory state has
/// already advanced; the error reports that storage is behind.
pub struct PersistedStore<S: KeyValueStore> {
    store: Store,
    kv: S,
}

impl<S: KeyValueStore> PersistedStore<S> {
    /// Rebuild state from `kv`. Missing keys keep the initial defaults.
    pub fn open(kv: S, format: HistoryFormat) -> Result<Self, PersistError> {
        let mut store = Store::new().with_format(format);
        if let Some(grid) = load_grid(&kv)? {
            log::debug!("restored grid: {} rows", grid.len());
            store.set_grid(grid);
        }
        if let Some(history) = load_history(&kv)? {
            log::debug!("restored history: {} entries", history.entry_count());
            store.set_history(history);
        }
        Ok(Self { store, kv })
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn into_parts(self) -> (Store, S) {
        (self.store, self.kv)
    }

    pub fn dispatch(&mut self, action: Action) -> Result<&AppState, PersistError> {
        let tag = action.tag();
        self.store.dispatch(action)?;
        persist(&mut self.kv, tag, self.store.state())?;
        Ok(self.store.state())
    }

    pub fn dispatch_json(&mut self, json: &str) -> Result<&AppState, PersistError> {
        let action = Action::from_json(json)?;
        self.dispatch(action)
    }
}
