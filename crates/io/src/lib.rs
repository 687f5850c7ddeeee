// Persistence and file import
//
// The engine never calls into this crate. Callers persist explicitly after a
// successful transition, usually through `PersistedStore`.

pub mod csv;
pub mod error;
pub mod json;
pub mod kv;
pub mod persist;

pub use error::PersistError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use persist::{HISTORY_DATA_KEY, PersistedStore, TABLE_DATA_KEY};
