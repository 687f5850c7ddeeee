//! Edit events produced by the grid UI.
//!
//! An `EditEvent` is one atomic cell change with its provenance. It is
//! consumed exactly once by an `ApplyEdit` transition, which derives both the
//! next grid and the next history log from it.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditEvent {
    /// 0-based row index into the grid.
    pub row_index: usize,
    pub column_name: String,
    pub old_value: CellValue,
    pub new_value: CellValue,
    /// Viewer-local wall-clock time of the edit.
    pub timestamp: NaiveDateTime,
}

impl EditEvent {
    pub fn new(
        row_index: usize,
        column_name: impl Into<String>,
        old_value: impl Into<CellValue>,
        new_value: impl Into<CellValue>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            row_index,
            column_name: column_name.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
            timestamp,
        }
    }

    /// Same as `new`, stamped with the current local time.
    pub fn now(
        row_index: usize,
        column_name: impl Into<String>,
        old_value: impl Into<CellValue>,
        new_value: impl Into<CellValue>,
    ) -> Self {
        Self::new(row_index, column_name, old_value, new_value, Local::now().naive_local())
    }

    /// Key identifying the edited cell, e.g. `"0-age"`.
    pub fn cell_key(&self) -> String {
        format!("{}-{}", self.row_index, self.column_name)
    }
}
