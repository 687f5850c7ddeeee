// Plain-text and JSON output for CLI commands

use std::fmt::Write;

use serde::Serialize;

use gridlog_engine::{Grid, HistoryEntry, HistoryLog};

use crate::error::CliError;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))
}

/// Tab-separated grid with a leading row-index column.
/// `only` restricts output to the listed rows.
pub fn grid_table(grid: &Grid, only: Option<&[usize]>) -> String {
    let mut out = String::new();
    if grid.columns().is_empty() {
        return out;
    }
    let _ = writeln!(out, "#\t{}", grid.columns().join("\t"));

    for (i, row) in grid.rows().enumerate() {
        if let Some(rows) = only {
            if rows.binary_search(&i).is_err() {
                continue;
            }
        }
        let cells: Vec<String> = row.cells().iter().map(|c| c.to_text()).collect();
        let _ = writeln!(out, "{}\t{}", i, cells.join("\t"));
    }
    out
}

pub fn history_entry(entry: &HistoryEntry) -> String {
    format!(
        "{}  R{}C{}  {} -> {}",
        entry.time, entry.row_index, entry.column_index, entry.old_value, entry.new_value
    )
}

pub fn history(log: &HistoryLog) -> String {
    let mut out = String::new();
    for group in log.groups() {
        let _ = writeln!(out, "{}", group.day_label);
        for entry in &group.changes {
            let _ = writeln!(out, "  {}", history_entry(entry));
        }
    }
    out
}
