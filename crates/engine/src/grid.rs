//! Grid storage and the table mutator.
//!
//! A grid is a fixed, ordered column list plus rows of cells aligned to it.
//! Rows sit behind `Arc` so an edit clones one row and shares the rest with
//! the previous snapshot.
//!
//! Key invariants:
//! - every row has exactly one cell per column
//! - mutation replaces cell values only; rows and columns are never added or removed

use std::fmt;
use std::sync::Arc;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cell::CellValue;
use crate::error::StateError;
use crate::events::EditEvent;

/// One grid row; cells are aligned with the owning grid's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<CellValue>,
}

impl Row {
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    pub fn get(&self, col: usize) -> Option<&CellValue> {
        self.cells.get(col)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    columns: Arc<Vec<String>>,
    rows: Vec<Arc<Row>>,
}

impl Grid {
    /// Empty grid over the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns: Arc::new(columns),
            rows: Vec::new(),
        }
    }

    /// Build a grid from `(column, value)` records.
    ///
    /// The first record fixes the column order. Later records may list their
    /// columns in any order but must carry exactly the same set.
    pub fn from_records<I>(records: I) -> Result<Self, StateError>
    where
        I: IntoIterator<Item = Vec<(String, CellValue)>>,
    {
        let mut records = records.into_iter();
        let Some(first) = records.next() else {
            return Ok(Self::default());
        };

        let mut columns: Vec<String> = Vec::with_capacity(first.len());
        let mut cells = Vec::with_capacity(first.len());
        for (name, value) in first {
            if columns.contains(&name) {
                return Err(StateError::InconsistentRow {
                    row: 0,
                    expected: columns.len(),
                    found: columns.len() + 1,
                });
            }
            columns.push(name);
            cells.push(value);
        }

        let mut grid = Self::new(columns);
        grid.rows.push(Arc::new(Row { cells }));

        for (offset, record) in records.enumerate() {
            let row = offset + 1;
            let found = record.len();
            let mismatch = || StateError::InconsistentRow {
                row,
                expected: grid.columns.len(),
                found,
            };
            if found != grid.columns.len() {
                return Err(mismatch());
            }
            let mut slots: Vec<Option<CellValue>> = vec![None; found];
            for (name, value) in record {
                let col = grid.column_index(&name).ok_or_else(mismatch)?;
                if slots[col].replace(value).is_some() {
                    return Err(mismatch());
                }
            }
            let cells = slots.into_iter().collect::<Option<Vec<_>>>().ok_or_else(mismatch)?;
            grid.rows.push(Arc::new(Row { cells }));
        }

        Ok(grid)
    }

    /// Append a row of cells in column order.
    pub fn push_row(&mut self, cells: Vec<CellValue>) -> Result<(), StateError> {
        if cells.len() != self.columns.len() {
            return Err(StateError::InconsistentRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.rows.push(Arc::new(Row { cells }));
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index).map(|r| r.as_ref())
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().map(|r| r.as_ref())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.row(row)?.get(col)
    }

    /// True when both grids hold the same allocation for `row`.
    pub fn shares_row(&self, other: &Grid, row: usize) -> bool {
        match (self.rows.get(row), other.rows.get(row)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Apply one cell edit, returning the next grid.
///
/// Only `edit.new_value` is written; `old_value` is provenance for the
/// history log and is not checked against the grid. NaN or infinite numbers
/// in either value are refused so grid and history stay serializable.
pub fn apply_edit(grid: &Grid, edit: &EditEvent) -> Result<Grid, StateError> {
    if edit.row_index >= grid.len() {
        return Err(StateError::IndexOutOfRange {
            row: edit.row_index,
            len: grid.len(),
        });
    }
    let col = grid
        .column_index(&edit.column_name)
        .ok_or_else(|| StateError::UnknownColumn(edit.column_name.clone()))?;
    if !edit.new_value.is_storable() || !edit.old_value.is_storable() {
        return Err(StateError::NonFiniteValue {
            row: edit.row_index,
            column: edit.column_name.clone(),
        });
    }

    let mut rows = grid.rows.clone();
    let mut row = Row::clone(&rows[edit.row_index]);
    row.cells[col] = edit.new_value.clone();
    rows[edit.row_index] = Arc::new(row);

    Ok(Grid {
        columns: Arc::clone(&grid.columns),
        rows,
    })
}

// =============================================================================
// Serde: a grid is a JSON array of row objects
// =============================================================================

struct RowRecord<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl Serialize for RowRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in self.columns.iter().zip(&self.row.cells) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowRecord {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

/// Row object with key order preserved.
struct Record(Vec<(String, CellValue)>);

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a row object mapping column names to cell values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Record, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, CellValue>()? {
                    entries.push((name, value));
                }
                Ok(Record(entries))
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GridVisitor;

        impl<'de> Visitor<'de> for GridVisitor {
            type Value = Grid;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an array of row objects")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Grid, A::Error> {
                let mut records = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(Record(entries)) = seq.next_element()? {
                    records.push(entries);
                }
                Grid::from_records(records).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_seq(GridVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn people() -> Grid {
        let mut grid = Grid::new(vec!["name".into(), "age".into()]);
        grid.push_row(vec!["Alice".into(), "30".into()]).unwrap();
        grid.push_row(vec!["Bob".into(), "25".into()]).unwrap();
        grid.push_row(vec!["Carol".into(), "41".into()]).unwrap();
        grid
    }

    fn edit(row: usize, column: &str, new_value: &str) -> EditEvent {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        EditEvent::new(row, column, CellValue::default(), new_value, at)
    }

    #[test]
    fn test_apply_edit_changes_one_cell() {
        let grid = people();
        let next = apply_edit(&grid, &edit(1, "age", "26")).unwrap();

        assert_eq!(next.get(1, "age"), Some(&CellValue::text("26")));
        for row in 0..grid.len() {
            for column in grid.columns() {
                if row == 1 && column == "age" {
                    continue;
                }
                assert_eq!(next.get(row, column), grid.get(row, column));
            }
        }
        // Input snapshot untouched
        assert_eq!(grid.get(1, "age"), Some(&CellValue::text("25")));
    }

    #[test]
    fn test_apply_edit_shares_untouched_rows() {
        let grid = people();
        let next = apply_edit(&grid, &edit(1, "name", "Robert")).unwrap();

        assert!(next.shares_row(&grid, 0));
        assert!(!next.shares_row(&grid, 1));
        assert!(next.shares_row(&grid, 2));
    }

    #[test]
    fn test_apply_edit_rejects_bad_row() {
        let err = apply_edit(&people(), &edit(3, "age", "1")).unwrap_err();
        assert_eq!(err, StateError::IndexOutOfRange { row: 3, len: 3 });
    }

    #[test]
    fn test_apply_edit_rejects_unknown_column() {
        let err = apply_edit(&people(), &edit(0, "email", "a@b.c")).unwrap_err();
        assert_eq!(err, StateError::UnknownColumn("email".into()));
    }

    #[test]
    fn test_apply_edit_rejects_non_finite_number() {
        let grid = people();
        let mut nan = edit(0, "age", "");
        nan.new_value = CellValue::Number(f64::NAN);

        let err = apply_edit(&grid, &nan).unwrap_err();
        assert_eq!(err, StateError::NonFiniteValue { row: 0, column: "age".into() });

        let mut finite = edit(0, "age", "");
        finite.new_value = CellValue::Number(31.0);
        let next = apply_edit(&grid, &finite).unwrap();
        assert_eq!(serde_json::to_string(&next).unwrap().matches("31").count(), 1);
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut grid = Grid::new(vec!["a".into(), "b".into()]);
        let err = grid.push_row(vec!["only".into()]).unwrap_err();
        assert_eq!(err, StateError::InconsistentRow { row: 0, expected: 2, found: 1 });
    }

    #[test]
    fn test_json_preserves_column_order() {
        let grid: Grid =
            serde_json::from_str(r#"[{"name":"Alice","age":"30"},{"age":"25","name":"Bob"}]"#)
                .unwrap();

        assert_eq!(grid.columns(), &["name".to_string(), "age".to_string()]);
        assert_eq!(grid.get(1, "name"), Some(&CellValue::text("Bob")));
        assert_eq!(
            serde_json::to_string(&grid).unwrap(),
            r#"[{"name":"Alice","age":"30"},{"name":"Bob","age":"25"}]"#
        );
    }

    #[test]
    fn test_json_rejects_ragged_rows() {
        let result: Result<Grid, _> =
            serde_json::from_str(r#"[{"name":"Alice","age":"30"},{"name":"Bob"}]"#);
        assert!(result.is_err());

        let result: Result<Grid, _> =
            serde_json::from_str(r#"[{"name":"Alice","age":"30"},{"name":"Bob","email":"x"}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_json_array_is_empty_grid() {
        let grid: Grid = serde_json::from_str("[]").unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid, Grid::default());
    }
}
