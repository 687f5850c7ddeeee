//! Substring search over grid rows.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Current query and the rows it matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub query: String,
    /// Ascending, unique row indices.
    pub matched_row_indices: Vec<usize>,
}

impl SearchState {
    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn is_match(&self, row: usize) -> bool {
        self.matched_row_indices.binary_search(&row).is_ok()
    }
}

/// Rows with at least one cell containing `query`, case-insensitively.
///
/// An empty query matches nothing. Every row is scanned; within a row the
/// first matching cell decides.
pub fn find_matches(grid: &Grid, query: &str) -> Vec<usize> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    grid.rows()
        .enumerate()
        .filter(|(_, row)| {
            row.cells()
                .iter()
                .any(|cell| cell.to_text().to_lowercase().contains(&needle))
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    fn sample() -> Grid {
        let mut grid = Grid::new(vec!["name".into(), "code".into()]);
        grid.push_row(vec!["Alice".into(), "Foo123".into()]).unwrap();
        grid.push_row(vec!["Bob".into(), CellValue::Number(42.0)]).unwrap();
        grid.push_row(vec!["foo fighters".into(), "x".into()]).unwrap();
        grid
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        assert!(find_matches(&sample(), "").is_empty());
        assert!(find_matches(&Grid::default(), "").is_empty());
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert_eq!(find_matches(&sample(), "foo1"), vec![0]);
        assert_eq!(find_matches(&sample(), "FOO"), vec![0, 2]);
    }

    #[test]
    fn test_numbers_match_by_text() {
        assert_eq!(find_matches(&sample(), "42"), vec![1]);
        assert_eq!(find_matches(&sample(), "42.0"), Vec::<usize>::new());
    }

    #[test]
    fn test_no_match() {
        assert!(find_matches(&sample(), "zzz").is_empty());
    }

    #[test]
    fn test_is_match() {
        let state = SearchState {
            query: "foo".into(),
            matched_row_indices: find_matches(&sample(), "foo"),
        };
        assert!(state.is_active());
        assert!(state.is_match(2));
        assert!(!state.is_match(1));
    }
}
