//! Day-grouped edit history.
//!
//! The log is newest-first at both levels: day groups are ordered with the
//! most recent day at index 0, and each group's `changes` has the most recent
//! entry at index 0. There is at most one group per day label.
//!
//! Days are compared by their formatted label, not by calendar date. Two
//! timestamps land in the same group exactly when `HistoryFormat::day_label`
//! renders them identically.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::error::StateError;
use crate::events::EditEvent;

/// "March 5, 2024"
pub const DEFAULT_DAY_FORMAT: &str = "%B %-d, %Y";
/// "10:00:00 AM"
pub const DEFAULT_TIME_FORMAT: &str = "%-I:%M:%S %p";

/// strftime patterns for the day label and the entry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFormat {
    day: String,
    time: String,
}

impl Default for HistoryFormat {
    fn default() -> Self {
        Self {
            day: DEFAULT_DAY_FORMAT.to_string(),
            time: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl HistoryFormat {
    /// Both patterns must parse and must format a naive local time; offset
    /// and zone items (`%z`, `%Z`) have nothing to draw from and are rejected.
    pub fn new(day: impl Into<String>, time: impl Into<String>) -> Result<Self, StateError> {
        let day = day.into();
        let time = time.into();
        for pattern in [&day, &time] {
            if !is_valid_pattern(pattern) {
                return Err(StateError::InvalidFormat(pattern.clone()));
            }
        }
        Ok(Self { day, time })
    }

    pub fn day_pattern(&self) -> &str {
        &self.day
    }

    pub fn time_pattern(&self) -> &str {
        &self.time
    }

    pub fn day_label(&self, at: &NaiveDateTime) -> String {
        render(&self.day, at)
    }

    pub fn time_of_day(&self, at: &NaiveDateTime) -> String {
        render(&self.time, at)
    }
}

fn try_render(pattern: &str, at: &NaiveDateTime) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    write!(out, "{}", at.format(pattern))?;
    Ok(out)
}

fn render(pattern: &str, at: &NaiveDateTime) -> String {
    try_render(pattern, at).unwrap_or_else(|_| {
        log::warn!("label pattern '{}' failed to format {}", pattern, at);
        String::new()
    })
}

fn is_valid_pattern(pattern: &str) -> bool {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return false;
    }
    let sample = NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|d| d.and_hms_opt(10, 0, 0));
    sample.is_some_and(|at| try_render(pattern, &at).is_ok())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// 1-based row number.
    #[serde(alias = "rowNo")]
    pub row_index: usize,
    /// 1-based column number.
    #[serde(alias = "colNo")]
    pub column_index: usize,
    pub old_value: CellValue,
    pub new_value: CellValue,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDayGroup {
    #[serde(alias = "date")]
    pub day_label: String,
    pub changes: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog(Vec<HistoryDayGroup>);

impl HistoryLog {
    pub fn new(groups: Vec<HistoryDayGroup>) -> Self {
        Self(groups)
    }

    pub fn groups(&self) -> &[HistoryDayGroup] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total entries across all day groups.
    pub fn entry_count(&self) -> usize {
        self.0.iter().map(|g| g.changes.len()).sum()
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.0.first().and_then(|g| g.changes.first())
    }

    pub fn group(&self, day_label: &str) -> Option<&HistoryDayGroup> {
        self.0.iter().find(|g| g.day_label == day_label)
    }
}

impl From<Vec<HistoryDayGroup>> for HistoryLog {
    fn from(groups: Vec<HistoryDayGroup>) -> Self {
        Self(groups)
    }
}

/// Fold one edit into the log, returning the next log.
///
/// `column_index` is the 0-based position of `edit.column_name` in the grid.
pub fn append_edit(
    history: &HistoryLog,
    edit: &EditEvent,
    column_index: usize,
    format: &HistoryFormat,
) -> HistoryLog {
    let day_label = format.day_label(&edit.timestamp);
    let entry = HistoryEntry {
        row_index: edit.row_index + 1,
        column_index: column_index + 1,
        old_value: edit.old_value.clone(),
        new_value: edit.new_value.clone(),
        time: format.time_of_day(&edit.timestamp),
    };

    let mut groups = history.0.clone();
    match groups.iter().position(|g| g.day_label == day_label) {
        Some(i) => groups[i].changes.insert(0, entry),
        None => groups.insert(
            0,
            HistoryDayGroup {
                day_label,
                changes: vec![entry],
            },
        ),
    }
    HistoryLog(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(month: u32, day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn edit(row: usize, new_value: &str, ts: NaiveDateTime) -> EditEvent {
        EditEvent::new(row, "age", "30", new_value, ts)
    }

    #[test]
    fn test_default_labels() {
        let format = HistoryFormat::default();
        assert_eq!(format.day_label(&at(3, 5, 10, 0)), "March 5, 2024");
        assert_eq!(format.time_of_day(&at(3, 5, 10, 0)), "10:00:00 AM");
        assert_eq!(format.time_of_day(&at(3, 5, 0, 7)), "12:07:00 AM");
        assert_eq!(format.time_of_day(&at(3, 5, 15, 30)), "3:30:00 PM");
    }

    #[test]
    fn test_first_edit_creates_group() {
        let log = append_edit(&HistoryLog::default(), &edit(0, "31", at(3, 5, 10, 0)), 1, &HistoryFormat::default());

        assert_eq!(log.groups().len(), 1);
        let group = &log.groups()[0];
        assert_eq!(group.day_label, "March 5, 2024");
        assert_eq!(
            group.changes,
            vec![HistoryEntry {
                row_index: 1,
                column_index: 2,
                old_value: "30".into(),
                new_value: "31".into(),
                time: "10:00:00 AM".into(),
            }]
        );
    }

    #[test]
    fn test_same_day_prepends_to_group() {
        let format = HistoryFormat::default();
        let log = append_edit(&HistoryLog::default(), &edit(0, "31", at(3, 5, 10, 0)), 1, &format);
        let log = append_edit(&log, &edit(0, "32", at(3, 5, 11, 0)), 1, &format);

        assert_eq!(log.groups().len(), 1);
        let changes = &log.groups()[0].changes;
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].new_value, CellValue::text("32"));
        assert_eq!(changes[1].new_value, CellValue::text("31"));
        assert_eq!(log.latest().map(|e| e.time.as_str()), Some("11:00:00 AM"));
    }

    #[test]
    fn test_new_day_leads_without_touching_older_groups() {
        let format = HistoryFormat::default();
        let log = append_edit(&HistoryLog::default(), &edit(0, "31", at(3, 5, 10, 0)), 1, &format);
        let log = append_edit(&log, &edit(0, "32", at(3, 5, 11, 0)), 1, &format);
        let before = log.clone();

        let log = append_edit(&log, &edit(0, "33", at(3, 6, 9, 0)), 1, &format);

        assert_eq!(log.groups().len(), 2);
        assert_eq!(log.groups()[0].day_label, "March 6, 2024");
        assert_eq!(log.groups()[1], before.groups()[0]);
        assert_eq!(log.entry_count(), 3);
    }

    #[test]
    fn test_match_existing_group_in_middle() {
        let format = HistoryFormat::default();
        let log = HistoryLog::new(vec![
            HistoryDayGroup { day_label: "March 7, 2024".into(), changes: vec![] },
            HistoryDayGroup { day_label: "March 5, 2024".into(), changes: vec![] },
        ]);

        let log = append_edit(&log, &edit(4, "x", at(3, 5, 8, 0)), 0, &format);

        assert_eq!(log.groups()[0].day_label, "March 7, 2024");
        assert!(log.groups()[0].changes.is_empty());
        assert_eq!(log.groups()[1].changes.len(), 1);
        assert_eq!(log.groups()[1].changes[0].row_index, 5);
    }

    #[test]
    fn test_grouping_follows_label_not_calendar() {
        // A month-only label merges different calendar days into one group.
        let format = HistoryFormat::new("%B %Y", DEFAULT_TIME_FORMAT).unwrap();
        let log = append_edit(&HistoryLog::default(), &edit(0, "a", at(3, 5, 10, 0)), 0, &format);
        let log = append_edit(&log, &edit(0, "b", at(3, 9, 10, 0)), 0, &format);

        assert_eq!(log.groups().len(), 1);
        assert_eq!(log.groups()[0].day_label, "March 2024");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = HistoryFormat::new("%Q", DEFAULT_TIME_FORMAT).unwrap_err();
        assert_eq!(err, StateError::InvalidFormat("%Q".into()));
    }

    #[test]
    fn test_zone_items_rejected() {
        for pattern in ["%B %Z", "%B %-d, %Y %z", "%H:%M %:z"] {
            let err = HistoryFormat::new(pattern, DEFAULT_TIME_FORMAT).unwrap_err();
            assert_eq!(err, StateError::InvalidFormat(pattern.into()));
        }
        let err = HistoryFormat::new(DEFAULT_DAY_FORMAT, "%H:%M %Z").unwrap_err();
        assert_eq!(err, StateError::InvalidFormat("%H:%M %Z".into()));
    }

    #[test]
    fn test_legacy_field_names() {
        let json = r#"[{"date":"March 5, 2024","changes":[
            {"rowNo":1,"colNo":2,"oldValue":"30","newValue":"31","time":"10:00:00 AM"}
        ]}]"#;
        let log: HistoryLog = serde_json::from_str(json).unwrap();

        assert_eq!(log.groups()[0].day_label, "March 5, 2024");
        assert_eq!(log.groups()[0].changes[0].column_index, 2);

        let out = serde_json::to_value(&log).unwrap();
        assert_eq!(out[0]["dayLabel"], "March 5, 2024");
        assert_eq!(out[0]["changes"][0]["rowIndex"], 1);
        assert_eq!(out[0]["changes"][0]["columnIndex"], 2);
    }
}
