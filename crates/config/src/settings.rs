// Application settings
// Loaded from ~/.config/gridlog/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use gridlog_engine::history::{DEFAULT_DAY_FORMAT, DEFAULT_TIME_FORMAT};
use gridlog_engine::HistoryFormat;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Storage
    #[serde(rename = "storage.dataDir")]
    pub data_dir: Option<PathBuf>, // None = platform data dir

    // History labels (chrono strftime patterns)
    #[serde(rename = "history.dayFormat")]
    pub day_format: String,

    #[serde(rename = "history.timeFormat")]
    pub time_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            day_format: DEFAULT_DAY_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridlog")
            .join("settings.json")
    }

    /// Load settings from the default location.
    ///
    /// A missing file yields defaults and writes a commented template.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            create_default_file(&path);
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&contents)
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        let settings: Settings =
            serde_json::from_str(&cleaned).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.history_format().map(|_| ())
    }

    pub fn history_format(&self) -> Result<HistoryFormat, ConfigError> {
        HistoryFormat::new(&self.day_format, &self.time_format)
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    /// Effective data directory for persisted grid and history.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("gridlog")
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Io(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

/// Write the commented default settings file. Failures are logged, not fatal.
fn create_default_file(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("Error creating config directory: {}", e);
            return;
        }
    }

    let default_config = r#"{
    // Where table-data.json and history-data.json live (null = platform data dir)
    "storage.dataDir": null,

    // History labels, chrono strftime patterns
    // "%B %-d, %Y" -> March 5, 2024
    "history.dayFormat": "%B %-d, %Y",
    // "%-I:%M:%S %p" -> 10:00:00 AM
    "history.timeFormat": "%-I:%M:%S %p"
}
"#;

    if let Err(e) = fs::write(path, default_config) {
        log::warn!("Error writing default settings.json: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_engine_format() {
        let settings = Settings::default();
        assert_eq!(settings.history_format().unwrap(), HistoryFormat::default());
        assert!(settings.data_dir().ends_with("gridlog"));
    }

    #[test]
    fn test_comments_and_partial_keys() {
        let settings = Settings::from_json(
            r#"{
    // only override the time
    "history.timeFormat": "%H:%M"
}"#,
        )
        .unwrap();

        assert_eq!(settings.time_format, "%H:%M");
        assert_eq!(settings.day_format, DEFAULT_DAY_FORMAT);
        assert_eq!(settings.data_dir, None);
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let err = Settings::from_json(r#"{"history.dayFormat": "%Q"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zone_patterns_rejected() {
        // These parse as strftime but need an offset a naive timestamp lacks.
        for json in [
            r#"{"history.dayFormat": "%B %-d, %Y %Z"}"#,
            r#"{"history.dayFormat": "%Y-%m-%d %z"}"#,
            r#"{"history.timeFormat": "%H:%M %:z"}"#,
        ] {
            let err = Settings::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)), "{json}");
        }
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            data_dir: Some(dir.path().join("data")),
            ..Settings::default()
        };

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded, settings);
        assert_eq!(loaded.data_dir(), dir.path().join("data"));
    }

    #[test]
    fn test_template_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        create_default_file(&path);

        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
    }
}
