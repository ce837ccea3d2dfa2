//! Properties-file configuration.
//!
//! The file is a flat list of `key=value` (or `key: value`) lines, `#` and
//! `!` start comments. It names the input columns, the hour watermarks, and
//! where every team block goes on each report sheet.

use crate::error::{ConfigError, LayoutError};
use crate::input::InputColumns;
use crate::layout::Variant;
use crate::threshold::{Thresholds, DEFAULT_HIGH_HOURS, DEFAULT_LOW_HOURS};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// Properties file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "HoursExport.properties";

/// Last worksheet column (XFD).
pub const MAX_COLUMN: u16 = 16_383;

pub const KEY_INPUT_FILE: &str = "inputFile";
pub const KEY_OUTPUT_FILE: &str = "outputFile";
pub const KEY_LOW_THRESHOLD: &str = "hoursLowThreshold";
pub const KEY_HIGH_THRESHOLD: &str = "hoursHighThreshold";
pub const KEY_REJECT_NEGATIVE: &str = "rejectNegativeHours";
pub const KEY_COLUMN_HOURS: &str = "inputColumnHours";
pub const KEY_COLUMN_NAME: &str = "inputColumnName";
pub const KEY_COLUMN_ID: &str = "inputColumnID";
pub const KEY_COLUMN_TEAM: &str = "inputColumnTeam";

lazy_static! {
    static ref PROPERTY_LINE: Regex = Regex::new(r"^\s*([^=:\s]+)\s*[=:]\s*(.*?)\s*$").unwrap();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    values: BTreeMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let config = Self::parse(&text);
        log::debug!("Loaded {} settings from {}", config.len(), path.display());
        Ok(config)
    }

    /// Parse properties text. Lines that are not `key=value` are ignored.
    pub fn parse(text: &str) -> Self {
        let mut values = BTreeMap::new();
        for line in text.lines() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            match PROPERTY_LINE.captures(line) {
                Some(caps) => {
                    values.insert(caps[1].to_string(), caps[2].to_string());
                }
                None => log::warn!("Ignoring unparseable config line: {}", line),
            }
        }
        Self { values }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let mut out = String::new();
        out.push_str(&format!(
            "# {}\n",
            chrono::Local::now().format("%a %b %d %H:%M:%S %Y")
        ));
        for (key, value) in &self.values {
            out.push_str(&format!("{}={}\n", key, value));
        }
        std::fs::write(path, out).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                key: key.to_string(),
                value: v.to_string(),
            }),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) => match v.as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    key: key.to_string(),
                    value: v,
                }),
            },
        }
    }

    /// Watermarks from `hoursLowThreshold`/`hoursHighThreshold` (3.0 and 7.0 if absent).
    pub fn thresholds(&self) -> Result<Thresholds, ConfigError> {
        Ok(Thresholds::new(
            self.get_f64(KEY_LOW_THRESHOLD, DEFAULT_LOW_HOURS)?,
            self.get_f64(KEY_HIGH_THRESHOLD, DEFAULT_HIGH_HOURS)?,
        ))
    }

    pub fn input_columns(&self) -> InputColumns {
        let defaults = InputColumns::default();
        InputColumns {
            hours: self.get_or(KEY_COLUMN_HOURS, &defaults.hours).to_string(),
            name: self.get_or(KEY_COLUMN_NAME, &defaults.name).to_string(),
            id: self.get_or(KEY_COLUMN_ID, &defaults.id).to_string(),
            team: self.get_or(KEY_COLUMN_TEAM, &defaults.team).to_string(),
        }
    }

    pub fn reject_negative_hours(&self) -> Result<bool, ConfigError> {
        self.get_bool(KEY_REJECT_NEGATIVE, false)
    }

    /// Row above the first section, or -1 when `{variant}StartRow` is unset.
    pub fn start_row(&self, variant: Variant) -> Result<i64, LayoutError> {
        let key = variant.start_row_key();
        match self.get(&key) {
            None => Ok(-1),
            Some(v) => match v.trim().parse::<i64>() {
                Ok(row) if row >= -1 => Ok(row),
                _ => Err(LayoutError::InvalidStartRow {
                    key,
                    value: v.to_string(),
                }),
            },
        }
    }

    /// Raw team list for one section, e.g. `coachesTopRow=1,2,3`.
    pub fn section(&self, variant: Variant, section: &str) -> Option<&str> {
        self.get(&variant.section_key(section))
    }

    /// Starting column of a team's block, from `{variant}Column-{team}`.
    ///
    /// The whole block must fit within the worksheet's last column.
    pub fn team_column(&self, variant: Variant, team: i64) -> Result<u16, LayoutError> {
        let key = variant.column_key(team);
        let Some(v) = self.get(&key) else {
            return Err(LayoutError::MissingColumn { key });
        };
        match v.trim().parse::<u16>() {
            Ok(col) if col <= MAX_COLUMN + 1 - variant.block_width() => Ok(col),
            _ => Err(LayoutError::InvalidColumn {
                key,
                value: v.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# sample
key1=value1
key2 = value2
  key3: value3
! bang comment

coachesTopRow=1,2,3
coachesColumn-1=0
";

    #[test]
    fn test_parse_properties() {
        let config = Config::parse(SAMPLE);
        assert_eq!(config.get("key1"), Some("value1"));
        assert_eq!(config.get("key2"), Some("value2"));
        assert_eq!(config.get("key3"), Some("value3"));
        assert_eq!(config.get("coachesTopRow"), Some("1,2,3"));
        assert_eq!(config.get("nonexistentKey"), None);
        assert_eq!(config.get_or("nonexistentKey", "default"), "default");
        assert_eq!(config.len(), 5);
    }

    #[test]
    fn test_set_overrides() {
        let mut config = Config::parse(SAMPLE);
        config.set("key4", "value4");
        config.set("key1", "newValue1");
        assert_eq!(config.get("key4"), Some("value4"));
        assert_eq!(config.get("key1"), Some("newValue1"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.properties");
        std::fs::write(&path, SAMPLE).unwrap();

        let mut config = Config::load(&path).unwrap();
        config.set("key4", "value4");
        config.set("key1", "newValue1");
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.get("key4"), Some("value4"));
        assert_eq!(reloaded.get("key1"), Some("newValue1"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.properties");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("nonexistent.properties"));
    }

    #[test]
    fn test_threshold_defaults_and_overrides() {
        let mut config = Config::new();
        assert_eq!(config.thresholds().unwrap(), Thresholds::new(3.0, 7.0));

        config.set(KEY_LOW_THRESHOLD, "2.5");
        config.set(KEY_HIGH_THRESHOLD, " 10 ");
        assert_eq!(config.thresholds().unwrap(), Thresholds::new(2.5, 10.0));

        config.set(KEY_HIGH_THRESHOLD, "lots");
        assert!(matches!(
            config.thresholds(),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_input_column_defaults() {
        let mut config = Config::new();
        let cols = config.input_columns();
        assert_eq!(cols.hours, "workday_w");
        assert_eq!(cols.name, "Name");
        assert_eq!(cols.id, "empno");
        assert_eq!(cols.team, "Department");

        config.set(KEY_COLUMN_TEAM, "Team");
        assert_eq!(config.input_columns().team, "Team");
    }

    #[test]
    fn test_layout_keys() {
        let mut config = Config::parse(SAMPLE);
        assert_eq!(config.start_row(Variant::Coach), Ok(-1));
        config.set("coachesStartRow", "1");
        assert_eq!(config.start_row(Variant::Coach), Ok(1));
        config.set("parentsStartRow", "x");
        assert!(config.start_row(Variant::Parent).is_err());

        assert_eq!(config.section(Variant::Coach, "TopRow"), Some("1,2,3"));
        assert_eq!(config.section(Variant::Parent, "TopRow"), None);
        assert_eq!(config.team_column(Variant::Coach, 1), Ok(0));
        assert_eq!(
            config.team_column(Variant::Coach, 9),
            Err(LayoutError::MissingColumn {
                key: "coachesColumn-9".to_string()
            })
        );
    }

    #[test]
    fn test_team_column_must_fit_sheet() {
        let mut config = Config::new();
        config.set("coachesColumn-1", "16382");
        config.set("parentsColumn-1", "16382");
        assert_eq!(config.team_column(Variant::Coach, 1), Ok(16382));
        assert!(matches!(
            config.team_column(Variant::Parent, 1),
            Err(LayoutError::InvalidColumn { .. })
        ));

        config.set("coachesColumn-1", "65535");
        assert_eq!(
            config.team_column(Variant::Coach, 1),
            Err(LayoutError::InvalidColumn {
                key: "coachesColumn-1".to_string(),
                value: "65535".to_string()
            })
        );
        config.set("coachesColumn-1", "-2");
        assert!(config.team_column(Variant::Coach, 1).is_err());
    }

    #[test]
    fn test_reject_negative_flag() {
        let mut config = Config::new();
        assert!(!config.reject_negative_hours().unwrap());
        config.set(KEY_REJECT_NEGATIVE, "TRUE");
        assert!(config.reject_negative_hours().unwrap());
        config.set(KEY_REJECT_NEGATIVE, "maybe");
        assert!(config.reject_negative_hours().is_err());
    }
}
