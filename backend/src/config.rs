//! Configuration file support.
//!
//! Settings are read from a TOML file:
//!
//! ```toml
//! [source]
//! directory = "timetables/"
//! ignore = ["draft.csv"]
//! on_parse_error = "skip"
//!
//! [query]
//! sort_by = "Date_Time"
//!
//! [[query.filter]]
//! field = "Location"
//! value = "Room A&&&Room B"
//!
//! [export]
//! directory = "out/"
//! name = "week12"
//! format = "grid"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{TimetableError, TimetableResult};
use crate::io::{ParsePolicy, ScheduleLoader};
use crate::models::Field;
use crate::services::{FieldFilter, ScheduleQuery};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "TIMETABLE_CONFIG";

const DEFAULT_FILE_NAME: &str = "timetable.toml";

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimetableConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub export: ExportSettings,
}

/// Where records come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default = "default_source_directory")]
    pub directory: PathBuf,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub on_parse_error: ParsePolicy,
}

/// The filter and sort applied after loading.
///
/// Field names stay as written in the file and are resolved by
/// [`TimetableConfig::sort_by`] and [`TimetableConfig::query`], so an unknown
/// name surfaces as [`TimetableError::UnsupportedField`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default, rename = "filter")]
    pub filters: Vec<FilterSettings>,
}

/// One `[[query.filter]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub field: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// Export output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_export_name")]
    pub name: String,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Flat chronological table, written as CSV
    #[default]
    Report,
    /// Calendar grid layout, written as JSON
    Grid,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Report => "csv",
            ExportFormat::Grid => "json",
        }
    }
}

fn default_source_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_sort_by() -> String {
    Field::Date.to_string()
}

fn default_export_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_export_name() -> String {
    "timetable".to_string()
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            directory: default_source_directory(),
            ignore: Vec::new(),
            on_parse_error: ParsePolicy::default(),
        }
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            sort_by: default_sort_by(),
            filters: Vec::new(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
            name: default_export_name(),
            format: ExportFormat::default(),
        }
    }
}

impl FromStr for TimetableConfig {
    type Err = TimetableError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: TimetableConfig = toml::from_str(content).map_err(|e| {
            TimetableError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl TimetableConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> TimetableResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            TimetableError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        content.parse()
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `timetable.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> TimetableResult<Self> {
        let search_paths = [
            PathBuf::from(DEFAULT_FILE_NAME),
            Path::new("backend").join(DEFAULT_FILE_NAME),
            Path::new("..").join(DEFAULT_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(TimetableError::configuration(
            "No timetable.toml found in standard locations",
        ))
    }

    /// Load from the file named by [`CONFIG_ENV_VAR`], or from the default
    /// location when the variable is unset.
    pub fn from_env_or_default() -> TimetableResult<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Self::from_default_location(),
        }
    }

    fn validate(&self) -> TimetableResult<()> {
        if self.export.name.trim().is_empty() {
            return Err(TimetableError::configuration("export.name must not be empty"));
        }
        if let Some(filter) = self
            .query
            .filters
            .iter()
            .find(|f| f.value.as_deref().is_some_and(|v| v.is_empty()))
        {
            return Err(TimetableError::configuration(format!(
                "query.filter for {} has an empty value; omit it to leave the field open",
                filter.field
            )));
        }
        self.sort_by()?;
        self.query()?;
        Ok(())
    }

    /// A loader for the configured source directory.
    pub fn loader(&self) -> ScheduleLoader {
        ScheduleLoader::new(&self.source.directory)
            .with_ignored(self.source.ignore.iter().cloned())
            .with_policy(self.source.on_parse_error)
    }

    /// The configured sort field.
    pub fn sort_by(&self) -> TimetableResult<Field> {
        self.query.sort_by.parse()
    }

    /// The configured filters, with field names resolved.
    pub fn query(&self) -> TimetableResult<ScheduleQuery> {
        self.query
            .filters
            .iter()
            .map(|f| -> TimetableResult<FieldFilter> {
                Ok(FieldFilter {
                    field: f.field.parse()?,
                    value: f.value.clone(),
                })
            })
            .collect()
    }

    /// `<directory>/<name>.<csv|json>`
    pub fn export_path(&self) -> PathBuf {
        self.export
            .directory
            .join(format!("{}.{}", self.export.name, self.export.format.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config: TimetableConfig = "".parse().unwrap();
        assert_eq!(config.source.directory, PathBuf::from("."));
        assert_eq!(config.source.on_parse_error, ParsePolicy::Abort);
        assert_eq!(config.sort_by().unwrap(), Field::Date);
        assert!(config.query().unwrap().is_empty());
        assert_eq!(config.export.format, ExportFormat::Report);
        assert_eq!(config.export_path(), PathBuf::from("./timetable.csv"));
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[source]
directory = "data"
ignore = ["old.csv"]
on_parse_error = "skip"

[query]
sort_by = "Date_Time"

[[query.filter]]
field = "Allocated Location Name"
value = "Room A&&&Room B"

[[query.filter]]
field = "Start_Date"
value = "10/03/2025"

[[query.filter]]
field = "Zone"

[export]
directory = "out"
name = "week12"
format = "grid"
"#;
        let config: TimetableConfig = toml.parse().unwrap();
        assert_eq!(config.source.ignore, vec!["old.csv".to_string()]);
        assert_eq!(config.source.on_parse_error, ParsePolicy::Skip);
        assert_eq!(config.sort_by().unwrap(), Field::DateTime);

        let query = config.query().unwrap();
        let active: Vec<_> = query.active().map(|(f, v)| (f, v.to_string())).collect();
        assert_eq!(
            active,
            vec![
                (Field::Location, "Room A&&&Room B".to_string()),
                (Field::StartDate, "10/03/2025".to_string()),
            ]
        );
        assert_eq!(config.export_path(), PathBuf::from("out").join("week12.json"));

        let loader = config.loader();
        assert!(loader.is_ignored("old.csv"));
        assert_eq!(loader.policy(), ParsePolicy::Skip);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let toml = r#"
[[query.filter]]
field = "Colour"
value = "red"
"#;
        let err = toml.parse::<TimetableConfig>().unwrap_err();
        assert!(matches!(&err, TimetableError::UnsupportedField(name) if name == "Colour"));
        assert!(err.is_user_reportable());
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        let err = "[query]\nsort_by = \"Weekday\"\n"
            .parse::<TimetableConfig>()
            .unwrap_err();
        assert!(matches!(err, TimetableError::UnsupportedField(name) if name == "Weekday"));
    }

    #[test]
    fn test_malformed_toml_is_a_configuration_error() {
        let err = "[query\n".parse::<TimetableConfig>().unwrap_err();
        assert!(matches!(err, TimetableError::Configuration(_)));
        assert!(!err.is_user_reportable());
    }

    #[test]
    fn test_empty_values_are_rejected() {
        let err = "[export]\nname = \"  \"\n"
            .parse::<TimetableConfig>()
            .unwrap_err();
        assert!(matches!(err, TimetableError::Configuration(_)));

        let err = "[[query.filter]]\nfield = \"Zone\"\nvalue = \"\"\n"
            .parse::<TimetableConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("Zone"));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[query]\nsort_by = \"Lecturer\"").unwrap();
        let config = TimetableConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sort_by().unwrap(), Field::Lecturer);
    }

    #[test]
    fn test_missing_file() {
        let err = TimetableConfig::from_file("/nonexistent/timetable.toml").unwrap_err();
        assert!(matches!(err, TimetableError::Configuration(_)));
    }
}
