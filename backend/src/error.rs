//! Error types for timetable loading, querying and export.
//!
//! Every failure in the crate is locally recoverable: callers receive a
//! [`TimetableError`] and decide whether to report it to the user, skip the
//! offending input, or abort the current operation.

use std::fmt;
use std::path::PathBuf;

/// Result type for timetable operations
pub type TimetableResult<T> = Result<T, TimetableError>;

/// Location of a malformed value inside the source data.
///
/// All fields are optional so the context can be filled in progressively as
/// the error travels from the record parser up to the file loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    /// Source file the value came from
    pub file: Option<PathBuf>,
    /// 1-based data row inside the file (header excluded)
    pub row: Option<usize>,
    /// Logical column, e.g. "Date" or "Scheduled Start Time"
    pub column: Option<String>,
    /// The raw value that failed to parse
    pub value: Option<String>,
}

impl ParseContext {
    /// Create a context for a column value.
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Set the source file.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the data row.
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref file) = self.file {
            parts.push(format!("file={}", file.display()));
        }
        if let Some(row) = self.row {
            parts.push(format!("row={}", row));
        }
        if let Some(ref column) = self.column {
            parts.push(format!("column={}", column));
        }
        if let Some(ref value) = self.value {
            parts.push(format!("value={:?}", value));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for timetable operations
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// A field name that is not part of the record schema.
    #[error("Unsupported field: {0}")]
    UnsupportedField(String),

    /// Malformed date, time, duration or identifier in the source data.
    #[error("Parse error: {message} {context}")]
    Parse {
        message: String,
        context: ParseContext,
    },

    /// A filter value that cannot be interpreted for its field.
    #[error("Invalid query for {field}: {message}")]
    InvalidQuery { field: String, message: String },

    /// The working set is empty where at least one record is required.
    #[error("No records after filtering")]
    NoRecords,

    /// The calendar grid has no first/last record to anchor its date range.
    #[error("Date range undefined: {0}")]
    DateRangeUndefined(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TimetableError {
    /// Create a parse error with context.
    pub fn parse(message: impl Into<String>, context: ParseContext) -> Self {
        Self::Parse {
            message: message.into(),
            context,
        }
    }

    /// Create an invalid query error.
    pub fn invalid_query(field: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Create an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Conditions the user should simply be told about, as opposed to
    /// problems with the input files or the environment.
    pub fn is_user_reportable(&self) -> bool {
        matches!(
            self,
            Self::NoRecords
                | Self::DateRangeUndefined(_)
                | Self::UnsupportedField(_)
                | Self::InvalidQuery { .. }
        )
    }

    /// Attach file and row information to a parse error. Other variants are
    /// returned unchanged.
    pub fn at_row(mut self, file: impl Into<PathBuf>, row: usize) -> Self {
        if let Self::Parse { context, .. } = &mut self {
            context.file = Some(file.into());
            context.row = Some(row);
        }
        self
    }
}
