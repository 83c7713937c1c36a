use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ParseContext, TimetableError, TimetableResult};
use crate::models::{RawRecord, Record};

/// Columns a valid source file declares in its header: a row label followed
/// by the [`RawRecord::COLUMNS`] record columns.
pub const EXPECTED_COLUMNS: usize = RawRecord::COLUMNS + 1;

const SOURCE_EXTENSION: &str = ".csv";

/// What to do with a row whose values do not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Fail the whole load
    #[default]
    Abort,
    /// Log the row and leave it out
    Skip,
}

/// A scanned source file and whether it passed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
    pub valid: bool,
}

/// Outcome of one directory load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Every scanned file, valid or not, in name order
    pub files: Vec<SourceFile>,
    pub records: Vec<Record>,
    /// Rows left out under [`ParsePolicy::Skip`]
    pub skipped_rows: usize,
}

impl LoadReport {
    pub fn valid_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| f.valid)
    }

    pub fn invalid_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| !f.valid)
    }
}

/// Loads timetable records from a directory of CSV exports.
///
/// Each load starts from scratch: the directory is rescanned, every file is
/// revalidated and all records are rebuilt.
#[derive(Debug, Clone)]
pub struct ScheduleLoader {
    directory: PathBuf,
    ignore: Vec<String>,
    policy: ParsePolicy,
}

impl ScheduleLoader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ignore: Vec::new(),
            policy: ParsePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ParsePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_ignore(name);
        }
        self
    }

    /// Leave `name` out of every subsequent load.
    pub fn add_ignore(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.ignore.contains(&name) {
            self.ignore.push(name);
        }
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|ignored| ignored == name)
    }

    pub fn ignored(&self) -> &[String] {
        &self.ignore
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn policy(&self) -> ParsePolicy {
        self.policy
    }

    /// Scan, validate and parse every eligible file in the directory.
    pub fn load(&self) -> TimetableResult<LoadReport> {
        let mut report = LoadReport::default();

        for (name, path) in self.scan()? {
            let valid = validate_file(&path)?;
            if !valid {
                warn!("Skipping {}: not a valid timetable export", name);
            }
            report.files.push(SourceFile { name, path, valid });
        }

        for file in report.files.iter().filter(|f| f.valid) {
            let (records, skipped) = read_records(&file.path, self.policy)?;
            debug!("{}: {} records", file.name, records.len());
            report.records.extend(records);
            report.skipped_rows += skipped;
        }

        info!(
            "Loaded {} records from {} of {} files in {}",
            report.records.len(),
            report.valid_files().count(),
            report.files.len(),
            self.directory.display()
        );
        Ok(report)
    }

    /// CSV files in the directory that are not ignored, sorted by name.
    fn scan(&self) -> TimetableResult<Vec<(String, PathBuf)>> {
        let entries =
            fs::read_dir(&self.directory).map_err(|e| TimetableError::io(&self.directory, e))?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TimetableError::io(&self.directory, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(SOURCE_EXTENSION) {
                continue;
            }
            if self.is_ignored(&name) {
                debug!("Ignoring {}", name);
                continue;
            }
            found.push((name, entry.path()));
        }
        found.sort();
        Ok(found)
    }
}

fn open_reader(path: &Path) -> TimetableResult<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| TimetableError::io(path, e))?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

/// Structural check: `.csv` name, [`EXPECTED_COLUMNS`] headers, at least one
/// data row and no row shorter than the header.
///
/// Content that the CSV reader rejects makes the file invalid rather than
/// failing the check; only I/O errors are returned.
pub fn validate_file(path: &Path) -> TimetableResult<bool> {
    let named_csv = path
        .file_name()
        .map_or(false, |name| name.to_string_lossy().ends_with(SOURCE_EXTENSION));
    if !named_csv {
        return Ok(false);
    }

    let mut reader = open_reader(path)?;
    let headers = match reader.headers() {
        Ok(headers) => headers.len(),
        Err(e) => return reject_or_fail(path, e),
    };
    if headers != EXPECTED_COLUMNS {
        debug!("{}: {} header columns", path.display(), headers);
        return Ok(false);
    }

    let mut rows = 0;
    for row in reader.records() {
        match row {
            Ok(row) if row.len() < headers => return Ok(false),
            Ok(_) => rows += 1,
            Err(e) => return reject_or_fail(path, e),
        }
    }
    Ok(rows > 0)
}

fn reject_or_fail(path: &Path, error: csv::Error) -> TimetableResult<bool> {
    if error.is_io_error() {
        return Err(TimetableError::Csv(error));
    }
    debug!("{}: {}", path.display(), error);
    Ok(false)
}

/// Parse the record columns of every data row in `path`.
///
/// Returns the records and the number of rows left out under
/// [`ParsePolicy::Skip`].
pub fn read_records(path: &Path, policy: ParsePolicy) -> TimetableResult<(Vec<Record>, usize)> {
    let mut reader = open_reader(path)?;
    let mut records = Vec::new();
    let mut skipped = 0;

    for (index, row) in reader.records().enumerate() {
        let row_number = index + 1;
        let row = row?;
        let parsed = RawRecord::from_columns(row.iter().skip(1).take(RawRecord::COLUMNS))
            .ok_or_else(|| {
                TimetableError::parse(
                    format!(
                        "expected {} record columns, found {}",
                        RawRecord::COLUMNS,
                        row.len().saturating_sub(1)
                    ),
                    ParseContext::default(),
                )
            })
            .and_then(|raw| Record::from_raw(&raw))
            .map_err(|e| e.at_row(path, row_number));

        match (parsed, policy) {
            (Ok(record), _) => records.push(record),
            (Err(e), ParsePolicy::Skip) => {
                warn!("{}", e);
                skipped += 1;
            }
            (Err(e), ParsePolicy::Abort) => return Err(e),
        }
    }
    Ok((records, skipped))
}
