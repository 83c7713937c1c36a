//! Source file loading.
//!
//! [`ScheduleLoader`] scans a directory for timetable CSV exports, checks each
//! file's structure and parses the rows of the valid ones into records.
//!
//! # Example
//!
//! ```no_run
//! use timetable_rust::io::{ParsePolicy, ScheduleLoader};
//!
//! let report = ScheduleLoader::new("timetables/")
//!     .with_policy(ParsePolicy::Skip)
//!     .load()
//!     .expect("Failed to load");
//! println!("Loaded {} records", report.records.len());
//! ```

pub mod loaders;

#[cfg(test)]
mod loaders_tests;

pub use loaders::{
    read_records, validate_file, LoadReport, ParsePolicy, ScheduleLoader, SourceFile,
    EXPECTED_COLUMNS,
};
