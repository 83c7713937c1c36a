//! # Timetable Rust
//!
//! Filtering, sorting and calendar layout for teaching timetables.
//!
//! Timetable exports are loaded from a directory of CSV files into typed
//! records. A controller narrows and orders the records in view, and the
//! result is exported either as a flat chronological report or as a
//! week-by-day calendar grid whose cell size follows the busiest day.
//!
//! ## Architecture
//!
//! - [`models`]: records, field names and field values
//! - [`algorithms`]: heap sort and binary-search range filters over records
//! - [`services`]: the working-set controller, calendar grid and flat report
//! - [`io`]: source directory scanning, validation and parsing
//! - [`presentation`]: column-header sort toggling for table views
//! - [`config`]: TOML configuration
//! - [`error`]: error taxonomy
//!
//! ## Example
//!
//! ```no_run
//! use timetable_rust::io::ScheduleLoader;
//! use timetable_rust::models::Field;
//! use timetable_rust::services::{CalendarGridBuilder, ScheduleController, ScheduleQuery};
//!
//! # fn main() -> timetable_rust::error::TimetableResult<()> {
//! let report = ScheduleLoader::new("timetables/").load()?;
//! let mut controller = ScheduleController::new(report.records);
//!
//! let query = ScheduleQuery::new()
//!     .with(Field::Location, "Room A")
//!     .with(Field::StartDate, "10/03/2025");
//! controller.control(Field::DateTime, &query)?;
//!
//! let layout = CalendarGridBuilder::new(&controller).build()?;
//! println!("{} week(s)", layout.plan.week_count);
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod presentation;
pub mod services;

pub use error::{TimetableError, TimetableResult};
