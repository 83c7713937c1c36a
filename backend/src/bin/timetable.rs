//! Timetable batch exporter
//!
//! Loads every timetable CSV in the configured directory, applies the
//! configured filters and sort, and writes either a flat report (CSV) or a
//! calendar grid layout (JSON).
//!
//! # Usage
//!
//! ```bash
//! TIMETABLE_CONFIG=timetable.toml cargo run --bin timetable
//! ```
//!
//! # Environment Variables
//!
//! - `TIMETABLE_CONFIG`: Configuration file (default: search for `timetable.toml`)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use timetable_rust::config::{ExportFormat, TimetableConfig};
use timetable_rust::services::{
    flat_report, write_grid_json, write_report_csv, CalendarGridBuilder, ScheduleController,
};
use timetable_rust::TimetableError;

fn main() -> anyhow::Result<ExitCode> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    match run() {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => match reportable(&e) {
            Some(condition) => {
                eprintln!("{}", condition);
                Ok(ExitCode::from(2))
            }
            None => Err(e),
        },
    }
}

/// The timetable condition behind `err`, if it is one the user should
/// simply be told about.
fn reportable(err: &anyhow::Error) -> Option<&TimetableError> {
    err.downcast_ref::<TimetableError>()
        .filter(|e| e.is_user_reportable())
}

fn run() -> anyhow::Result<()> {
    let config = TimetableConfig::from_env_or_default().context("Failed to load configuration")?;

    let report = config
        .loader()
        .load()
        .with_context(|| format!("Failed to load {}", config.source.directory.display()))?;
    for file in report.invalid_files() {
        warn!("Invalid source file: {}", file.name);
    }
    if report.skipped_rows > 0 {
        warn!("{} malformed rows were skipped", report.skipped_rows);
    }

    let sort_by = config.sort_by()?;
    let mut controller = ScheduleController::new(report.records);
    let kept = controller
        .control(sort_by, &config.query()?)
        .context("Failed to apply query")?;
    info!(
        "{} of {} records match, sorted by {}",
        kept,
        controller.records().len(),
        sort_by
    );

    export(&config, &controller).context("Export failed")
}

fn export(config: &TimetableConfig, controller: &ScheduleController) -> Result<(), TimetableError> {
    controller.require_records()?;
    let path = config.export_path();
    let open = || {
        File::create(&path)
            .map(BufWriter::new)
            .map_err(|e| TimetableError::io(&path, e))
    };

    match config.export.format {
        ExportFormat::Report => {
            let rows = flat_report(controller)?;
            write_report_csv(&rows, open()?)?;
        }
        ExportFormat::Grid => {
            let layout = CalendarGridBuilder::new(controller).build()?;
            if layout.dropped_blocks > 0 {
                warn!(
                    "{} records did not fit the calendar grid",
                    layout.dropped_blocks
                );
            }
            write_grid_json(&layout, open()?)?;
        }
    }

    info!("Export written to {}", path.display());
    Ok(())
}
