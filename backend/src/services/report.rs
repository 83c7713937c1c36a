//! Flat chronological report and export writers.

use std::io::Write;

use log::info;
use serde::Serialize;

use crate::algorithms::{sort, SortOrder};
use crate::error::{TimetableError, TimetableResult};
use crate::models::Field;
use crate::services::calendar_grid::GridLayout;
use crate::services::controller::ScheduleController;

/// One line of the flat report. Column names match the document headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "No")]
    pub number: usize,
    #[serde(rename = "Cohort")]
    pub cohort: String,
    #[serde(rename = "Study Mode")]
    pub study_mode: String,
    #[serde(rename = "Lecturer")]
    pub lecturer: String,
    #[serde(rename = "Module Code")]
    pub module_code: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Class Type")]
    pub class_type: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Size")]
    pub size: i64,
    #[serde(rename = "Zone")]
    pub zone: String,
}

/// Header line of the flat report, in column order.
pub const REPORT_HEADERS: [&str; 15] = [
    "No",
    "Cohort",
    "Study Mode",
    "Lecturer",
    "Module Code",
    "Description",
    "Date",
    "Day",
    "Start Time",
    "End Time",
    "Duration",
    "Class Type",
    "Location",
    "Size",
    "Zone",
];

/// Rows for every record in view, ordered by date and start time and
/// numbered from 1. The controller's own ordering is left as it was.
pub fn flat_report(controller: &ScheduleController) -> TimetableResult<Vec<ReportRow>> {
    let records = controller.require_records()?.to_vec();
    let rows = sort(records, Field::DateTime, SortOrder::Ascending)
        .iter()
        .enumerate()
        .map(|(index, record)| ReportRow {
            number: index + 1,
            cohort: record.cohort().to_string(),
            study_mode: record.study_mode().to_string(),
            lecturer: record.lecturer().to_string(),
            module_code: record.module_code().to_string(),
            description: record.description().to_string(),
            date: record.date_str(),
            day: record.day_name().to_string(),
            start_time: record.start_time_str(),
            end_time: record.end_time_str(),
            duration: record.duration_str(),
            class_type: record.class_type().to_string(),
            location: record.location().to_string(),
            size: record.size(),
            zone: record.zone().to_string(),
        })
        .collect();
    Ok(rows)
}

/// Write report rows as CSV with a header line.
pub fn write_report_csv<W: Write>(rows: &[ReportRow], writer: W) -> TimetableResult<()> {
    if rows.is_empty() {
        return Err(TimetableError::NoRecords);
    }
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(|e| TimetableError::io("<report>", e))?;
    info!("Wrote {} report rows", rows.len());
    Ok(())
}

/// Write a grid layout as pretty-printed JSON.
pub fn write_grid_json<W: Write>(layout: &GridLayout, writer: W) -> TimetableResult<()> {
    serde_json::to_writer_pretty(writer, layout)?;
    info!(
        "Wrote grid layout: {} week(s), {} block(s), {} dropped",
        layout.plan.week_count,
        layout.placed_blocks(),
        layout.dropped_blocks
    );
    Ok(())
}
