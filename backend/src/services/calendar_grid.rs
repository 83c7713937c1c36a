//! Calendar grid layout for spreadsheet export.
//!
//! The grid has one row band per calendar week and seven day columns
//! (Monday..Sunday). Each day cell holds up to `blocks_per_day` record blocks,
//! laid out three across and [`BLOCK_HEIGHT`] sheet rows tall. The number of
//! blocks per day is chosen from the busiest date in the working set, see
//! [`DensityTier`].
//!
//! [`GridPlan`] carries the sheet coordinates (1-based rows and columns) that
//! a spreadsheet writer needs to materialise the layout; [`GridLayout`] adds
//! the placed blocks and the legend.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use log::{debug, warn};
use serde::Serialize;

use crate::algorithms::{sort, SortOrder};
use crate::error::{TimetableError, TimetableResult};
use crate::models::{time, Field, Record};
use crate::services::controller::ScheduleController;

/// Legend fill colours, assigned per description and reused after the last.
pub const PALETTE: [&str; 13] = [
    "f85751", "fc8058", "f6a667", "ffc58f", "fffea4", "d0f3a7", "b1d89d", "6bf2fd", "81c5f2",
    "a39de1", "d0b8e9", "f7c4cd", "f5e0e9",
];

/// Width of every calendar column, in spreadsheet units.
pub const DATE_COLUMN_WIDTH: u32 = 15;

/// Sheet rows taken by one block: code, time range, class type, location.
pub const BLOCK_HEIGHT: u32 = 4;

/// Blocks placed side by side within a day cell.
pub const BLOCKS_PER_BAND: usize = 3;

/// Column of the week labels; day columns start right after it.
pub const CALENDAR_START_COLUMN: u32 = 1;

/// Row of the legend header. Entries follow from the next row down.
pub const LEGEND_HEADER_ROW: u32 = 3;

/// The calendar never starts above this row plus the gap, so the title fits.
const LEGEND_MIN_LAST_ROW: u32 = 7;
const CALENDAR_GAP: u32 = 3;

/// Sheet columns of the legend table, shared by the header and every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LegendColumns {
    pub cohort: u32,
    pub code: u32,
    pub module: u32,
    pub lecturer: u32,
}

pub const LEGEND_COLUMNS: LegendColumns = LegendColumns {
    cohort: 13,
    code: 14,
    module: 15,
    lecturer: 19,
};

/// Sheet row of legend entry `index`.
pub fn legend_row(index: usize) -> u32 {
    LEGEND_HEADER_ROW + 1 + index as u32
}

/// Rows and blocks allotted to each day, chosen from the same-day maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DensityTier {
    pub rows_per_day: u32,
    pub blocks_per_day: usize,
}

impl DensityTier {
    /// Tier for a working set whose busiest date has `count` records.
    ///
    /// A count of zero has no tier: there is nothing to lay out.
    pub fn for_duplicates(count: usize) -> TimetableResult<Self> {
        let (rows_per_day, blocks_per_day) = match count {
            0 => return Err(TimetableError::NoRecords),
            1..=3 => (4, 3),
            4..=6 => (8, 6),
            7..=9 => (12, 9),
            _ => (16, 12),
        };
        Ok(Self {
            rows_per_day,
            blocks_per_day,
        })
    }
}

/// 1-based sheet coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellPosition {
    pub row: u32,
    pub column: u32,
}

/// Grid geometry for one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridPlan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub first_monday: NaiveDate,
    pub week_count: usize,
    pub tier: DensityTier,
    pub legend_rows: usize,
    pub legend_header_row: u32,
    pub legend_columns: LegendColumns,
    /// Row of the weekday header; the "Week" label sits here too.
    pub calendar_start_row: u32,
    pub start_column: u32,
    /// Date header row of each week band.
    pub week_rows: Vec<u32>,
    /// First of the three sheet columns of each weekday.
    pub day_columns: Vec<u32>,
    pub date_column_width: u32,
}

impl GridPlan {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        duplicates: usize,
        legend_rows: usize,
    ) -> TimetableResult<Self> {
        if end_date < start_date {
            return Err(TimetableError::DateRangeUndefined(format!(
                "range ends ({}) before it starts ({})",
                end_date, start_date
            )));
        }
        let tier = DensityTier::for_duplicates(duplicates)?;
        let week_count = time::weeks_spanned(start_date, end_date);

        let legend_last_row = (LEGEND_HEADER_ROW + legend_rows as u32).max(LEGEND_MIN_LAST_ROW);
        let calendar_start_row = legend_last_row + CALENDAR_GAP;
        let start_column = CALENDAR_START_COLUMN;

        let week_rows = (0..week_count as u32)
            .map(|week| calendar_start_row + (tier.rows_per_day + 1) * week + 1)
            .collect();
        let day_columns = (0..7u32)
            .map(|day| start_column + BLOCKS_PER_BAND as u32 * day + 1)
            .collect();

        Ok(Self {
            start_date,
            end_date,
            first_monday: time::week_start(start_date),
            week_count,
            tier,
            legend_rows,
            legend_header_row: LEGEND_HEADER_ROW,
            legend_columns: LEGEND_COLUMNS,
            calendar_start_row,
            start_column,
            week_rows,
            day_columns,
            date_column_width: DATE_COLUMN_WIDTH,
        })
    }

    /// Date shown in `day` (0 = Monday) of week band `week`.
    pub fn date_at(&self, week: usize, day: usize) -> NaiveDate {
        let offset = day as i64 - i64::from(self.start_date.weekday().num_days_from_monday())
            + 7 * week as i64;
        self.start_date + Duration::days(offset)
    }

    pub fn date_header_position(&self, week: usize, day: usize) -> CellPosition {
        CellPosition {
            row: self.week_rows[week],
            column: self.day_columns[day],
        }
    }

    /// Top-left cell of block `block` within a day.
    pub fn block_position(&self, week: usize, day: usize, block: usize) -> CellPosition {
        let band = (block / BLOCKS_PER_BAND) as u32;
        let across = (block % BLOCKS_PER_BAND) as u32;
        CellPosition {
            row: self.week_rows[week] + 1 + BLOCK_HEIGHT * band,
            column: self.day_columns[day] + across,
        }
    }

    /// Sheet columns that take [`DATE_COLUMN_WIDTH`].
    pub fn calendar_columns(&self) -> std::ops::RangeInclusive<u32> {
        self.start_column + 1..=self.start_column + 7 * BLOCKS_PER_BAND as u32
    }
}

/// One placed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub module_code: String,
    pub time_range: String,
    pub class_type: String,
    pub location: String,
    pub description: String,
    pub color: &'static str,
    pub position: CellPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub week: usize,
    pub weekday: &'static str,
    pub date: NaiveDate,
    pub header: CellPosition,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub cohort: String,
    pub module_code: String,
    pub description: String,
    pub lecturer: String,
    pub color: &'static str,
    pub row: u32,
}

/// A complete grid ready for a spreadsheet writer.
#[derive(Debug, Clone, Serialize)]
pub struct GridLayout {
    pub plan: GridPlan,
    pub legend: Vec<LegendEntry>,
    /// Row-major: week 0 Monday..Sunday, then week 1, and so on.
    pub cells: Vec<DayCell>,
    /// Records that did not fit their day cell.
    pub dropped_blocks: usize,
}

impl GridLayout {
    pub fn cell(&self, week: usize, day: usize) -> Option<&DayCell> {
        if day >= 7 {
            return None;
        }
        self.cells.get(week * 7 + day)
    }

    pub fn placed_blocks(&self) -> usize {
        self.cells.iter().map(|cell| cell.blocks.len()).sum()
    }
}

/// Builds a [`GridLayout`] from a controller's working set.
///
/// The working set is read, never consumed: placement walks a sorted copy.
pub struct CalendarGridBuilder<'a> {
    controller: &'a ScheduleController,
}

impl<'a> CalendarGridBuilder<'a> {
    pub fn new(controller: &'a ScheduleController) -> Self {
        Self { controller }
    }

    pub fn build(&self) -> TimetableResult<GridLayout> {
        let records = sort(self.controller.snapshot(), Field::DateTime, SortOrder::Ascending);
        let (first, last) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (first.date(), last.date()),
            _ => {
                return Err(TimetableError::DateRangeUndefined(
                    "the working set is empty".to_string(),
                ))
            }
        };

        let legend = build_legend(self.controller.module_set());
        let plan = GridPlan::new(
            first,
            last,
            self.controller.max_duplicate_count(),
            legend.len(),
        )?;
        debug!(
            "Grid plan: {} week(s) from {}, tier {:?}",
            plan.week_count, plan.first_monday, plan.tier
        );

        let colors: HashMap<&str, &'static str> = legend
            .iter()
            .map(|entry| (entry.description.as_str(), entry.color))
            .collect();
        let (cells, dropped_blocks) = place(&plan, &records, &colors);

        Ok(GridLayout {
            plan,
            legend,
            cells,
            dropped_blocks,
        })
    }
}

fn build_legend(modules: Vec<Arc<Record>>) -> Vec<LegendEntry> {
    modules
        .iter()
        .enumerate()
        .map(|(index, record)| LegendEntry {
            cohort: record.cohort().to_string(),
            module_code: record.module_code().to_string(),
            description: record.description().to_string(),
            lecturer: record.lecturer().to_string(),
            color: PALETTE[index % PALETTE.len()],
            row: legend_row(index),
        })
        .collect()
}

/// Merge the chronologically sorted `records` into the day cells of `plan`.
fn place(
    plan: &GridPlan,
    records: &[Arc<Record>],
    colors: &HashMap<&str, &'static str>,
) -> (Vec<DayCell>, usize) {
    let capacity = plan.tier.blocks_per_day;
    let mut cells = Vec::with_capacity(plan.week_count * 7);
    let mut cursor = 0;
    let mut dropped = 0;

    for week in 0..plan.week_count {
        for day in 0..7 {
            let date = plan.date_at(week, day);
            let mut blocks = Vec::new();
            let mut overflow = 0;

            while let Some(record) = records.get(cursor).filter(|r| r.date() == date) {
                if blocks.len() < capacity {
                    let description = record.description();
                    blocks.push(Block {
                        module_code: record.module_code().to_string(),
                        time_range: record.time_range(),
                        class_type: record.class_type().to_string(),
                        location: record.location().to_string(),
                        description: description.to_string(),
                        color: colors.get(description).copied().unwrap_or(PALETTE[0]),
                        position: plan.block_position(week, day, blocks.len()),
                    });
                } else {
                    overflow += 1;
                }
                cursor += 1;
            }

            if overflow > 0 {
                warn!(
                    "{} record(s) on {} exceed the {} blocks available per day and were not placed",
                    overflow,
                    date.format(time::DATE_FORMAT),
                    capacity
                );
                dropped += overflow;
            }

            cells.push(DayCell {
                week,
                weekday: time::WEEKDAY_NAMES[day],
                date,
                header: plan.date_header_position(week, day),
                blocks,
            });
        }
    }

    if cursor < records.len() {
        warn!(
            "{} record(s) fall outside the planned date range",
            records.len() - cursor
        );
        dropped += records.len() - cursor;
    }

    (cells, dropped)
}
