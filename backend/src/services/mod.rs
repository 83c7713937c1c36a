//! Service layer: the working-set controller and the export builders that
//! read from it.
//!
//! The controller owns the records in view. The grid builder and the flat
//! report take it by shared reference and work on sorted copies.

pub mod calendar_grid;
pub mod controller;
pub mod report;


pub use calendar_grid::{
    CalendarGridBuilder, CellPosition, DayCell, DensityTier, GridLayout, GridPlan, LegendColumns,
    LegendEntry, LEGEND_COLUMNS, PALETTE,
};
pub use controller::{FieldFilter, ScheduleController, ScheduleQuery};
pub use report::{flat_report, write_grid_json, write_report_csv, ReportRow};
