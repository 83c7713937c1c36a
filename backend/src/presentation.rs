//! Column-header sort toggling for table views.
//!
//! This is view state: the controller only ever receives an explicit
//! [`SortOrder`].

use std::collections::HashMap;

use crate::algorithms::SortOrder;
use crate::models::Field;

/// Sort state of one column.
///
/// The descending third of the cycle has no variant of its own: the click
/// that sorts descending also returns the column to `Unsorted`, so the next
/// click sorts ascending again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSortState {
    #[default]
    Unsorted,
    Ascending,
}

/// Tracks header clicks across all columns of a table.
///
/// The first click on a column sorts ascending, the second descending, after
/// which the column starts over. Clicking one column resets all the others.
#[derive(Debug, Clone, Default)]
pub struct ColumnSortTracker {
    states: HashMap<Field, ColumnSortState>,
}

impl ColumnSortTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a click on `field` and return the order to apply.
    pub fn click(&mut self, field: Field) -> SortOrder {
        let previous = self.state(field);
        self.states.clear();
        match previous {
            ColumnSortState::Unsorted => {
                self.states.insert(field, ColumnSortState::Ascending);
                SortOrder::Ascending
            }
            ColumnSortState::Ascending => SortOrder::Descending,
        }
    }

    pub fn state(&self, field: Field) -> ColumnSortState {
        self.states.get(&field).copied().unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.states.clear();
    }
}
