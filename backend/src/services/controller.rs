//! Working-set controller: multi-field filtering, sorting and aggregates.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::algorithms::{range_filter, sort, sorted_by, SortOrder, MULTI_VALUE_DELIMITER};
use crate::error::{TimetableError, TimetableResult};
use crate::models::{Field, FieldLookup, FieldValue, Record};

/// One per-field constraint. `None` means the field is unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: Field,
    #[serde(default)]
    pub value: Option<String>,
}

/// Ordered list of field constraints, applied left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleQuery {
    filters: Vec<FieldFilter>,
}

impl ScheduleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain `field` to `value`. A later call for the same field
    /// replaces the earlier value in place.
    pub fn with(self, field: Field, value: impl Into<String>) -> Self {
        self.with_optional(field, Some(value.into()))
    }

    /// Constrain `field` to any of `values`.
    pub fn with_any_of<S: AsRef<str>>(self, field: Field, values: &[S]) -> Self {
        let joined = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join(MULTI_VALUE_DELIMITER);
        self.with(field, joined)
    }

    pub fn with_optional(mut self, field: Field, value: Option<String>) -> Self {
        match self.filters.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.value = value,
            None => self.filters.push(FieldFilter { field, value }),
        }
        self
    }

    /// Clear the constraint on `field`, keeping its position.
    pub fn without(self, field: Field) -> Self {
        self.with_optional(field, None)
    }

    /// Constraints that carry a value, in application order.
    pub fn active(&self) -> impl Iterator<Item = (Field, &str)> {
        self.filters
            .iter()
            .filter_map(|f| f.value.as_deref().map(|v| (f.field, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

impl FromIterator<FieldFilter> for ScheduleQuery {
    fn from_iter<I: IntoIterator<Item = FieldFilter>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |query, f| query.with_optional(f.field, f.value))
    }
}

/// Holds the loaded records and the working set currently in view.
///
/// Every mutating call computes a new sequence and swaps it in, so a failed
/// filter leaves the previous working set untouched.
#[derive(Debug, Clone, Default)]
pub struct ScheduleController {
    records: Vec<Arc<Record>>,
    processed: Vec<Arc<Record>>,
}

impl ScheduleController {
    pub fn new(records: Vec<Record>) -> Self {
        Self::from_shared(records.into_iter().map(Arc::new).collect())
    }

    pub fn from_shared(records: Vec<Arc<Record>>) -> Self {
        Self {
            processed: records.clone(),
            records,
        }
    }

    /// Discard everything and start over from a freshly loaded record set.
    pub fn reload(&mut self, records: Vec<Record>) {
        *self = Self::new(records);
        info!("Controller reloaded with {} records", self.records.len());
    }

    /// Filter the full record set by every active constraint in `query`
    /// (AND across fields) and sort the result by `sort_by`.
    ///
    /// Returns the size of the new working set. An empty result is not an
    /// error; callers report it via [`ScheduleController::require_records`].
    pub fn control(&mut self, sort_by: Field, query: &ScheduleQuery) -> TimetableResult<usize> {
        let narrowed = Self::narrow(self.records.clone(), query)?;
        self.processed = sort(narrowed, sort_by, SortOrder::Ascending);
        info!(
            "Query kept {} of {} records, sorted by {}",
            self.processed.len(),
            self.records.len(),
            sort_by
        );
        Ok(self.processed.len())
    }

    /// Like [`ScheduleController::control`], but narrows the current working
    /// set instead of starting from the full record set.
    pub fn refine(&mut self, sort_by: Field, query: &ScheduleQuery) -> TimetableResult<usize> {
        let narrowed = Self::narrow(self.processed.clone(), query)?;
        self.processed = sort(narrowed, sort_by, SortOrder::Ascending);
        Ok(self.processed.len())
    }

    fn narrow(
        mut working: Vec<Arc<Record>>,
        query: &ScheduleQuery,
    ) -> TimetableResult<Vec<Arc<Record>>> {
        for (field, value) in query.active() {
            working = range_filter::filter(&working, field, value)?;
            debug!("{} = {:?} leaves {} records", field, value, working.len());
        }
        Ok(working)
    }

    /// Re-sort the working set without refiltering.
    pub fn sort_processed(&mut self, field: Field, order: SortOrder) {
        let current = std::mem::take(&mut self.processed);
        self.processed = sort(current, field, order);
    }

    pub fn processed(&self) -> &[Arc<Record>] {
        &self.processed
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    /// Copy of the working set for read paths that consume their input.
    pub fn snapshot(&self) -> Vec<Arc<Record>> {
        self.processed.clone()
    }

    /// Fail with [`TimetableError::NoRecords`] when nothing is in view.
    pub fn require_records(&self) -> TimetableResult<&[Arc<Record>]> {
        if self.processed.is_empty() {
            return Err(TimetableError::NoRecords);
        }
        Ok(&self.processed)
    }

    /// Every value of `field` in the working set, ascending.
    pub fn items(&self, field: Field) -> Vec<FieldValue> {
        sorted_by(&self.processed, field)
            .iter()
            .map(|record| record.field(field))
            .collect()
    }

    /// Unique values of `field` in ascending order.
    pub fn distinct_values(&self, field: Field) -> Vec<FieldValue> {
        let mut values = self.items(field);
        values.dedup();
        values
    }

    /// One record per distinct description, ascending by description.
    pub fn module_set(&self) -> Vec<Arc<Record>> {
        let mut modules: Vec<Arc<Record>> = Vec::new();
        for record in sorted_by(&self.processed, Field::Description) {
            let is_new = modules
                .last()
                .map_or(true, |last| last.description() != record.description());
            if is_new {
                modules.push(record);
            }
        }
        modules
    }

    /// Largest number of records sharing one calendar date.
    pub fn max_duplicate_count(&self) -> usize {
        let dates = self.items(Field::Date);
        dates
            .chunk_by(|a, b| a == b)
            .map(|run| run.len())
            .max()
            .unwrap_or(0)
    }
}
