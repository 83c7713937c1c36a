//! Binary-search range queries over field-sorted sequences.
//!
//! [`filter`] sorts its input by the queried field first, then extracts the
//! matching slice with a binary search. The input is never modified.

use log::debug;

use super::sorter::sorted_by;
use crate::error::TimetableResult;
use crate::models::{Field, FieldLookup, FieldValue, FilterKind};

/// Separator between the literal values of a multi-valued query.
pub const MULTI_VALUE_DELIMITER: &str = "&&&";

/// A parsed filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeQuery {
    Exact(FieldValue),
    AtLeast(FieldValue),
    AtMost(FieldValue),
    /// Union of exact matches
    AnyOf(Vec<FieldValue>),
}

impl RangeQuery {
    /// Parse a raw query string according to the field's [`FilterKind`].
    pub fn parse(field: Field, raw: &str) -> TimetableResult<Self> {
        let query = match field.filter_kind() {
            FilterKind::Exact => RangeQuery::Exact(field.parse_value(raw)?),
            FilterKind::AtLeast => RangeQuery::AtLeast(field.parse_value(raw)?),
            FilterKind::AtMost => RangeQuery::AtMost(field.parse_value(raw)?),
            FilterKind::AnyOf => RangeQuery::AnyOf(
                raw.split(MULTI_VALUE_DELIMITER)
                    .map(|value| field.parse_value(value))
                    .collect::<TimetableResult<Vec<_>>>()?,
            ),
        };
        Ok(query)
    }
}

/// Keep the records whose `field` satisfies the raw `query`.
///
/// The result is in ascending `field` order. For multi-valued queries the
/// matches of each value are concatenated in the order the values were given.
pub fn filter<T>(records: &[T], field: Field, query: &str) -> TimetableResult<Vec<T>>
where
    T: FieldLookup + Clone,
{
    let query = RangeQuery::parse(field, query)?;
    Ok(apply(records, field, &query))
}

/// Apply an already parsed query.
pub fn apply<T>(records: &[T], field: Field, query: &RangeQuery) -> Vec<T>
where
    T: FieldLookup + Clone,
{
    let sorted = sorted_by(records, field);
    let matched = match query {
        RangeQuery::Exact(value) => exact_run(&sorted, field, value).to_vec(),
        RangeQuery::AtLeast(bound) => at_least(&sorted, field, bound).to_vec(),
        RangeQuery::AtMost(bound) => at_most(&sorted, field, bound).to_vec(),
        RangeQuery::AnyOf(values) => values
            .iter()
            .flat_map(|value| exact_run(&sorted, field, value).iter().cloned())
            .collect(),
    };
    debug!(
        "filter {} kept {} of {} records",
        field,
        matched.len(),
        records.len()
    );
    matched
}

/// Contiguous run of records whose key equals `value`, or an empty slice.
///
/// `sorted` must be in ascending `field` order.
pub fn exact_run<'a, T: FieldLookup>(sorted: &'a [T], field: Field, value: &FieldValue) -> &'a [T] {
    let mut lo = 0;
    let mut hi = sorted.len();
    let mut hit = None;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let key = sorted[mid].field(field);
        if key == *value {
            hit = Some(mid);
            break;
        } else if key < *value {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    let Some(mid) = hit else {
        return &[];
    };

    let mut first = mid;
    while first > 0 && sorted[first - 1].field(field) == *value {
        first -= 1;
    }
    let mut last = mid;
    while last + 1 < sorted.len() && sorted[last + 1].field(field) == *value {
        last += 1;
    }
    &sorted[first..=last]
}

/// Suffix starting at the leftmost record whose key is at least `bound`.
pub fn at_least<'a, T: FieldLookup>(sorted: &'a [T], field: Field, bound: &FieldValue) -> &'a [T] {
    let start = sorted.partition_point(|record| record.field(field) < *bound);
    &sorted[start..]
}

/// Prefix ending at the rightmost record whose key is at most `bound`.
pub fn at_most<'a, T: FieldLookup>(sorted: &'a [T], field: Field, bound: &FieldValue) -> &'a [T] {
    let end = sorted.partition_point(|record| record.field(field) <= *bound);
    &sorted[..end]
}
