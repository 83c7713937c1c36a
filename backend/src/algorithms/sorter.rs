//! Field-keyed sorting on top of [`OrderedHeap`].

use serde::{Deserialize, Serialize};

use super::heap::OrderedHeap;
use crate::models::{Field, FieldLookup};

/// Direction of a sort request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Sort `items` by `field`, returning a new sequence.
///
/// Descending order is the exact reverse of the ascending drain. Records with
/// equal keys keep no particular relative order.
pub fn sort<T, I>(items: I, field: Field, order: SortOrder) -> Vec<T>
where
    T: FieldLookup,
    I: IntoIterator<Item = T>,
{
    let mut sorted = OrderedHeap::heapify(field, items).drain();
    if order == SortOrder::Descending {
        sorted.reverse();
    }
    sorted
}

/// Ascending sort of a borrowed sequence.
pub fn sorted_by<T>(items: &[T], field: Field) -> Vec<T>
where
    T: FieldLookup + Clone,
{
    sort(items.iter().cloned(), field, SortOrder::Ascending)
}
