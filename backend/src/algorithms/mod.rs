//! Ordering and range-query algorithms over timetable records.
//!
//! Every function here is value-in/value-out: inputs are borrowed or consumed
//! and a new sequence is returned, so filters and sorts compose freely.
//!
//! # Components
//!
//! - [`heap`]: binary min-heap keyed by a record field
//! - [`sorter`]: ascending/descending sort built on the heap
//! - [`range_filter`]: exact, bounded and multi-valued binary-search filters
//!
//! # Example
//!
//! ```ignore
//! use timetable_rust::algorithms::{range_filter, sort, SortOrder};
//! use timetable_rust::models::Field;
//!
//! let in_room_a = range_filter::filter(&records, Field::Location, "Room A")?;
//! let by_date = sort(in_room_a, Field::Date, SortOrder::Ascending);
//! ```

pub mod heap;
pub mod range_filter;
pub mod sorter;


pub use heap::OrderedHeap;
pub use range_filter::{RangeQuery, MULTI_VALUE_DELIMITER};
pub use sorter::{sort, sorted_by, SortOrder};
