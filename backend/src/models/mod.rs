//! Record model: typed timetable entries and the field names used to query them.

pub mod field;
pub mod record;
pub mod time;

pub use field::*;
pub use record::*;
