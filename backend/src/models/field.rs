//! Named record fields and their values.
//!
//! [`Field`] is the closed set of names every component uses to address a
//! record attribute. Unknown names are rejected once, when the name is parsed,
//! so sorting, filtering and aggregation never deal with unrecognised fields.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};
use crate::models::time;

/// A record attribute, including derived and string-formatted variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Field {
    Cohort,
    StudyMode,
    ModuleCode,
    ClassType,
    /// Description up to the first ` (`
    Description,
    Date,
    /// Date used as an inclusive lower bound
    StartDate,
    /// Date used as an inclusive upper bound
    EndDate,
    DateStr,
    /// Weekday index from the day column, 0 = Monday
    Day,
    DayStr,
    StartTime,
    StartTimeStr,
    EndTime,
    EndTimeStr,
    /// `HH:MM ~ HH:MM`
    Time,
    Duration,
    Lecturer,
    Location,
    Size,
    /// Capacity used as an inclusive lower bound
    MinSize,
    /// Capacity used as an inclusive upper bound
    MaxSize,
    SizeStr,
    Zone,
    /// Date combined with start time
    DateTime,
}

/// How [`crate::algorithms::range_filter`] interprets a query on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// One value, matched as a contiguous run of equal keys
    Exact,
    /// Keep every record whose key is at least the bound
    AtLeast,
    /// Keep every record whose key is at most the bound
    AtMost,
    /// `&&&`-joined set of literal values, each matched exactly
    AnyOf,
}

impl Field {
    pub const ALL: [Field; 25] = [
        Field::Cohort,
        Field::StudyMode,
        Field::ModuleCode,
        Field::ClassType,
        Field::Description,
        Field::Date,
        Field::StartDate,
        Field::EndDate,
        Field::DateStr,
        Field::Day,
        Field::DayStr,
        Field::StartTime,
        Field::StartTimeStr,
        Field::EndTime,
        Field::EndTimeStr,
        Field::Time,
        Field::Duration,
        Field::Lecturer,
        Field::Location,
        Field::Size,
        Field::MinSize,
        Field::MaxSize,
        Field::SizeStr,
        Field::Zone,
        Field::DateTime,
    ];

    /// Canonical name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Cohort => "Cohort",
            Field::StudyMode => "Study_Mode",
            Field::ModuleCode => "Module_Code",
            Field::ClassType => "Class_Type",
            Field::Description => "Description",
            Field::Date => "Date",
            Field::StartDate => "Start_Date",
            Field::EndDate => "End_Date",
            Field::DateStr => "Date_str",
            Field::Day => "Day",
            Field::DayStr => "Day_str",
            Field::StartTime => "Start_Time",
            Field::StartTimeStr => "Start_Time_str",
            Field::EndTime => "End_Time",
            Field::EndTimeStr => "End_Time_str",
            Field::Time => "Time",
            Field::Duration => "Duration",
            Field::Lecturer => "Lecturer",
            Field::Location => "Location",
            Field::Size => "Size",
            Field::MinSize => "Min_Size",
            Field::MaxSize => "Max_Size",
            Field::SizeStr => "Size_str",
            Field::Zone => "Zone",
            Field::DateTime => "Date_Time",
        }
    }

    pub fn filter_kind(&self) -> FilterKind {
        match self {
            Field::Date | Field::StartTime | Field::EndTime | Field::Size | Field::DateTime => {
                FilterKind::Exact
            }
            Field::StartDate | Field::MinSize => FilterKind::AtLeast,
            Field::EndDate | Field::MaxSize => FilterKind::AtMost,
            _ => FilterKind::AnyOf,
        }
    }

    /// Interpret a raw query string as a value comparable with this field.
    pub fn parse_value(&self, raw: &str) -> TimetableResult<FieldValue> {
        let invalid = |expected: &str| {
            TimetableError::invalid_query(self, format!("expected {}, got {:?}", expected, raw))
        };
        match self {
            Field::Date | Field::StartDate | Field::EndDate => time::parse_date(raw)
                .map(FieldValue::Date)
                .map_err(|_| invalid("a DD/MM/YYYY date")),
            Field::DateTime => time::parse_date_time(raw)
                .map(FieldValue::DateTime)
                .map_err(|_| invalid("a DD/MM/YYYY HH:MM:SS instant")),
            Field::StartTime | Field::EndTime => time::parse_time(raw)
                .map(FieldValue::Time)
                .map_err(|_| invalid("an HH:MM:SS time")),
            Field::Size | Field::MinSize | Field::MaxSize => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| invalid("an integer capacity")),
            Field::Day => match raw.trim().parse::<i64>() {
                Ok(index) if (0..7).contains(&index) => Ok(FieldValue::Integer(index)),
                _ => time::parse_weekday(raw)
                    .map(|day| FieldValue::Integer(i64::from(day.num_days_from_monday())))
                    .ok_or_else(|| invalid("a weekday name or index 0-6")),
            },
            _ => Ok(FieldValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "Cohort" => Field::Cohort,
            "Study_Mode" => Field::StudyMode,
            "Module_Code" => Field::ModuleCode,
            "Class_Type" => Field::ClassType,
            "Description" => Field::Description,
            "Activity date" | "Date" => Field::Date,
            "Start_Date" => Field::StartDate,
            "End_Date" => Field::EndDate,
            "Date_str" => Field::DateStr,
            "Scheduled Day" | "Day" => Field::Day,
            "Day_str" => Field::DayStr,
            "Scheduled Start Time" | "Start_Time" => Field::StartTime,
            "Start_Time_str" => Field::StartTimeStr,
            "Scheduled End Time" | "End_Time" => Field::EndTime,
            "End_Time_str" => Field::EndTimeStr,
            "Time" => Field::Time,
            "Duration" => Field::Duration,
            "Allocated Staff Name" | "Lecturer" => Field::Lecturer,
            "Allocated Location Name" | "Location" => Field::Location,
            "Planned Size" | "Size" => Field::Size,
            "Min_Size" => Field::MinSize,
            "Max_Size" => Field::MaxSize,
            "Size_str" => Field::SizeStr,
            "Zone Name" | "Zone" => Field::Zone,
            "Date_Time" => Field::DateTime,
            other => return Err(TimetableError::UnsupportedField(other.to_string())),
        };
        Ok(field)
    }
}

impl TryFrom<String> for Field {
    type Error = TimetableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Field> for String {
    fn from(field: Field) -> Self {
        field.as_str().to_string()
    }
}

/// A resolved field value.
///
/// Values of one field always share a variant, so the derived ordering only
/// ever compares like with like.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Date(d) => write!(f, "{}", d.format(time::DATE_FORMAT)),
            FieldValue::Time(t) => write!(f, "{}", t.format(time::TIME_FORMAT)),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format(time::DATE_TIME_FORMAT)),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Field-name-keyed access to a record.
///
/// Implemented by [`crate::models::Record`] and by the shared handles the
/// controller stores, so the ordering and filtering algorithms stay generic.
pub trait FieldLookup {
    fn field(&self, field: Field) -> FieldValue;

    /// Resolve a field given by name.
    fn field_named(&self, name: &str) -> TimetableResult<FieldValue> {
        Ok(self.field(name.parse()?))
    }
}

impl<T: FieldLookup + ?Sized> FieldLookup for &T {
    fn field(&self, field: Field) -> FieldValue {
        (**self).field(field)
    }
}

impl<T: FieldLookup + ?Sized> FieldLookup for Arc<T> {
    fn field(&self, field: Field) -> FieldValue {
        (**self).field(field)
    }
}
