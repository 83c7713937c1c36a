//! Timetable records.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{ParseContext, TimetableError, TimetableResult};
use crate::models::field::{Field, FieldLookup, FieldValue};
use crate::models::time;

/// The eleven string columns of one source row, before any typing.
///
/// Column order follows the source files (after the leading row label):
/// identifier, description, date, day, start, end, duration, location,
/// planned size, lecturer, zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub identifier: String,
    pub description: String,
    pub date: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
    pub location: String,
    pub size: String,
    pub lecturer: String,
    pub zone: String,
}

impl RawRecord {
    /// Number of columns a raw record occupies.
    pub const COLUMNS: usize = 11;

    /// Build from positional column values. Returns `None` unless exactly
    /// [`RawRecord::COLUMNS`] values are supplied.
    pub fn from_columns<I, S>(columns: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut it = columns.into_iter().map(Into::into);
        let raw = RawRecord {
            identifier: it.next()?,
            description: it.next()?,
            date: it.next()?,
            day: it.next()?,
            start_time: it.next()?,
            end_time: it.next()?,
            duration: it.next()?,
            location: it.next()?,
            size: it.next()?,
            lecturer: it.next()?,
            zone: it.next()?,
        };
        if it.next().is_some() {
            return None;
        }
        Some(raw)
    }
}

/// One timetable entry.
///
/// Fields are fixed at construction. Formatted views (date string, time range,
/// combined instant) are computed on each call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    cohort: String,
    study_mode: String,
    module_code: String,
    class_type: String,
    description: String,
    date: NaiveDate,
    weekday: Weekday,
    start_time: NaiveTime,
    end_time: NaiveTime,
    duration: NaiveTime,
    lecturer: String,
    location: String,
    size: i64,
    zone: String,
}

impl Record {
    /// Parse a raw row.
    ///
    /// The identifier is split on `_`: the first two segments form the cohort,
    /// followed by study mode, module code and class type. The weekday comes
    /// from the day column alone and may disagree with the date.
    pub fn from_raw(raw: &RawRecord) -> TimetableResult<Self> {
        let segments: Vec<&str> = raw.identifier.split('_').collect();
        if segments.len() < 5 {
            return Err(TimetableError::parse(
                "identifier must have at least five '_'-separated segments",
                ParseContext::new("Identifier", raw.identifier.as_str()),
            ));
        }

        let date = time::parse_date(&raw.date).map_err(|e| {
            TimetableError::parse(
                format!("invalid date: {}", e),
                ParseContext::new("Activity date", raw.date.as_str()),
            )
        })?;
        let weekday = time::parse_weekday(&raw.day).ok_or_else(|| {
            TimetableError::parse(
                "invalid day",
                ParseContext::new("Scheduled Day", raw.day.as_str()),
            )
        })?;
        let start_time = time::parse_time(&raw.start_time).map_err(|e| {
            TimetableError::parse(
                format!("invalid start time: {}", e),
                ParseContext::new("Scheduled Start Time", raw.start_time.as_str()),
            )
        })?;
        let end_time = time::parse_time(&raw.end_time).map_err(|e| {
            TimetableError::parse(
                format!("invalid end time: {}", e),
                ParseContext::new("Scheduled End Time", raw.end_time.as_str()),
            )
        })?;
        let duration = time::parse_duration(&raw.duration).map_err(|e| {
            TimetableError::parse(
                format!("invalid duration: {}", e),
                ParseContext::new("Duration", raw.duration.as_str()),
            )
        })?;
        let size = raw.size.trim().parse::<i64>().map_err(|e| {
            TimetableError::parse(
                format!("invalid planned size: {}", e),
                ParseContext::new("Planned Size", raw.size.as_str()),
            )
        })?;

        Ok(Self {
            cohort: segments[..2].join("_"),
            study_mode: segments[2].to_string(),
            module_code: segments[3].to_string(),
            class_type: segments[4].to_string(),
            description: raw.description.clone(),
            date,
            weekday,
            start_time,
            end_time,
            duration,
            lecturer: raw.lecturer.clone(),
            location: raw.location.clone(),
            size,
            zone: raw.zone.clone(),
        })
    }

    pub fn cohort(&self) -> &str {
        &self.cohort
    }

    pub fn study_mode(&self) -> &str {
        &self.study_mode
    }

    pub fn module_code(&self) -> &str {
        &self.module_code
    }

    pub fn class_type(&self) -> &str {
        &self.class_type
    }

    /// Description without the parenthesised suffix.
    pub fn description(&self) -> &str {
        self.description
            .split(" (")
            .next()
            .unwrap_or(&self.description)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn lecturer(&self) -> &str {
        &self.lecturer
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn date_str(&self) -> String {
        self.date.format(time::DATE_FORMAT).to_string()
    }

    pub fn day_name(&self) -> &'static str {
        time::weekday_name(self.weekday)
    }

    pub fn start_time_str(&self) -> String {
        self.start_time.format(time::TIME_FORMAT).to_string()
    }

    pub fn end_time_str(&self) -> String {
        self.end_time.format(time::TIME_FORMAT).to_string()
    }

    /// `HH:MM ~ HH:MM`
    pub fn time_range(&self) -> String {
        format!(
            "{} ~ {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }

    pub fn duration_str(&self) -> String {
        self.duration.format(time::DURATION_FORMAT).to_string()
    }

    /// Activity date at its start time.
    pub fn date_time(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// True when the day column names a different weekday than the date.
    pub fn has_weekday_mismatch(&self) -> bool {
        self.date.weekday() != self.weekday
    }
}

impl FieldLookup for Record {
    fn field(&self, field: Field) -> FieldValue {
        match field {
            Field::Cohort => FieldValue::Text(self.cohort.clone()),
            Field::StudyMode => FieldValue::Text(self.study_mode.clone()),
            Field::ModuleCode => FieldValue::Text(self.module_code.clone()),
            Field::ClassType => FieldValue::Text(self.class_type.clone()),
            Field::Description => FieldValue::Text(self.description().to_string()),
            Field::Date | Field::StartDate | Field::EndDate => FieldValue::Date(self.date),
            Field::DateStr => FieldValue::Text(self.date_str()),
            Field::Day => FieldValue::Integer(i64::from(self.weekday.num_days_from_monday())),
            Field::DayStr => FieldValue::Text(self.day_name().to_string()),
            Field::StartTime => FieldValue::Time(self.start_time),
            Field::StartTimeStr => FieldValue::Text(self.start_time_str()),
            Field::EndTime => FieldValue::Time(self.end_time),
            Field::EndTimeStr => FieldValue::Text(self.end_time_str()),
            Field::Time => FieldValue::Text(self.time_range()),
            Field::Duration => FieldValue::Text(self.duration_str()),
            Field::Lecturer => FieldValue::Text(self.lecturer.clone()),
            Field::Location => FieldValue::Text(self.location.clone()),
            Field::Size | Field::MinSize | Field::MaxSize => FieldValue::Integer(self.size),
            Field::SizeStr => FieldValue::Text(self.size.to_string()),
            Field::Zone => FieldValue::Text(self.zone.clone()),
            Field::DateTime => FieldValue::DateTime(self.date_time()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawRecord {
        RawRecord {
            identifier: "CS_2025_FT_CSC1001_LEC".into(),
            description: "Programming Fundamentals (Semester 1)".into(),
            date: "12/03/2025".into(),
            day: "Wednesday".into(),
            start_time: "09:00:00".into(),
            end_time: "11:00:00".into(),
            duration: "02:00".into(),
            location: "Room A".into(),
            size: "40".into(),
            lecturer: "Dr Lee".into(),
            zone: "North".into(),
        }
    }

    #[test]
    fn test_identifier_split() {
        let record = Record::from_raw(&raw()).unwrap();
        assert_eq!(record.cohort(), "CS_2025");
        assert_eq!(record.study_mode(), "FT");
        assert_eq!(record.module_code(), "CSC1001");
        assert_eq!(record.class_type(), "LEC");
    }

    #[test]
    fn test_short_identifier_fails() {
        let mut r = raw();
        r.identifier = "CS_2025_FT".into();
        let err = Record::from_raw(&r).unwrap_err();
        assert!(matches!(err, TimetableError::Parse { .. }));
    }

    #[test]
    fn test_derived_views() {
        let record = Record::from_raw(&raw()).unwrap();
        assert_eq!(record.description(), "Programming Fundamentals");
        assert_eq!(record.date_str(), "12/03/2025");
        assert_eq!(record.day_name(), "Wednesday");
        assert_eq!(record.time_range(), "09:00 ~ 11:00");
        assert_eq!(record.duration_str(), "02:00");
        assert_eq!(record.start_time_str(), "09:00:00");
        assert_eq!(
            record.date_time(),
            NaiveDate::from_ymd_opt(2025, 3, 12)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_weekday_is_independent_of_date() {
        let mut r = raw();
        r.day = "Friday".into();
        let record = Record::from_raw(&r).unwrap();
        assert_eq!(record.field(Field::Day), FieldValue::Integer(4));
        assert_eq!(record.field(Field::DayStr), FieldValue::Text("Friday".into()));
        assert!(record.has_weekday_mismatch());
    }

    #[test]
    fn test_malformed_values_fail() {
        for mutate in [
            (|r: &mut RawRecord| r.date = "2025/03/12".into()) as fn(&mut RawRecord),
            |r| r.start_time = "9am".into(),
            |r| r.end_time = "11:00".into(),
            |r| r.duration = "two hours".into(),
            |r| r.size = "many".into(),
            |r| r.day = "Caturday".into(),
        ] {
            let mut r = raw();
            mutate(&mut r);
            assert!(Record::from_raw(&r).is_err(), "{:?} should not parse", r);
        }
    }

    #[test]
    fn test_field_lookup_by_name() {
        let record = Record::from_raw(&raw()).unwrap();
        assert_eq!(
            record.field_named("Allocated Location Name").unwrap(),
            FieldValue::Text("Room A".into())
        );
        assert_eq!(record.field_named("Size").unwrap(), FieldValue::Integer(40));
        assert_eq!(
            record.field_named("Time").unwrap(),
            FieldValue::Text("09:00 ~ 11:00".into())
        );
        assert!(matches!(
            record.field_named("Colour"),
            Err(TimetableError::UnsupportedField(_))
        ));
    }

    #[test]
    fn test_from_columns_requires_exact_arity() {
        let cols = vec!["a"; RawRecord::COLUMNS];
        assert!(RawRecord::from_columns(cols).is_some());
        assert!(RawRecord::from_columns(vec!["a"; 10]).is_none());
        assert!(RawRecord::from_columns(vec!["a"; 12]).is_none());
    }
}
