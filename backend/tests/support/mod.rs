#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use timetable_rust::models::{RawRecord, Record};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to process-global
/// env vars, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub const HEADER: [&str; 12] = [
    "No",
    "Identifier",
    "Description",
    "Activity date",
    "Scheduled Day",
    "Scheduled Start Time",
    "Scheduled End Time",
    "Duration",
    "Allocated Location Name",
    "Planned Size",
    "Allocated Staff Name",
    "Zone Name",
];

/// One timetable entry, described with the handful of values tests vary.
#[derive(Debug, Clone)]
pub struct Entry {
    pub code: &'static str,
    pub description: &'static str,
    pub date: &'static str,
    pub day: &'static str,
    pub start: &'static str,
    pub end: &'static str,
    pub location: &'static str,
    pub size: i64,
    pub lecturer: &'static str,
}

impl Entry {
    pub fn raw(&self) -> RawRecord {
        RawRecord {
            identifier: format!("CS_2025_FT_{}_LEC", self.code),
            description: format!("{} (2025)", self.description),
            date: self.date.to_string(),
            day: self.day.to_string(),
            start_time: self.start.to_string(),
            end_time: self.end.to_string(),
            duration: "01:00".to_string(),
            location: self.location.to_string(),
            size: self.size.to_string(),
            lecturer: self.lecturer.to_string(),
            zone: "Main".to_string(),
        }
    }

    pub fn record(&self) -> Record {
        Record::from_raw(&self.raw()).unwrap()
    }
}

const fn entry(
    code: &'static str,
    description: &'static str,
    date: &'static str,
    day: &'static str,
    start: &'static str,
    location: &'static str,
    size: i64,
) -> Entry {
    Entry {
        code,
        description,
        date,
        day,
        start,
        end: "18:00:00",
        location,
        size,
        lecturer: "Dr Osei",
    }
}

/// Two weeks of classes: 10/03/2025 is a Monday, 16/03/2025 a Sunday.
pub fn sample_entries() -> Vec<Entry> {
    vec![
        entry("CSC101", "Algorithms", "12/03/2025", "Wednesday", "09:00:00", "Room B", 30),
        entry("CSC102", "Databases", "10/03/2025", "Monday", "10:00:00", "Room A", 40),
        entry("CSC103", "Networks", "14/03/2025", "Friday", "09:00:00", "Room C", 40),
        entry("CSC101", "Algorithms", "10/03/2025", "Monday", "13:00:00", "Room A", 20),
        entry("CSC104", "Security", "16/03/2025", "Sunday", "15:00:00", "Room B", 60),
        entry("CSC102", "Databases", "18/03/2025", "Tuesday", "11:00:00", "Room C", 35),
    ]
}

pub fn sample_records() -> Vec<Record> {
    sample_entries().iter().map(Entry::record).collect()
}

/// Write `entries` as a timetable export named `name` inside `dir`.
pub fn write_export(dir: &Path, name: &str, entries: &[Entry]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(HEADER).unwrap();
    for (index, entry) in entries.iter().enumerate() {
        let raw = entry.raw();
        let number = (index + 1).to_string();
        writer
            .write_record([
                number.as_str(),
                raw.identifier.as_str(),
                raw.description.as_str(),
                raw.date.as_str(),
                raw.day.as_str(),
                raw.start_time.as_str(),
                raw.end_time.as_str(),
                raw.duration.as_str(),
                raw.location.as_str(),
                raw.size.as_str(),
                raw.lecturer.as_str(),
                raw.zone.as_str(),
            ])
            .unwrap();
    }
    writer.flush().unwrap();
    path
}

pub fn write_text(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn codes(records: &[impl std::ops::Deref<Target = Record>]) -> Vec<String> {
    records.iter().map(|r| r.module_code().to_string()).collect()
}
