#[cfg(test)]
mod tests {
    use crate::error::TimetableError;
    use crate::io::loaders::{read_records, validate_file, ParsePolicy, ScheduleLoader};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const HEADER: &str = "No,Identifier,Description,Activity date,Scheduled Day,\
Scheduled Start Time,Scheduled End Time,Duration,Allocated Location Name,Planned Size,\
Allocated Staff Name,Zone Name";

    fn row(no: usize, code: &str, date: &str) -> String {
        format!(
            "{},CS_2025_FT_{}_LEC,Systems (Year 1),{},Monday,09:00:00,11:00:00,02:00,Room A,40,Dr Lee,North",
            no, code, date
        )
    }

    fn write(dir: &TempDir, name: &str, lines: &[String]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, lines.join("\n") + "\n").unwrap();
        path
    }

    fn valid_file(dir: &TempDir, name: &str, codes: &[&str]) -> PathBuf {
        let mut lines = vec![HEADER.to_string()];
        lines.extend(
            codes
                .iter()
                .enumerate()
                .map(|(i, code)| row(i + 1, code, "10/03/2025")),
        );
        write(dir, name, &lines)
    }

    #[test]
    fn test_validate_accepts_well_formed_file() {
        let dir = TempDir::new().unwrap();
        let path = valid_file(&dir, "week1.csv", &["C1", "C2"]);
        assert!(validate_file(&path).unwrap());
    }

    #[test]
    fn test_validate_rejects_header_only() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.csv", &[HEADER.to_string()]);
        assert!(!validate_file(&path).unwrap());
    }

    #[test]
    fn test_validate_rejects_wrong_header_width() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "narrow.csv",
            &["a,b,c".to_string(), "1,2,3".to_string()],
        );
        assert!(!validate_file(&path).unwrap());
    }

    #[test]
    fn test_validate_rejects_short_row() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "short.csv",
            &[
                HEADER.to_string(),
                row(1, "C1", "10/03/2025"),
                "2,CS_2025_FT_C2_LEC,Systems".to_string(),
            ],
        );
        assert!(!validate_file(&path).unwrap());
    }

    #[test]
    fn test_validate_rejects_other_extensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("week1.txt");
        fs::write(&path, format!("{}\n{}\n", HEADER, row(1, "C1", "10/03/2025"))).unwrap();
        assert!(!validate_file(&path).unwrap());
    }

    #[test]
    fn test_read_records_uses_columns_after_label() {
        let dir = TempDir::new().unwrap();
        let path = valid_file(&dir, "week1.csv", &["C1", "C2"]);
        let (records, skipped) = read_records(&path, ParsePolicy::Abort).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].module_code(), "C1");
        assert_eq!(records[0].cohort(), "CS_2025");
        assert_eq!(records[1].description(), "Systems");
        assert_eq!(records[1].size(), 40);
    }

    #[test]
    fn test_parse_error_aborts_with_location() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "bad.csv",
            &[
                HEADER.to_string(),
                row(1, "C1", "10/03/2025"),
                row(2, "C2", "31/02/2025"),
            ],
        );
        let err = read_records(&path, ParsePolicy::Abort).unwrap_err();
        match err {
            TimetableError::Parse { context, .. } => {
                assert_eq!(context.row, Some(2));
                assert_eq!(context.file, Some(path));
                assert_eq!(context.value.as_deref(), Some("31/02/2025"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_skipped_under_skip_policy() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "bad.csv",
            &[
                HEADER.to_string(),
                row(1, "C1", "10/03/2025"),
                row(2, "C2", "not a date"),
                row(3, "C3", "11/03/2025"),
            ],
        );
        let (records, skipped) = read_records(&path, ParsePolicy::Skip).unwrap();
        assert_eq!(skipped, 1);
        let codes: Vec<_> = records.iter().map(|r| r.module_code()).collect();
        assert_eq!(codes, vec!["C1", "C3"]);
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        valid_file(&dir, "b.csv", &["B1"]);
        valid_file(&dir, "a.csv", &["A1", "A2"]);
        write(&dir, "broken.csv", &[HEADER.to_string()]);
        fs::write(dir.path().join("notes.txt"), "not a timetable").unwrap();

        let report = ScheduleLoader::new(dir.path()).load().unwrap();

        let files: Vec<_> = report
            .files
            .iter()
            .map(|f| (f.name.as_str(), f.valid))
            .collect();
        assert_eq!(
            files,
            vec![("a.csv", true), ("b.csv", true), ("broken.csv", false)]
        );
        assert_eq!(report.valid_files().count(), 2);
        assert_eq!(report.invalid_files().count(), 1);
        let codes: Vec<_> = report.records.iter().map(|r| r.module_code()).collect();
        assert_eq!(codes, vec!["A1", "A2", "B1"]);
    }

    #[test]
    fn test_ignored_files_are_not_scanned() {
        let dir = TempDir::new().unwrap();
        valid_file(&dir, "keep.csv", &["K1"]);
        valid_file(&dir, "drop.csv", &["D1"]);

        let mut loader = ScheduleLoader::new(dir.path());
        assert_eq!(loader.load().unwrap().records.len(), 2);

        loader.add_ignore("drop.csv");
        loader.add_ignore("drop.csv");
        assert_eq!(loader.ignored(), ["drop.csv".to_string()]);

        let report = loader.load().unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.records[0].module_code(), "K1");
    }

    #[test]
    fn test_load_missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ScheduleLoader::new(dir.path().join("absent"))
            .load()
            .unwrap_err();
        assert!(matches!(err, TimetableError::Io { .. }));
    }

    #[test]
    fn test_policy_round_trips_through_toml() {
        #[derive(serde::Deserialize)]
        struct Holder {
            policy: ParsePolicy,
        }
        let holder: Holder = toml::from_str("policy = \"skip\"").unwrap();
        assert_eq!(holder.policy, ParsePolicy::Skip);
        assert_eq!(ParsePolicy::default(), ParsePolicy::Abort);
    }
}
