#![allow(clippy::expect_used)]

use std::io::Write;

use chrono::{NaiveDate, NaiveDateTime};

use healthprobe::domain::entities::sample::Sample;
use healthprobe::domain::ports::store::HealthLog;
use healthprobe::infrastructure::persistence::csv_log::CsvHealthLog;

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 8, 20)
        .and_then(|d| d.and_hms_opt(h, m, 0))
        .expect("valid date")
}

fn append_raw(path: &std::path::Path, text: &str) {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .expect("open log");
    file.write_all(text.as_bytes()).expect("write");
}

#[test]
fn appended_samples_read_back_in_time_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = CsvHealthLog::new(dir.path().join("system_health_log.csv"));

    // Written out of order: read_all sorts by timestamp.
    let samples = vec![
        Sample::new(at(12, 0), 30.0, 40.0, 50.0, "Linux"),
        Sample::new(at(10, 0), 10.0, 20.0, 30.0, "Linux"),
        Sample::new(at(11, 0), 20.0, 30.0, 40.0, "Linux"),
    ];
    for sample in &samples {
        log.append(sample).expect("append");
    }

    let history = log.read_all().expect("read");
    let times: Vec<NaiveDateTime> = history.iter().map(|s| s.timestamp).collect();
    assert_eq!(times, vec![at(10, 0), at(11, 0), at(12, 0)]);
    assert!((history[0].cpu_pct - 10.0).abs() < f64::EPSILON);
}

#[test]
fn corrupted_row_is_skipped_without_affecting_neighbours() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("system_health_log.csv");
    append_raw(
        &path,
        "2024-08-20 09:00:00,5.0,6.0,7.0,Linux\n\
         20/08/2024 09:30,99.0,99.0,99.0,Linux\n\
         2024-08-20 10:00:00,not-a-number,6.0,7.0,Linux\n\
         2024-08-20 10:30:00,1.0,2.0\n\
         \n\
         2024-08-20 11:00:00,8.0,9.0,10.0,Darwin\n",
    );

    let history = CsvHealthLog::new(&path).read_all().expect("read");

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].timestamp, at(9, 0));
    assert_eq!(history[1].timestamp, at(11, 0));
    assert_eq!(history[1].os_name, "Darwin");
}

#[test]
fn missing_log_reads_as_empty_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = CsvHealthLog::new(dir.path().join("never_written.csv"));

    assert!(log.read_all().expect("read").is_empty());
}

#[test]
fn consecutive_appends_keep_existing_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("system_health_log.csv");
    let first = Sample::new(at(8, 0), 1.0, 2.0, 3.0, "Linux");
    let second = Sample::new(at(8, 1), 4.0, 5.0, 6.0, "Linux");

    CsvHealthLog::new(&path).append(&first).expect("append first");
    CsvHealthLog::new(&path).append(&second).expect("append second");

    let content = std::fs::read_to_string(&path).expect("read raw");
    assert_eq!(
        content,
        "2024-08-20 08:00:00,1.0,2.0,3.0,Linux\n2024-08-20 08:01:00,4.0,5.0,6.0,Linux\n"
    );
    let history = CsvHealthLog::new(&path).read_all().expect("read");
    assert_eq!(history, vec![first, second]);
}

#[test]
fn os_name_with_separator_does_not_break_the_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = CsvHealthLog::new(dir.path().join("log.csv"));
    log.append(&Sample::new(at(7, 0), 1.0, 2.0, 3.0, "Linux,\nx86_64"))
        .expect("append");

    let history = log.read_all().expect("read");
    assert_eq!(history.len(), 1);
    assert!(!history[0].os_name.contains(','));
}

#[test]
fn rows_sharing_a_timestamp_keep_file_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = CsvHealthLog::new(dir.path().join("log.csv"));
    log.append(&Sample::new(at(6, 0), 1.0, 0.0, 0.0, "Linux"))
        .expect("append");
    log.append(&Sample::new(at(6, 0), 2.0, 0.0, 0.0, "Linux"))
        .expect("append");

    let cpus: Vec<f64> = log.read_all().expect("read").iter().map(|s| s.cpu_pct).collect();
    assert_eq!(cpus, vec![1.0, 2.0]);
}
