use attendance_core::db::open_db;
use attendance_core::{
    AttendanceStore, BlobStore, FixedClock, GridFilter, MarkStatus, MemoryBlobStore, Period,
    RawAttendanceInput, SqliteBlobStore, Stats, StoreConfig, StoreError, StudentIdentity,
    UnavailableBlobStore,
};
use chrono::NaiveDate;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance.db");

    {
        let backend = SqliteBlobStore::new(open_db(&path).unwrap());
        let mut store =
            AttendanceStore::with_clock(backend, FixedClock(ymd(2026, 3, 2)), StoreConfig::default())
                .unwrap();
        store
            .ingest_daily(vec![
                RawAttendanceInput::new("Ahmad", "CS-3rd", MarkStatus::Present),
                RawAttendanceInput::new("Ali", "IT-2nd", MarkStatus::Absent),
            ])
            .unwrap();
    }

    let backend = SqliteBlobStore::new(open_db(&path).unwrap());
    let store =
        AttendanceStore::with_clock(backend, FixedClock(ymd(2026, 3, 3)), StoreConfig::default())
            .unwrap();

    assert_eq!(store.semester().unwrap().unwrap().start_date, ymd(2026, 3, 2));
    let rows = store
        .compute_period(Period::Semester, None)
        .unwrap();
    let names: Vec<&str> = rows
        .as_aggregated()
        .unwrap()
        .iter()
        .map(|row| row.student_name.as_str())
        .collect();
    assert_eq!(names, vec!["Ahmad", "Ali"]);
}

#[test]
fn document_lives_under_configured_key() {
    let config = StoreConfig {
        storage_key: "term_2026".to_string(),
        ..StoreConfig::default()
    };
    let mut store =
        AttendanceStore::with_clock(MemoryBlobStore::new(), FixedClock(ymd(2026, 3, 2)), config)
            .unwrap();
    store
        .ingest_daily(vec![RawAttendanceInput::new("Ahmad", "CS-3rd", MarkStatus::Present)])
        .unwrap();

    let backend = store.into_backend();
    assert!(backend.get("attendance_data").unwrap().is_none());
    let raw = backend.get("term_2026").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value["students"]["Ahmad_CS-3rd"]["presentDays"],
        serde_json::json!(1)
    );
    assert_eq!(value["semester"]["totalWeeks"], serde_json::json!(20));
}

#[test]
fn unavailable_storage_degrades_to_empty_results() {
    let mut store = AttendanceStore::with_clock(
        UnavailableBlobStore,
        FixedClock(ymd(2026, 3, 2)),
        StoreConfig::default(),
    )
    .unwrap();
    assert!(!store.is_available());

    let report = store
        .ingest_daily(vec![RawAttendanceInput::new("Ahmad", "CS-3rd", MarkStatus::Present)])
        .unwrap();
    assert!(report.records.is_empty());

    for period in Period::ALL {
        assert!(store.compute_period(period, None).unwrap().is_empty());
        assert_eq!(
            store.compute_stats(period, None).unwrap(),
            Stats::empty(period)
        );
    }
    let found = store
        .correct_status(
            ymd(2026, 3, 2),
            &StudentIdentity::Name("Ahmad".to_string()),
            None,
            MarkStatus::Absent,
        )
        .unwrap();
    assert!(!found);
    assert!(store.semester().unwrap().is_none());
    assert!(store.semester_week(None).unwrap().is_none());
    assert!(store.month_grid(2026, 3, &GridFilter::default()).unwrap().is_none());
    assert!(store.weekly_trend(None).unwrap().is_empty());
    store.reset().unwrap();
}

#[test]
fn corrupt_document_is_reported_not_overwritten() {
    let mut backend = MemoryBlobStore::new();
    backend.set("attendance_data", "{not json").unwrap();

    let mut store =
        AttendanceStore::with_clock(backend, FixedClock(ymd(2026, 3, 2)), StoreConfig::default())
            .unwrap();

    let err = store.compute_period(Period::Daily, None).unwrap_err();
    assert!(matches!(err, StoreError::CorruptDocument(_)));
    let err = store
        .ingest_daily(vec![RawAttendanceInput::new("Ahmad", "CS-3rd", MarkStatus::Present)])
        .unwrap_err();
    assert!(matches!(err, StoreError::CorruptDocument(_)));

    let backend = store.into_backend();
    assert_eq!(
        backend.get("attendance_data").unwrap().as_deref(),
        Some("{not json")
    );
}

#[test]
fn invalid_config_is_rejected_on_open() {
    let config = StoreConfig {
        semester_total_weeks: 0,
        ..StoreConfig::default()
    };
    let result = AttendanceStore::with_clock(MemoryBlobStore::new(), FixedClock(ymd(2026, 3, 2)), config);
    assert!(matches!(result, Err(StoreError::Config(_))));
}
