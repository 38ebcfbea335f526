use attendance_core::{
    AggregateStats, AttendanceStore, ClassificationThresholds, Classification, DailyStats,
    FixedClock, MarkStatus, MemoryBlobStore, Period, PeriodRows, RawAttendanceInput, Stats,
    StoreConfig,
};
use chrono::NaiveDate;

type TestStore = AttendanceStore<MemoryBlobStore, FixedClock>;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn store_on(backend: MemoryBlobStore, date: NaiveDate) -> TestStore {
    AttendanceStore::with_clock(backend, FixedClock(date), StoreConfig::default()).unwrap()
}

/// Ingests one batch per `(date, marks)` pair, moving the clock each day.
fn store_with_days(days: &[(NaiveDate, &[(&str, &str, MarkStatus)])]) -> TestStore {
    let mut backend = MemoryBlobStore::new();
    for (date, marks) in days {
        let mut store = store_on(backend, *date);
        store
            .ingest_daily(
                marks
                    .iter()
                    .map(|(name, department, status)| {
                        RawAttendanceInput::new(*name, *department, *status)
                    })
                    .collect::<Vec<_>>(),
            )
            .unwrap();
        backend = store.into_backend();
    }
    let last = days.last().map_or(ymd(2026, 3, 2), |(date, _)| *date);
    store_on(backend, last)
}

#[test]
fn fresh_store_reports_empty_everything() {
    let store = store_on(MemoryBlobStore::new(), ymd(2026, 3, 2));

    for period in Period::ALL {
        assert!(store.compute_period(period, None).unwrap().is_empty());
    }
    assert_eq!(
        store.compute_stats(Period::Daily, None).unwrap(),
        Stats::Daily(DailyStats::default())
    );
    assert_eq!(
        store.compute_stats(Period::Semester, None).unwrap(),
        Stats::Aggregated(AggregateStats::default())
    );
}

#[test]
fn daily_stats_count_present_and_absent() {
    let store = store_with_days(&[(
        ymd(2026, 3, 2),
        &[
            ("Ahmad", "CS-3rd", MarkStatus::Present),
            ("Ali", "IT-2nd", MarkStatus::Absent),
        ],
    )]);

    assert_eq!(store.compute_period(Period::Daily, None).unwrap().len(), 2);
    assert_eq!(
        store.compute_stats(Period::Daily, None).unwrap(),
        Stats::Daily(DailyStats {
            total: 2,
            present: 1,
            absent: 1,
            percentage: 50,
        })
    );
}

#[test]
fn weekly_window_is_monday_to_friday() {
    let store = store_with_days(&[
        (ymd(2026, 2, 27), &[("Ahmad", "CS-3rd", MarkStatus::Absent)]),
        (ymd(2026, 3, 2), &[("Ahmad", "CS-3rd", MarkStatus::Present)]),
        (ymd(2026, 3, 3), &[("Ahmad", "CS-3rd", MarkStatus::Absent)]),
        (ymd(2026, 3, 4), &[("Ahmad", "CS-3rd", MarkStatus::Present)]),
    ]);

    let rows = store.compute_period(Period::Weekly, None).unwrap();
    let row = &rows.as_aggregated().unwrap()[0];
    assert_eq!(row.total_classes, 3);
    assert_eq!(row.attended, 2);
    assert_eq!(row.percentage, 67);
    assert_eq!(row.status, Classification::Warning);

    // Saturday still belongs to the week that started on Monday.
    let saturday = store
        .compute_period(Period::Weekly, Some(ymd(2026, 3, 7)))
        .unwrap();
    assert_eq!(saturday.as_aggregated().unwrap()[0].total_classes, 3);
}

#[test]
fn sunday_reference_reports_the_coming_week() {
    let store = store_with_days(&[
        (ymd(2026, 3, 6), &[("Ahmad", "CS-3rd", MarkStatus::Absent)]),
        (ymd(2026, 3, 9), &[("Ahmad", "CS-3rd", MarkStatus::Present)]),
    ]);

    let sunday = store
        .compute_period(Period::Weekly, Some(ymd(2026, 3, 8)))
        .unwrap();
    let row = &sunday.as_aggregated().unwrap()[0];
    assert_eq!((row.total_classes, row.attended, row.percentage), (1, 1, 100));

    let trend = store.weekly_trend(Some(ymd(2026, 3, 8))).unwrap();
    assert_eq!(trend[0].date, ymd(2026, 3, 9));
    assert_eq!(trend[0].percentage, Some(100));
}

#[test]
fn monthly_window_follows_calendar_month() {
    let store = store_with_days(&[
        (ymd(2026, 2, 27), &[("Ahmad", "CS-3rd", MarkStatus::Absent)]),
        (ymd(2026, 3, 2), &[("Ahmad", "CS-3rd", MarkStatus::Present)]),
        (ymd(2026, 3, 31), &[("Ahmad", "CS-3rd", MarkStatus::Present)]),
    ]);

    let march = store.compute_period(Period::Monthly, None).unwrap();
    let row = &march.as_aggregated().unwrap()[0];
    assert_eq!((row.total_classes, row.attended, row.percentage), (2, 2, 100));
    assert_eq!(row.status, Classification::Excellent);

    let february = store
        .compute_period(Period::Monthly, Some(ymd(2026, 2, 10)))
        .unwrap();
    assert_eq!(february.as_aggregated().unwrap()[0].percentage, 0);
}

#[test]
fn semester_period_uses_lifetime_totals() {
    let store = store_with_days(&[
        (
            ymd(2026, 3, 2),
            &[
                ("Ahmad", "CS-3rd", MarkStatus::Present),
                ("Ali", "IT-2nd", MarkStatus::Present),
            ],
        ),
        (
            ymd(2026, 4, 6),
            &[
                ("Ahmad", "CS-3rd", MarkStatus::Present),
                ("Ali", "IT-2nd", MarkStatus::Absent),
            ],
        ),
    ]);

    let rows = store.compute_period(Period::Semester, None).unwrap();
    let rows = rows.as_aggregated().unwrap();
    assert_eq!(rows[0].student_name, "Ahmad");
    assert_eq!(rows[0].percentage, 100);
    assert_eq!(rows[1].percentage, 50);
    assert_eq!(rows[1].status, Classification::Warning);

    assert_eq!(
        store.compute_stats(Period::Semester, None).unwrap(),
        Stats::Aggregated(AggregateStats {
            total_students: 2,
            average_attendance: 75,
            excellent: 1,
            good: 0,
            warning: 1,
        })
    );
}

#[test]
fn students_without_classes_in_window_are_omitted() {
    let store = store_with_days(&[
        (ymd(2026, 2, 27), &[("Ali", "IT-2nd", MarkStatus::Present)]),
        (ymd(2026, 3, 2), &[("Ahmad", "CS-3rd", MarkStatus::Present)]),
    ]);

    let weekly = store.compute_period(Period::Weekly, None).unwrap();
    assert_eq!(weekly.len(), 1);
    assert_eq!(weekly.as_aggregated().unwrap()[0].student_name, "Ahmad");
    assert_eq!(store.compute_period(Period::Semester, None).unwrap().len(), 2);
}

#[test]
fn department_filter_matches_substrings_for_every_period() {
    let store = store_with_days(&[(
        ymd(2026, 3, 2),
        &[
            ("Ahmad", "CS-3rd", MarkStatus::Present),
            ("Ali", "IT-2nd", MarkStatus::Absent),
            ("Sara", "Math-1st", MarkStatus::Present),
        ],
    )]);

    for period in Period::ALL {
        let rows = store.filter_by_department(period, "cs").unwrap();
        assert_eq!(rows.len(), 1, "period {period}");
        assert_eq!(store.filter_by_department(period, "ALL").unwrap().len(), 3);
    }

    assert_eq!(
        store.compute_stats(Period::Daily, Some("cs")).unwrap(),
        Stats::Daily(DailyStats {
            total: 1,
            present: 1,
            absent: 0,
            percentage: 100,
        })
    );
    match store.compute_stats(Period::Weekly, Some("it")).unwrap() {
        Stats::Aggregated(stats) => {
            assert_eq!(stats.total_students, 1);
            assert_eq!(stats.warning, 1);
        }
        other => panic!("unexpected stats: {other:?}"),
    }
}

#[test]
fn search_matches_name_or_department() {
    let store = store_with_days(&[(
        ymd(2026, 3, 2),
        &[
            ("Ahmad", "CS-3rd", MarkStatus::Present),
            ("Ali", "IT-2nd", MarkStatus::Absent),
        ],
    )]);

    let hits = store.search(Period::Daily, "ALI").unwrap();
    assert!(matches!(&hits, PeriodRows::Daily(rows) if rows.len() == 1));
    assert_eq!(store.search(Period::Semester, "cs-3").unwrap().len(), 1);
    assert!(store.search(Period::Weekly, "nobody").unwrap().is_empty());
}

#[test]
fn configured_thresholds_drive_classification() {
    let config = StoreConfig {
        thresholds: ClassificationThresholds {
            good: 50,
            excellent: 75,
        },
        ..StoreConfig::default()
    };
    let mut store =
        AttendanceStore::with_clock(MemoryBlobStore::new(), FixedClock(ymd(2026, 3, 2)), config)
            .unwrap();
    store
        .ingest_daily(vec![
            RawAttendanceInput::new("Ahmad", "CS-3rd", MarkStatus::Present),
            RawAttendanceInput::new("Ali", "IT-2nd", MarkStatus::Absent),
        ])
        .unwrap();

    let rows = store.compute_period(Period::Semester, None).unwrap();
    let statuses: Vec<Classification> = rows
        .as_aggregated()
        .unwrap()
        .iter()
        .map(|row| row.status)
        .collect();
    assert_eq!(
        statuses,
        vec![Classification::Excellent, Classification::Warning]
    );
}

#[test]
fn periods_parse_from_text() {
    assert_eq!("Weekly".parse::<Period>().unwrap(), Period::Weekly);
    assert!("yearly".parse::<Period>().is_err());
}
