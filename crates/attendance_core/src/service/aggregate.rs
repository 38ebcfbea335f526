//! Period aggregation and status classification.
//!
//! # Responsibility
//! - Derive weekly/monthly/semester rows from per-student history.
//! - Classify aggregated percentages and summarize rows into stats.
//!
//! # Invariants
//! - `percentage == round(attended / total_classes * 100)`, or 0 when
//!   `total_classes == 0`.
//! - Only students with at least one class in the window produce a row.
//! - Rows follow the student book's first-sighting order.

use crate::config::ClassificationThresholds;
use crate::model::document::StudentBook;
use crate::model::record::DailyRecord;
use crate::model::student::{rounded_percentage, StudentAggregate};
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Time window over which attendance is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Semester,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Daily,
        Period::Weekly,
        Period::Monthly,
        Period::Semester,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Semester => "semester",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "semester" => Ok(Self::Semester),
            _ => Err(ParsePeriodError(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePeriodError(pub String);

impl Display for ParsePeriodError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown period `{}`; expected daily|weekly|monthly|semester",
            self.0
        )
    }
}

impl Error for ParsePeriodError {}

/// Attendance standing over an aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Excellent,
    Good,
    Warning,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Warning => "warning",
        }
    }
}

/// Classifies with the default 80/90 thresholds.
pub fn classify(percentage: u32) -> Classification {
    ClassificationThresholds::default().classify(percentage)
}

impl ClassificationThresholds {
    pub fn classify(&self, percentage: u32) -> Classification {
        if percentage < self.good {
            Classification::Warning
        } else if percentage < self.excellent {
            Classification::Good
        } else {
            Classification::Excellent
        }
    }
}

/// One student's attendance over a non-daily period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub student_name: String,
    pub department: String,
    pub total_classes: u32,
    pub attended: u32,
    pub percentage: u32,
    pub status: Classification,
}

/// Date range an aggregated period covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodWindow {
    /// Inclusive calendar range.
    Between { start: NaiveDate, end: NaiveDate },
    /// Whole recorded history.
    Lifetime,
}

impl PeriodWindow {
    /// Window of `period` around `reference`; `None` for `Period::Daily`,
    /// which reads the raw bucket instead.
    pub fn for_period(period: Period, reference: NaiveDate) -> Option<Self> {
        match period {
            Period::Daily => None,
            Period::Weekly => {
                let (start, end) = work_week(reference);
                Some(Self::Between { start, end })
            }
            Period::Monthly => {
                let (start, end) = month_bounds(reference);
                Some(Self::Between { start, end })
            }
            Period::Semester => Some(Self::Lifetime),
        }
    }

    fn count(&self, student: &StudentAggregate) -> (u32, u32) {
        match *self {
            Self::Between { start, end } => student.count_between(start, end),
            Self::Lifetime => (student.total_days, student.present_days),
        }
    }
}

/// Monday through Friday of the school week for `reference`.
///
/// Monday to Saturday map back to that week's Monday; Sunday maps forward to
/// the next day.
pub fn work_week(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = match reference.weekday() {
        Weekday::Sun => reference.succ_opt().unwrap_or(NaiveDate::MAX),
        weekday => reference
            .checked_sub_days(Days::new(u64::from(weekday.num_days_from_monday())))
            .unwrap_or(NaiveDate::MIN),
    };
    let friday = monday.checked_add_days(Days::new(4)).unwrap_or(NaiveDate::MAX);
    (monday, friday)
}

/// First and last day of the month containing `reference`.
pub fn month_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = reference.with_day(1).unwrap_or(reference);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}

/// Lazily derives one row per student with classes in `window`.
///
/// Nothing is cached: every call walks the current history again.
pub fn period_records<'a>(
    students: &'a StudentBook,
    window: PeriodWindow,
    thresholds: ClassificationThresholds,
) -> impl Iterator<Item = PeriodRecord> + 'a {
    students.iter().filter_map(move |student| {
        let (total_classes, attended) = window.count(student);
        if total_classes == 0 {
            return None;
        }
        let percentage = rounded_percentage(attended, total_classes);
        Some(PeriodRecord {
            student_name: student.student_name.clone(),
            department: student.department.clone(),
            total_classes,
            attended,
            percentage,
            status: thresholds.classify(percentage),
        })
    })
}

/// Rows produced for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PeriodRows {
    Daily(Vec<DailyRecord>),
    Aggregated(Vec<PeriodRecord>),
}

impl PeriodRows {
    /// Empty rows of the right shape for `period`.
    pub fn empty(period: Period) -> Self {
        match period {
            Period::Daily => Self::Daily(Vec::new()),
            _ => Self::Aggregated(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Daily(rows) => rows.len(),
            Self::Aggregated(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_daily(&self) -> Option<&[DailyRecord]> {
        match self {
            Self::Daily(rows) => Some(rows),
            Self::Aggregated(_) => None,
        }
    }

    pub fn as_aggregated(&self) -> Option<&[PeriodRecord]> {
        match self {
            Self::Daily(_) => None,
            Self::Aggregated(rows) => Some(rows),
        }
    }

    pub fn stats(&self) -> Stats {
        match self {
            Self::Daily(rows) => Stats::Daily(daily_stats(rows)),
            Self::Aggregated(rows) => Stats::Aggregated(aggregate_stats(rows)),
        }
    }
}

/// Headcount summary of one day's raw records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub percentage: u32,
}

/// Distribution summary of aggregated rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_students: u32,
    pub average_attendance: u32,
    pub excellent: u32,
    pub good: u32,
    pub warning: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Stats {
    Daily(DailyStats),
    Aggregated(AggregateStats),
}

impl Stats {
    pub fn empty(period: Period) -> Self {
        match period {
            Period::Daily => Self::Daily(DailyStats::default()),
            _ => Self::Aggregated(AggregateStats::default()),
        }
    }
}

pub fn daily_stats<'a>(records: impl IntoIterator<Item = &'a DailyRecord>) -> DailyStats {
    let mut stats = DailyStats::default();
    for record in records {
        stats.total += 1;
        if record.status.is_present() {
            stats.present += 1;
        } else {
            stats.absent += 1;
        }
    }
    stats.percentage = rounded_percentage(stats.present, stats.total);
    stats
}

pub fn aggregate_stats<'a>(records: impl IntoIterator<Item = &'a PeriodRecord>) -> AggregateStats {
    let mut stats = AggregateStats::default();
    let mut percentage_sum: u64 = 0;
    for record in records {
        stats.total_students += 1;
        percentage_sum += u64::from(record.percentage);
        match record.status {
            Classification::Excellent => stats.excellent += 1,
            Classification::Good => stats.good += 1,
            Classification::Warning => stats.warning += 1,
        }
    }
    if stats.total_students > 0 {
        let count = u64::from(stats.total_students);
        stats.average_attendance = ((percentage_sum * 2 + count) / (count * 2)) as u32;
    }
    stats
}
