//! Report projections: the semester month grid and the weekly trend.
//!
//! # Invariants
//! - Grid columns are the dates of the month with at least one recorded mark.
//! - Trend values come from recorded daily buckets only; days without
//!   records report `None`.

use crate::model::department::{DepartmentFilter, DepartmentLabel};
use crate::model::document::{StoreDocument, StudentBook};
use crate::model::record::MarkStatus;
use crate::model::student::rounded_percentage;
use crate::service::aggregate::{daily_stats, month_bounds, work_week};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

/// Row selection for the month grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridFilter {
    pub department: DepartmentFilter,
    /// Semester number parsed from the department label; `None` keeps all.
    pub semester: Option<u32>,
}

impl GridFilter {
    fn matches(&self, department: &str, label: &DepartmentLabel) -> bool {
        self.department.matches(department)
            && self
                .semester
                .map_or(true, |semester| label.semester == Some(semester))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub student_name: String,
    pub department: String,
    pub semester: Option<u32>,
    /// One cell per grid date; `None` when nothing was recorded that day.
    pub cells: Vec<Option<MarkStatus>>,
}

impl GridRow {
    /// `P`, `A` or empty, as shown in the printed table.
    pub fn cell_codes(&self) -> Vec<&'static str> {
        self.cells
            .iter()
            .map(|cell| match cell {
                Some(MarkStatus::Present) => "P",
                Some(MarkStatus::Absent) => "A",
                None => "",
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridStats {
    pub total_students: u32,
    pub present_count: u32,
    pub absent_count: u32,
    /// `present / (students × dates) × 100`, one decimal place.
    pub average_attendance: f64,
}

/// Student-by-date attendance table for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<GridRow>,
    pub stats: GridStats,
    /// Distinct department codes across all students, first-seen order.
    pub departments: Vec<String>,
    /// Distinct semester numbers across all students, ascending.
    pub semesters: Vec<u32>,
}

/// Builds the grid for `year`/`month`; `None` when the month is invalid.
pub fn month_grid(
    students: &StudentBook,
    year: i32,
    month: u32,
    filter: &GridFilter,
) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (_, last) = month_bounds(first);

    let mut dates = BTreeSet::new();
    let mut departments: Vec<String> = Vec::new();
    let mut semesters = BTreeSet::new();
    for student in students {
        dates.extend(student.attendance_history.range(first..=last).map(|(date, _)| *date));
        let label = DepartmentLabel::parse(&student.department);
        if !departments.contains(&label.code) {
            departments.push(label.code.clone());
        }
        semesters.extend(label.semester);
    }
    let dates: Vec<NaiveDate> = dates.into_iter().collect();

    let mut stats = GridStats::default();
    let mut rows = Vec::new();
    for student in students {
        let label = DepartmentLabel::parse(&student.department);
        if !filter.matches(&student.department, &label) {
            continue;
        }
        let cells: Vec<Option<MarkStatus>> =
            dates.iter().map(|date| student.status_on(*date)).collect();
        for cell in cells.iter().flatten() {
            match cell {
                MarkStatus::Present => stats.present_count += 1,
                MarkStatus::Absent => stats.absent_count += 1,
            }
        }
        stats.total_students += 1;
        rows.push(GridRow {
            student_name: student.student_name.clone(),
            department: student.department.clone(),
            semester: label.semester,
            cells,
        });
    }

    let slots = u64::from(stats.total_students) * dates.len() as u64;
    if slots > 0 {
        let ratio = f64::from(stats.present_count) / slots as f64 * 100.0;
        stats.average_attendance = (ratio * 10.0).round() / 10.0;
    }

    Some(MonthGrid {
        year,
        month,
        dates,
        rows,
        stats,
        departments,
        semesters: semesters.into_iter().collect(),
    })
}

/// One weekday of the weekly trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Short weekday label, `Mon`..`Fri`.
    pub day: String,
    /// Present share of that day's records; `None` without records.
    pub percentage: Option<u32>,
}

/// Recorded daily attendance rate for Monday–Friday of `reference`'s week.
pub fn weekly_trend(document: &StoreDocument, reference: NaiveDate) -> Vec<TrendPoint> {
    let (monday, _) = work_week(reference);
    (0..5u64)
        .filter_map(|offset| monday.checked_add_days(Days::new(offset)))
        .map(|date| {
            let records = document.daily_on(date);
            let percentage = if records.is_empty() {
                None
            } else {
                let stats = daily_stats(records);
                Some(rounded_percentage(stats.present, stats.total))
            };
            TrendPoint {
                date,
                day: date.format("%a").to_string(),
                percentage,
            }
        })
        .collect()
}
