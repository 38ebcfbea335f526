//! Per-student attendance aggregate.
//!
//! # Responsibility
//! - Hold a student's full day-by-day attendance history.
//! - Derive lifetime totals from that history.
//!
//! # Invariants
//! - `total_days`, `present_days` and `semester_percentage` always match
//!   `attendance_history`; they are recomputed, never patched.
//! - One history entry per calendar date.

use crate::model::record::{MarkStatus, MarkedBy};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Builds the aggregate key `studentName_department`.
pub fn student_key(student_name: &str, department: &str) -> String {
    format!("{student_name}_{department}")
}

/// `round(part / whole * 100)` with halves rounded up; 0 when `whole == 0`.
pub fn rounded_percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((part * 200 + whole) / (whole * 2)) as u32
}

/// One dated entry in a student's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub status: MarkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub marked_by: MarkedBy,
}

/// Durable rollup of one student's attendance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAggregate {
    pub student_name: String,
    pub department: String,
    #[serde(default)]
    pub attendance_history: BTreeMap<NaiveDate, HistoryEntry>,
    #[serde(default)]
    pub total_days: u32,
    #[serde(default)]
    pub present_days: u32,
    #[serde(default)]
    pub semester_percentage: u32,
}

impl StudentAggregate {
    /// Creates an aggregate with empty history and zeroed totals.
    pub fn new(student_name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            student_name: student_name.into(),
            department: department.into(),
            attendance_history: BTreeMap::new(),
            total_days: 0,
            present_days: 0,
            semester_percentage: 0,
        }
    }

    pub fn key(&self) -> String {
        student_key(&self.student_name, &self.department)
    }

    /// Inserts or replaces the entry for `date` and recomputes totals.
    pub fn upsert_day(&mut self, date: NaiveDate, entry: HistoryEntry) {
        self.attendance_history.insert(date, entry);
        self.recompute_stats();
    }

    /// Overwrites the status of an existing entry as a teacher correction.
    ///
    /// Returns `false` without touching anything when `date` has no entry.
    pub fn correct_day(&mut self, date: NaiveDate, status: MarkStatus) -> bool {
        let Some(entry) = self.attendance_history.get_mut(&date) else {
            return false;
        };
        entry.status = status;
        entry.marked_by = MarkedBy::Teacher;
        self.recompute_stats();
        true
    }

    /// Counts `(recorded, present)` days within `start..=end`.
    pub fn count_between(&self, start: NaiveDate, end: NaiveDate) -> (u32, u32) {
        if start > end {
            return (0, 0);
        }
        self.attendance_history
            .range(start..=end)
            .fold((0, 0), |(total, present), (_, entry)| {
                (total + 1, present + u32::from(entry.status.is_present()))
            })
    }

    pub fn status_on(&self, date: NaiveDate) -> Option<MarkStatus> {
        self.attendance_history.get(&date).map(|entry| entry.status)
    }

    /// Rebuilds lifetime totals from the full history.
    pub fn recompute_stats(&mut self) {
        let total = self.attendance_history.len() as u32;
        let present = self
            .attendance_history
            .values()
            .filter(|entry| entry.status.is_present())
            .count() as u32;

        self.total_days = total;
        self.present_days = present;
        self.semester_percentage = rounded_percentage(present, total);
    }
}
