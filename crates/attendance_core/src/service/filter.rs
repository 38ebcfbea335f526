//! Row filtering by department and free-text search.

use crate::model::department::DepartmentFilter;
use crate::model::record::DailyRecord;
use crate::service::aggregate::{PeriodRecord, PeriodRows};

/// Common identity columns of daily and aggregated rows.
pub trait AttendanceRow {
    fn student_name(&self) -> &str;
    fn department(&self) -> &str;

    /// Case-insensitive match of `term` against name or department.
    fn matches_term(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.student_name().to_lowercase().contains(&term)
            || self.department().to_lowercase().contains(&term)
    }
}

impl AttendanceRow for DailyRecord {
    fn student_name(&self) -> &str {
        &self.student_name
    }

    fn department(&self) -> &str {
        &self.department
    }
}

impl AttendanceRow for PeriodRecord {
    fn student_name(&self) -> &str {
        &self.student_name
    }

    fn department(&self) -> &str {
        &self.department
    }
}

impl PeriodRows {
    /// Keeps rows whose department matches `filter`.
    pub fn filter_department(self, filter: &DepartmentFilter) -> Self {
        if *filter == DepartmentFilter::All {
            return self;
        }
        self.retain(|row| filter.matches(row.department()))
    }

    /// Keeps rows whose student name or department contains `term`.
    pub fn search(self, term: &str) -> Self {
        self.retain(|row| row.matches_term(term))
    }

    fn retain(self, keep: impl Fn(&dyn AttendanceRow) -> bool) -> Self {
        match self {
            Self::Daily(mut rows) => {
                rows.retain(|row| keep(row as &dyn AttendanceRow));
                Self::Daily(rows)
            }
            Self::Aggregated(mut rows) => {
                rows.retain(|row| keep(row as &dyn AttendanceRow));
                Self::Aggregated(rows)
            }
        }
    }
}
