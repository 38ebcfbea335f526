//! Semester metadata stored alongside attendance data.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Process-wide semester metadata. Informational only; ingestion never
/// changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_weeks: u32,
    pub current_week: u32,
}

impl SemesterConfig {
    /// Starts a semester on `start_date` lasting `length_months` months.
    ///
    /// Month arithmetic clamps to the last day of the target month
    /// (Oct 31 + 4 months is Feb 28/29).
    pub fn starting(start_date: NaiveDate, length_months: u32, total_weeks: u32) -> Self {
        let end_date = start_date
            .checked_add_months(Months::new(length_months))
            .unwrap_or(NaiveDate::MAX);
        Self {
            start_date,
            end_date,
            total_weeks,
            current_week: 1,
        }
    }

    /// 1-based teaching week containing `date`, clamped to `1..=total_weeks`.
    pub fn week_of(&self, date: NaiveDate) -> u32 {
        let elapsed_days = (date - self.start_date).num_days().max(0);
        let week = u32::try_from(elapsed_days / 7 + 1).unwrap_or(u32::MAX);
        week.clamp(1, self.total_weeks.max(1))
    }
}
