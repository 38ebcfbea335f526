//! CSV rendering of period rows.
//!
//! Column order:
//! - daily: student name, department, subject, date, status, marked by
//! - aggregated: student name, department, total classes, attended,
//!   percentage (with `%`), status

use crate::model::record::DailyRecord;
use crate::service::aggregate::{Period, PeriodRecord, PeriodRows};
use chrono::NaiveDate;

const DAILY_HEADER: [&str; 6] = [
    "Student Name",
    "Department",
    "Subject",
    "Date",
    "Status",
    "Marked By",
];

const AGGREGATED_HEADER: [&str; 6] = [
    "Student Name",
    "Department",
    "Total Classes",
    "Attended",
    "Percentage",
    "Status",
];

impl PeriodRows {
    /// Renders the rows as CSV with a header line and `\n` line endings.
    pub fn to_csv(&self) -> String {
        match self {
            Self::Daily(rows) => render(&DAILY_HEADER, rows.iter().map(daily_fields)),
            Self::Aggregated(rows) => {
                render(&AGGREGATED_HEADER, rows.iter().map(aggregated_fields))
            }
        }
    }
}

/// Download name for an export of `period` taken on `date`.
pub fn export_file_name(period: Period, date: NaiveDate) -> String {
    format!("attendance_{period}_{}.csv", date.format("%Y-%m-%d"))
}

fn daily_fields(record: &DailyRecord) -> [String; 6] {
    [
        record.student_name.clone(),
        record.department.clone(),
        record.subject.clone().unwrap_or_default(),
        record.date.format("%Y-%m-%d").to_string(),
        record.status.as_str().to_string(),
        record.marked_by.as_str().to_string(),
    ]
}

fn aggregated_fields(record: &PeriodRecord) -> [String; 6] {
    [
        record.student_name.clone(),
        record.department.clone(),
        record.total_classes.to_string(),
        record.attended.to_string(),
        format!("{}%", record.percentage),
        record.status.as_str().to_string(),
    ]
}

fn render(header: &[&str], rows: impl Iterator<Item = [String; 6]>) -> String {
    let mut out = header
        .iter()
        .map(|field| csv_quote(field))
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');
    for row in rows {
        let line = row
            .iter()
            .map(|field| csv_quote(field))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn csv_quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
