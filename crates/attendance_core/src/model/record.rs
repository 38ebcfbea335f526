//! Daily attendance record model.
//!
//! # Responsibility
//! - Define the canonical one-student-one-day attendance mark.
//! - Define the raw input shape handed over by the ingestion source.
//!
//! # Invariants
//! - `id` is stable once assigned and never reused within a date bucket.
//! - Teacher corrections always leave `marked_by == MarkedBy::Teacher`.
//! - A raw input without a student name or department never becomes a record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one daily record.
///
/// Ids coming from the ingestion source are kept verbatim; missing ids are
/// synthesized as UUID v4 text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh unique id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw presence mark for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkStatus {
    Present,
    Absent,
}

impl MarkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }

    pub fn is_present(self) -> bool {
        self == Self::Present
    }
}

/// Provenance of a mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkedBy {
    /// Self-reported through the student-side source.
    #[default]
    Student,
    /// Entered or corrected by a teacher.
    Teacher,
}

impl MarkedBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
        }
    }
}

/// One attendance mark for one student on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub id: RecordId,
    pub student_name: String,
    /// Department label, possibly `DEPT-semester` (see `DepartmentLabel`).
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub status: MarkStatus,
    pub date: NaiveDate,
    #[serde(default)]
    pub marked_by: MarkedBy,
}

impl DailyRecord {
    /// Applies a teacher correction to this record.
    pub fn correct(&mut self, status: MarkStatus) {
        self.status = status;
        self.marked_by = MarkedBy::Teacher;
    }
}

/// Id as sent by the ingestion source: either text or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRecordId {
    Text(String),
    Number(serde_json::Number),
}

impl RawRecordId {
    fn into_record_id(self) -> Option<RecordId> {
        let text = match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(RecordId::from(trimmed))
        }
    }
}

/// Raw attendance mark supplied by the ingestion source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendanceInput {
    #[serde(default)]
    pub id: Option<RawRecordId>,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub status: MarkStatus,
    #[serde(default)]
    pub marked_by: Option<MarkedBy>,
}

impl RawAttendanceInput {
    /// Builds a self-reported mark without id or subject.
    pub fn new(
        student_name: impl Into<String>,
        department: impl Into<String>,
        status: MarkStatus,
    ) -> Self {
        Self {
            id: None,
            student_name: student_name.into(),
            department: department.into(),
            subject: None,
            status,
            marked_by: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(RawRecordId::Text(id.into()));
        self
    }

    pub fn with_marked_by(mut self, marked_by: MarkedBy) -> Self {
        self.marked_by = Some(marked_by);
        self
    }

    /// Checks the identity fields required to aggregate this mark.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.student_name.trim().is_empty() {
            return Err(RecordValidationError::MissingStudentName);
        }
        if self.department.trim().is_empty() {
            return Err(RecordValidationError::MissingDepartment);
        }
        Ok(())
    }

    /// Converts the raw mark into a record for `date`.
    ///
    /// Missing ids are synthesized and `marked_by` defaults to `student`.
    pub fn into_record(self, date: NaiveDate) -> Result<DailyRecord, RecordValidationError> {
        self.validate()?;
        let id = self
            .id
            .and_then(RawRecordId::into_record_id)
            .unwrap_or_else(RecordId::generate);
        let subject = self.subject.filter(|value| !value.trim().is_empty());

        Ok(DailyRecord {
            id,
            student_name: self.student_name,
            department: self.department,
            subject,
            status: self.status,
            date,
            marked_by: self.marked_by.unwrap_or_default(),
        })
    }
}

/// Identity fields missing from a raw attendance mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    MissingStudentName,
    MissingDepartment,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingStudentName => write!(f, "attendance input is missing studentName"),
            Self::MissingDepartment => write!(f, "attendance input is missing department"),
        }
    }
}

impl Error for RecordValidationError {}
