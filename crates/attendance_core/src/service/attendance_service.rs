//! Attendance store use-case service.
//!
//! # Responsibility
//! - Ingest a day's raw marks into the daily bucket and student aggregates.
//! - Apply teacher corrections to one day's record.
//! - Serve period rows, stats, filters and report projections.
//!
//! # Invariants
//! - Every mutation is one document read, in-memory updates, one write.
//! - A correction updates the daily record and the student history together.
//! - Record ids are unique within a date bucket; a colliding source id is
//!   replaced by a generated one.
//! - With an unavailable backend every read is empty and every write a no-op.
//! - Logs carry dates, counts and ids only, never student names.

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, StoreConfig};
use crate::model::department::DepartmentFilter;
use crate::model::document::StoreDocument;
use crate::model::record::{DailyRecord, MarkStatus, RawAttendanceInput, RecordId};
use crate::model::semester::SemesterConfig;
use crate::model::student::{student_key, HistoryEntry, StudentAggregate};
use crate::repo::blob_repo::{BlobStore, RepoError};
use crate::service::aggregate::{period_records, Period, PeriodRows, PeriodWindow, Stats};
use crate::service::report::{month_grid, weekly_trend, GridFilter, MonthGrid, TrendPoint};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of an attendance store operation.
#[derive(Debug)]
pub enum StoreError {
    Config(ConfigError),
    Repo(RepoError),
    /// The persisted document is not valid attendance JSON.
    CorruptDocument(serde_json::Error),
    Serialize(serde_json::Error),
    /// An ingestion payload is not a JSON array.
    MalformedPayload(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::CorruptDocument(err) => write!(f, "corrupt attendance document: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize attendance document: {err}"),
            Self::MalformedPayload(message) => {
                write!(f, "malformed attendance payload: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::CorruptDocument(err) | Self::Serialize(err) => Some(err),
            Self::MalformedPayload(_) => None,
        }
    }
}

impl From<ConfigError> for StoreError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// How a correction names its target student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentIdentity {
    /// Record id assigned at ingestion (canonical).
    Id(RecordId),
    /// Student name, resolved to a record id through the day's
    /// `(studentName, department)` index.
    Name(String),
}

/// Raw input dropped during ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedInput {
    /// Position in the submitted batch.
    pub index: usize,
    pub reason: String,
}

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub date: NaiveDate,
    /// Today's bucket as written, in input order.
    pub records: Vec<DailyRecord>,
    pub rejected: Vec<RejectedInput>,
}

/// Single authority over the persisted attendance document.
///
/// Construct once per session and pass by reference to consumers.
pub struct AttendanceStore<B: BlobStore, C: Clock = SystemClock> {
    backend: B,
    clock: C,
    config: StoreConfig,
}

impl<B: BlobStore> AttendanceStore<B, SystemClock> {
    /// Opens a store on the wall clock.
    pub fn open(backend: B, config: StoreConfig) -> StoreResult<Self> {
        Self::with_clock(backend, SystemClock, config)
    }
}

impl<B: BlobStore, C: Clock> AttendanceStore<B, C> {
    /// Opens a store and seeds the initial document when none exists yet.
    ///
    /// An unavailable backend still yields a usable store.
    pub fn with_clock(backend: B, clock: C, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let mut store = Self {
            backend,
            clock,
            config,
        };

        if !store.backend.is_available() {
            warn!("event=store_open module=service status=degraded reason=storage_unavailable");
            return Ok(store);
        }

        if store.backend.get(&store.config.storage_key)?.is_none() {
            let document = store.seed_document();
            store.write_document(&document)?;
            info!(
                "event=store_open module=service status=ok seeded=true semester_start={}",
                document.semester.start_date
            );
        } else {
            info!("event=store_open module=service status=ok seeded=false");
        }
        Ok(store)
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Ends the session and hands the persistence adapter back.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Replaces today's bucket with `inputs` and folds each mark into its
    /// student aggregate.
    ///
    /// Inputs missing a student name or department are rejected individually.
    /// Repeated `(studentName, department)` pairs collapse to the last one.
    /// A source id already taken by an earlier record of the batch is
    /// replaced with a generated id.
    pub fn ingest_daily(
        &mut self,
        inputs: impl IntoIterator<Item = RawAttendanceInput>,
    ) -> StoreResult<IngestReport> {
        self.ingest_entries(inputs.into_iter().map(Ok).collect())
    }

    /// Same as `ingest_daily` for a JSON array payload.
    ///
    /// Array elements that do not decode are rejected individually; a payload
    /// that is not an array fails as a whole.
    pub fn ingest_daily_json(&mut self, payload: &str) -> StoreResult<IngestReport> {
        let values: Vec<serde_json::Value> = serde_json::from_str(payload)
            .map_err(|err| StoreError::MalformedPayload(err.to_string()))?;
        let entries = values
            .into_iter()
            .map(|value| {
                serde_json::from_value::<RawAttendanceInput>(value).map_err(|err| err.to_string())
            })
            .collect();
        self.ingest_entries(entries)
    }

    fn ingest_entries(
        &mut self,
        entries: Vec<Result<RawAttendanceInput, String>>,
    ) -> StoreResult<IngestReport> {
        let today = self.clock.today();
        let mut report = IngestReport {
            date: today,
            records: Vec::new(),
            rejected: Vec::new(),
        };
        let Some(mut document) = self.read_document()? else {
            warn!("event=attendance_ingest module=service status=skip reason=storage_unavailable");
            return Ok(report);
        };

        let mut positions: HashMap<(String, String), usize> = HashMap::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let record = match entry.and_then(|input| {
                input.into_record(today).map_err(|err| err.to_string())
            }) {
                Ok(record) => record,
                Err(reason) => {
                    report.rejected.push(RejectedInput { index, reason });
                    continue;
                }
            };

            document
                .students
                .get_or_insert(&record.student_name, &record.department)
                .upsert_day(
                    today,
                    HistoryEntry {
                        status: record.status,
                        subject: record.subject.clone(),
                        marked_by: record.marked_by,
                    },
                );

            let identity = (record.student_name.clone(), record.department.clone());
            match positions.get(&identity).copied() {
                Some(position) => report.records[position] = record,
                None => {
                    positions.insert(identity, report.records.len());
                    report.records.push(record);
                }
            }
        }

        let reassigned = ensure_unique_ids(&mut report.records);
        if reassigned > 0 {
            warn!(
                "event=attendance_ingest module=service status=id_collision date={today} reassigned={reassigned}"
            );
        }

        document.daily.insert(today, report.records.clone());
        self.write_document(&document)?;

        if !report.rejected.is_empty() {
            warn!(
                "event=attendance_ingest module=service status=partial date={today} rejected={} first_rejected_index={}",
                report.rejected.len(),
                report.rejected[0].index
            );
        }
        info!(
            "event=attendance_ingest module=service status=ok date={today} records={} rejected={} students={}",
            report.records.len(),
            report.rejected.len(),
            document.students.len()
        );
        Ok(report)
    }

    /// Overwrites one day's status as a teacher correction.
    ///
    /// `department` narrows the match by exact, case-sensitive equality with
    /// the record's department, unlike the substring `DepartmentFilter` used
    /// by the report operations. `None`, blank or `"all"` leave it open.
    /// Returns `false` when the day's bucket has no matching record, which
    /// callers should treat as a soft notice rather than a failure.
    pub fn correct_status(
        &mut self,
        date: NaiveDate,
        identity: &StudentIdentity,
        department: Option<&str>,
        status: MarkStatus,
    ) -> StoreResult<bool> {
        let Some(mut document) = self.read_document()? else {
            warn!("event=attendance_correct module=service status=skip reason=storage_unavailable");
            return Ok(false);
        };
        let department = department
            .map(str::trim)
            .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("all"));

        let position = resolve_record_position(&document, date, identity, department);
        let corrected = position.and_then(|position| {
            let record = document.daily.get_mut(&date)?.get_mut(position)?;
            record.correct(status);
            Some(student_key(&record.student_name, &record.department))
        });

        let aggregate_key = corrected.clone().or_else(|| match (identity, department) {
            (StudentIdentity::Name(name), Some(department)) => Some(student_key(name, department)),
            _ => None,
        });
        let history_corrected = aggregate_key
            .and_then(|key| document.students.get_mut(&key))
            .map_or(false, |student| student.correct_day(date, status));

        if corrected.is_none() && !history_corrected {
            info!("event=attendance_correct module=service status=not_found date={date}");
            return Ok(false);
        }
        if corrected.is_some() != history_corrected {
            warn!(
                "event=attendance_correct module=service status=diverged date={date} daily={} history={}",
                corrected.is_some(),
                history_corrected
            );
        }

        self.write_document(&document)?;
        info!(
            "event=attendance_correct module=service status=ok date={date} new_status={}",
            status.as_str()
        );
        Ok(corrected.is_some())
    }

    /// Rows for `period` around `reference` (today when `None`).
    ///
    /// Recomputed from the stored history on every call.
    pub fn compute_period(
        &self,
        period: Period,
        reference: Option<NaiveDate>,
    ) -> StoreResult<PeriodRows> {
        let Some(document) = self.read_document()? else {
            return Ok(PeriodRows::empty(period));
        };
        let reference = reference.unwrap_or_else(|| self.clock.today());

        let rows = match PeriodWindow::for_period(period, reference) {
            None => PeriodRows::Daily(document.daily_on(reference).to_vec()),
            Some(window) => PeriodRows::Aggregated(
                period_records(&document.students, window, self.config.thresholds).collect(),
            ),
        };
        Ok(rows)
    }

    /// Stats for today's `period`, optionally narrowed to a department.
    pub fn compute_stats(&self, period: Period, department: Option<&str>) -> StoreResult<Stats> {
        let rows = self
            .compute_period(period, None)?
            .filter_department(&DepartmentFilter::parse(department));
        Ok(rows.stats())
    }

    /// Today's `period` rows whose department contains `department`
    /// (case-insensitive); `"all"` returns everything.
    pub fn filter_by_department(&self, period: Period, department: &str) -> StoreResult<PeriodRows> {
        let rows = self.compute_period(period, None)?;
        Ok(rows.filter_department(&DepartmentFilter::from(department)))
    }

    /// Today's `period` rows matching a free-text search term.
    pub fn search(&self, period: Period, term: &str) -> StoreResult<PeriodRows> {
        Ok(self.compute_period(period, None)?.search(term))
    }

    pub fn student(
        &self,
        student_name: &str,
        department: &str,
    ) -> StoreResult<Option<StudentAggregate>> {
        let Some(document) = self.read_document()? else {
            return Ok(None);
        };
        Ok(document
            .students
            .get(&student_key(student_name, department))
            .cloned())
    }

    pub fn semester(&self) -> StoreResult<Option<SemesterConfig>> {
        Ok(self.read_document()?.map(|document| document.semester))
    }

    /// Teaching week (1-based, clamped to the semester length) containing
    /// `reference`, today when `None`.
    pub fn semester_week(&self, reference: Option<NaiveDate>) -> StoreResult<Option<u32>> {
        let reference = reference.unwrap_or_else(|| self.clock.today());
        Ok(self
            .read_document()?
            .map(|document| document.semester.week_of(reference)))
    }

    /// Student-by-date table for one month; `None` for an invalid month or
    /// unavailable storage.
    pub fn month_grid(
        &self,
        year: i32,
        month: u32,
        filter: &GridFilter,
    ) -> StoreResult<Option<MonthGrid>> {
        let Some(document) = self.read_document()? else {
            return Ok(None);
        };
        Ok(month_grid(&document.students, year, month, filter))
    }

    /// Recorded daily rates for Monday–Friday around `reference`.
    pub fn weekly_trend(&self, reference: Option<NaiveDate>) -> StoreResult<Vec<TrendPoint>> {
        let Some(document) = self.read_document()? else {
            return Ok(Vec::new());
        };
        let reference = reference.unwrap_or_else(|| self.clock.today());
        Ok(weekly_trend(&document, reference))
    }

    /// Discards all attendance data and re-seeds an empty document.
    pub fn reset(&mut self) -> StoreResult<()> {
        if !self.backend.is_available() {
            warn!("event=store_reset module=service status=skip reason=storage_unavailable");
            return Ok(());
        }
        self.backend.remove(&self.config.storage_key)?;
        let document = self.seed_document();
        self.write_document(&document)?;
        info!(
            "event=store_reset module=service status=ok semester_start={}",
            document.semester.start_date
        );
        Ok(())
    }

    /// Loads the document; a missing one reads as a fresh seed (not yet
    /// written). `None` only when storage is unavailable.
    fn read_document(&self) -> StoreResult<Option<StoreDocument>> {
        if !self.backend.is_available() {
            return Ok(None);
        }
        match self.backend.get(&self.config.storage_key)? {
            Some(raw) => {
                let document = serde_json::from_str(&raw).map_err(StoreError::CorruptDocument)?;
                Ok(Some(document))
            }
            None => Ok(Some(self.seed_document())),
        }
    }

    fn write_document(&mut self, document: &StoreDocument) -> StoreResult<()> {
        let raw = serde_json::to_string(document).map_err(StoreError::Serialize)?;
        self.backend.set(&self.config.storage_key, &raw)?;
        Ok(())
    }

    fn seed_document(&self) -> StoreDocument {
        StoreDocument::seeded(SemesterConfig::starting(
            self.clock.today(),
            self.config.semester_length_months,
            self.config.semester_total_weeks,
        ))
    }
}

/// Position of the targeted record in `date`'s bucket.
fn resolve_record_position(
    document: &StoreDocument,
    date: NaiveDate,
    identity: &StudentIdentity,
    department: Option<&str>,
) -> Option<usize> {
    let records = document.daily_on(date);
    match (identity, department) {
        (StudentIdentity::Id(id), None) => records.iter().position(|record| record.id == *id),
        (StudentIdentity::Id(id), Some(department)) => records
            .iter()
            .position(|record| record.id == *id && record.department == department),
        (StudentIdentity::Name(name), Some(department)) => document
            .identity_index(date)
            .get(&(name.as_str(), department))
            .copied(),
        (StudentIdentity::Name(name), None) => records
            .iter()
            .position(|record| record.student_name == *name),
    }
}

/// Replaces ids already used earlier in the bucket with fresh ones.
/// Returns how many records were reassigned.
fn ensure_unique_ids(records: &mut [DailyRecord]) -> usize {
    let mut seen = HashSet::new();
    let mut reassigned = 0;
    for record in records.iter_mut() {
        while !seen.insert(record.id.clone()) {
            record.id = RecordId::generate();
            reassigned += 1;
        }
    }
    reassigned
}
