//! Core domain logic for the attendance store.
//! This crate is the single source of truth for attendance invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ClassificationThresholds, ConfigError, StoreConfig};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::department::{DepartmentFilter, DepartmentLabel};
pub use model::document::{StoreDocument, StudentBook};
pub use model::record::{
    DailyRecord, MarkStatus, MarkedBy, RawAttendanceInput, RawRecordId, RecordId,
    RecordValidationError,
};
pub use model::semester::SemesterConfig;
pub use model::student::{student_key, HistoryEntry, StudentAggregate};
pub use repo::blob_repo::{
    BlobStore, MemoryBlobStore, RepoError, RepoResult, SqliteBlobStore, UnavailableBlobStore,
};
pub use service::aggregate::{
    classify, AggregateStats, Classification, DailyStats, ParsePeriodError, Period, PeriodRecord,
    PeriodRows, Stats,
};
pub use service::attendance_service::{
    AttendanceStore, IngestReport, RejectedInput, StoreError, StoreResult, StudentIdentity,
};
pub use service::export::export_file_name;
pub use service::report::{GridFilter, GridRow, GridStats, MonthGrid, TrendPoint};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
