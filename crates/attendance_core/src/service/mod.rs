//! Attendance use-case services.
//!
//! # Responsibility
//! - Orchestrate document load/mutate/save around the blob store.
//! - Derive period rows, stats, exports and report projections.
//!
//! # Invariants
//! - Services never write the blob store except through `AttendanceStore`.

pub mod aggregate;
pub mod attendance_service;
pub mod export;
pub mod filter;
pub mod report;
