//! Attendance domain model.
//!
//! # Responsibility
//! - Define raw daily records, per-student aggregates and semester metadata.
//! - Define the persisted document shape shared by every store operation.
//!
//! # Invariants
//! - Aggregate totals are derived from history, never stored independently.
//! - The persisted document is always written whole.

pub mod department;
pub mod document;
pub mod record;
pub mod semester;
pub mod student;
